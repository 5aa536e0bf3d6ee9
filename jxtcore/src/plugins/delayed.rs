//! XEP-0203 delayed delivery.

use crate::error::Result;
use crate::field::{date_attribute, jid_attribute, text};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "delayed",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let delay = reg.define(
        DefinitionBuilder::new("delay", ns::DELAY)
            .field("from", jid_attribute("from"))
            .field("stamp", date_attribute("stamp", false))
            .field("reason", text()),
    )?;
    reg.extend_message(delay)?;
    reg.extend_presence(delay)
}
