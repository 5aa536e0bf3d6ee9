//! XEP-0199 XMPP ping.

use crate::error::Result;
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "ping",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let ping = reg.define(DefinitionBuilder::new("ping", ns::PING))?;
    reg.extend_iq(ping)
}
