//! XEP-0231 bits of binary.

use crate::error::Result;
use crate::field::{attribute, b64_text, number_attribute};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "bob",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let bob = reg.define(
        DefinitionBuilder::new("bob", ns::BOB)
            .element("data")
            .field("cid", attribute("cid"))
            .field("maxAge", number_attribute("max-age"))
            .field("type", attribute("type"))
            .field("data", b64_text()),
    )?;
    reg.extend_iq(bob)?;
    reg.extend_message(bob)
}
