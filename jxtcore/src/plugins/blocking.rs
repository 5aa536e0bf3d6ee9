//! XEP-0191 blocking command.

use crate::error::Result;
use crate::field::multi_sub_attribute;
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "blocking",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    for (name, element) in [("blockList", "blocklist"), ("block", "block"), ("unblock", "unblock")] {
        let id = reg.define(
            DefinitionBuilder::new(name, ns::BLOCKING)
                .element(element)
                .field("jids", multi_sub_attribute(ns::BLOCKING, "item", "jid")),
        )?;
        reg.extend_iq(id)?;
    }
    Ok(())
}
