//! `jabber:iq:roster` (RFC 6121 §2).

use crate::error::Result;
use crate::field::{attribute, bool_attribute, jid_attribute, multi_text_sub};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "roster",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let roster = reg.define(
        DefinitionBuilder::new("roster", ns::ROSTER)
            .element("query")
            .field("ver", attribute("ver")),
    )?;

    let item = reg.define(
        DefinitionBuilder::new("_rosterItem", ns::ROSTER)
            .element("item")
            .field("jid", jid_attribute("jid"))
            .field("name", attribute("name"))
            .field("subscription", attribute("subscription").with_default("none"))
            .field("preApproved", bool_attribute("approved"))
            .field("ask", attribute("ask"))
            .field("groups", multi_text_sub(ns::ROSTER, "group")),
    )?;

    reg.extend(roster, item, Some("items"), false);
    reg.extend_iq(roster)
}
