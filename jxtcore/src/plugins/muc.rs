//! XEP-0045 multi-user chat: joining and the `muc#user` payload.

use crate::error::Result;
use crate::field::{
    attribute, date_sub_attribute, jid_attribute, multi_sub_attribute, number_sub_attribute,
    sub_attribute, text_sub,
};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "muc",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let join = reg.define(
        DefinitionBuilder::new("joinMuc", ns::MUC)
            .element("x")
            .field("password", text_sub(ns::MUC, "password"))
            .field("historyMaxChars", number_sub_attribute(ns::MUC, "history", "maxchars"))
            .field("historyMaxStanzas", number_sub_attribute(ns::MUC, "history", "maxstanzas"))
            .field("historySeconds", number_sub_attribute(ns::MUC, "history", "seconds"))
            .field("historySince", date_sub_attribute(ns::MUC, "history", "since", false)),
    )?;
    reg.extend_presence(join)?;

    let user = reg.define(
        DefinitionBuilder::new("muc", ns::MUC_USER)
            .element("x")
            .field("codes", multi_sub_attribute(ns::MUC_USER, "status", "code"))
            .field("password", text_sub(ns::MUC_USER, "password")),
    )?;
    let item = reg.define(
        DefinitionBuilder::new("_mucUserItem", ns::MUC_USER)
            .element("item")
            .field("affiliation", attribute("affiliation"))
            .field("role", attribute("role"))
            .field("jid", jid_attribute("jid"))
            .field("nick", attribute("nick"))
            .field("actor", sub_attribute(ns::MUC_USER, "actor", "nick"))
            .field("reason", text_sub(ns::MUC_USER, "reason")),
    )?;
    let invite = reg.define(
        DefinitionBuilder::new("_mucInvite", ns::MUC_USER)
            .element("invite")
            .field("to", jid_attribute("to"))
            .field("from", jid_attribute("from"))
            .field("reason", text_sub(ns::MUC_USER, "reason")),
    )?;

    reg.extend(user, item, None, false);
    reg.add(user, "item", crate::field::extension(item));
    reg.extend(user, invite, Some("invites"), true);

    reg.extend_presence(user)?;
    reg.extend_message(user)
}
