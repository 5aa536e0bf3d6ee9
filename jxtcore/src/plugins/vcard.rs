//! XEP-0054 vcard-temp (subset).

use crate::error::Result;
use crate::field::{bool_sub, date_sub, jid_sub, multi_text_sub, text_sub};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "vcard",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let ns = ns::VCARD_TEMP;
    let vcard = reg.define(
        DefinitionBuilder::new("vCardTemp", ns)
            .element("vCard")
            .field("role", text_sub(ns, "ROLE"))
            .field("website", text_sub(ns, "URL"))
            .field("title", text_sub(ns, "TITLE"))
            .field("description", text_sub(ns, "DESC"))
            .field("fullName", text_sub(ns, "FN"))
            .field("birthday", date_sub(ns, "BDAY", false))
            .field("nicknames", multi_text_sub(ns, "NICKNAME"))
            .field("jid", jid_sub(ns, "JABBERID")),
    )?;
    let email = reg.define(
        DefinitionBuilder::new("_email", ns)
            .element("EMAIL")
            .field("email", text_sub(ns, "USERID"))
            .field("home", bool_sub(ns, "HOME"))
            .field("work", bool_sub(ns, "WORK"))
            .field("preferred", bool_sub(ns, "PREF")),
    )?;
    let tel = reg.define(
        DefinitionBuilder::new("_tel", ns)
            .element("TEL")
            .field("number", text_sub(ns, "NUMBER"))
            .field("home", bool_sub(ns, "HOME"))
            .field("work", bool_sub(ns, "WORK"))
            .field("mobile", bool_sub(ns, "CELL"))
            .field("preferred", bool_sub(ns, "PREF")),
    )?;

    reg.extend(vcard, email, Some("emails"), true);
    reg.extend(vcard, tel, Some("phoneNumbers"), true);
    reg.extend_iq(vcard)
}
