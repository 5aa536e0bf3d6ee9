//! XEP-0004 data forms (subset: fields, options, reported fields, items).

use crate::error::Result;
use crate::field::{
    attribute, bool_sub, multi_text_sub, sub_multi_extension, text_sub,
};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "dataforms",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let form = reg.define(
        DefinitionBuilder::new("form", ns::DATAFORM)
            .element("x")
            .field("title", text_sub(ns::DATAFORM, "title"))
            .field("instructions", multi_text_sub(ns::DATAFORM, "instructions"))
            .field("type", attribute("type").with_default("form")),
    )?;
    let field = reg.define(
        DefinitionBuilder::new("_field", ns::DATAFORM)
            .element("field")
            .field("type", attribute("type").with_default("text-single"))
            .field("name", attribute("var"))
            .field("label", attribute("label"))
            .field("desc", text_sub(ns::DATAFORM, "desc"))
            .field("required", bool_sub(ns::DATAFORM, "required"))
            .field("values", multi_text_sub(ns::DATAFORM, "value"))
            .field("value", text_sub(ns::DATAFORM, "value")),
    )?;
    let option = reg.define(
        DefinitionBuilder::new("_formoption", ns::DATAFORM)
            .element("option")
            .field("label", attribute("label"))
            .field("value", text_sub(ns::DATAFORM, "value")),
    )?;
    let item = reg.define(DefinitionBuilder::new("_formitem", ns::DATAFORM).element("item"))?;

    reg.extend(form, field, Some("fields"), true);
    reg.extend(field, option, Some("options"), true);
    reg.extend(item, field, Some("fields"), true);
    reg.extend(form, item, Some("items"), true);
    reg.add(form, "reportedFields", sub_multi_extension(ns::DATAFORM, "reported", field));

    reg.extend_message(form)
}
