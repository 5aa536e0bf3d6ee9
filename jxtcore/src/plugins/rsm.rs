//! XEP-0059 result set management.

use jxtcore_xml::Node;

use crate::error::Result;
use crate::field::{FieldAccessor, FieldContext, custom, number_sub, number_sub_attribute, text_sub};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "rsm",
    init,
};

/// `<before/>` doubles as a flag: an empty element asks for the last page.
/// Reads give `Bool(true)` for the empty element and the id otherwise.
struct Before;

impl FieldAccessor for Before {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        match node.find_first(ns::RSM, "before") {
            Some(before) if before.text().is_empty() => FieldValue::Bool(true),
            Some(before) => FieldValue::from(before.text()),
            None => FieldValue::from(""),
        }
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        match value {
            FieldValue::Bool(true) => node.find_or_create(ns::RSM, "before").set_text(""),
            FieldValue::Bool(false) | FieldValue::None => {
                node.remove_children(ns::RSM, "before");
            }
            other => match other.to_text().filter(|t| !t.is_empty()) {
                Some(id) => node.find_or_create(ns::RSM, "before").set_text(id),
                None => {
                    node.remove_children(ns::RSM, "before");
                }
            },
        }
    }

    fn describe(&self) -> String {
        "rsmBefore".to_string()
    }
}

fn init(reg: &mut Registry) -> Result<()> {
    reg.define(
        DefinitionBuilder::new("paging", ns::RSM)
            .element("set")
            .field("after", text_sub(ns::RSM, "after"))
            .field("before", custom(Before))
            .field("count", number_sub(ns::RSM, "count"))
            .field("first", text_sub(ns::RSM, "first"))
            .field("firstIndex", number_sub_attribute(ns::RSM, "first", "index"))
            .field("index", number_sub(ns::RSM, "index"))
            .field("last", text_sub(ns::RSM, "last"))
            .field("max", number_sub(ns::RSM, "max")),
    )?;
    Ok(())
}
