//! XEP-0313 message archive management.

use jxtcore_xml::Node;

use crate::error::Result;
use crate::field::{FieldAccessor, FieldContext, attribute, bool_attribute, custom};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "mam",
    init,
};

/// `<always><jid>..</jid>...</always>`: a JID list under a wrapper that only
/// exists while the list is non-empty.
struct WrappedJids(&'static str);

impl FieldAccessor for WrappedJids {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        let jids = node
            .find_first(ns::MAM_2, self.0)
            .into_iter()
            .flat_map(|wrapper| wrapper.find(ns::MAM_2, "jid"))
            .filter_map(|jid| jid.text().parse().ok())
            .map(FieldValue::Jid)
            .collect();
        FieldValue::List(jids)
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        node.remove_children(ns::MAM_2, self.0);
        let jids: Vec<String> = value
            .into_list()
            .iter()
            .filter_map(FieldValue::to_text)
            .filter(|t| !t.is_empty())
            .collect();
        if jids.is_empty() {
            return;
        }
        let wrapper = node.append_child(Node::element(ns::MAM_2, self.0));
        for jid in jids {
            wrapper.append_child(Node::element(ns::MAM_2, "jid")).set_text(jid);
        }
    }

    fn describe(&self) -> String {
        "jidList".to_string()
    }
}

fn init(reg: &mut Registry) -> Result<()> {
    let query = reg.define(
        DefinitionBuilder::new("mam", ns::MAM_2)
            .element("query")
            .field("queryid", attribute("queryid"))
            .field("node", attribute("node")),
    )?;
    let result = reg.define(
        DefinitionBuilder::new("mamItem", ns::MAM_2)
            .element("result")
            .field("queryid", attribute("queryid"))
            .field("id", attribute("id")),
    )?;
    let fin = reg.define(
        DefinitionBuilder::new("mamResult", ns::MAM_2)
            .element("fin")
            .field("complete", bool_attribute("complete"))
            .field("stable", bool_attribute("stable")),
    )?;
    let prefs = reg.define(
        DefinitionBuilder::new("mamPrefs", ns::MAM_2)
            .element("prefs")
            .field("defaultCondition", attribute("default"))
            .field("always", custom(WrappedJids("always")))
            .field("never", custom(WrappedJids("never"))),
    )?;

    reg.extend_iq(query)?;
    reg.extend_iq(fin)?;
    reg.extend_iq(prefs)?;
    reg.extend_message(result)?;

    reg.with_definition("set", ns::RSM, move |reg, paging| {
        reg.extend(query, paging, None, false);
        reg.extend(fin, paging, None, false);
        Ok(())
    })?;
    reg.with_data_form(move |reg, form| {
        reg.extend(query, form, None, false);
        Ok(())
    })?;
    reg.with_definition("forwarded", ns::FORWARD_0, move |reg, forwarded| {
        reg.extend(result, forwarded, None, false);
        Ok(())
    })?;

    Ok(())
}
