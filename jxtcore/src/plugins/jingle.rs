//! XEP-0166 Jingle sessions.
//!
//! A content's `application` and `transport` are polymorphic: any definition
//! tagged `jingle-application` / `jingle-transport` can fill them, and other
//! plugins add new kinds without touching this one.

use jxtcore_xml::Node;

use crate::error::Result;
use crate::field::{
    FieldAccessor, FieldContext, attribute, custom, enum_sub, jid_attribute, tagged, text_sub,
};
use crate::ns;
use crate::registry::{DefinitionBuilder, DefinitionId, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "jingle",
    init,
};

pub const APPLICATION_TAG: &str = "jingle-application";
pub const TRANSPORT_TAG: &str = "jingle-transport";

pub const ERROR_CONDITIONS: [&str; 4] = [
    "out-of-order",
    "tie-break",
    "unknown-session",
    "unsupported-info",
];

pub const REASONS: [&str; 17] = [
    "alternative-session",
    "busy",
    "cancel",
    "connectivity-error",
    "decline",
    "expired",
    "failed-application",
    "failed-transport",
    "general-error",
    "gone",
    "incompatible-parameters",
    "media-error",
    "security-error",
    "success",
    "timeout",
    "unsupported-applications",
    "unsupported-transports",
];

/// The session id inside `<alternative-session/>`. Writing it also sets the
/// reason condition.
struct AlternativeSession;

impl FieldAccessor for AlternativeSession {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        let sid = node
            .find_first(ns::JINGLE_1, "alternative-session")
            .and_then(|alt| alt.find_first(ns::JINGLE_1, "sid"))
            .map(Node::text)
            .unwrap_or_default();
        FieldValue::from(sid)
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        let Some(sid) = value.to_text().filter(|s| !s.is_empty()) else {
            return;
        };
        node.retain_children(|c| {
            !(c.ns == ns::JINGLE_1 && REASONS.contains(&c.tag.as_str()))
        });
        node.append_child(Node::element(ns::JINGLE_1, "alternative-session"))
            .append_child(Node::element(ns::JINGLE_1, "sid"))
            .set_text(sid);
    }

    fn describe(&self) -> String {
        "alternativeSession".to_string()
    }
}

fn init(reg: &mut Registry) -> Result<()> {
    let jingle = reg.define(
        DefinitionBuilder::new("jingle", ns::JINGLE_1)
            .field("action", attribute("action"))
            .field("initiator", jid_attribute("initiator"))
            .field("responder", jid_attribute("responder"))
            .field("sid", attribute("sid")),
    )?;
    let content = reg.define(
        DefinitionBuilder::new("_jingleContent", ns::JINGLE_1)
            .element("content")
            .field("creator", attribute("creator"))
            .field("disposition", attribute("disposition").with_default("session"))
            .field("name", attribute("name"))
            .field("senders", attribute("senders").with_default("both"))
            .field("application", tagged(APPLICATION_TAG, "applicationType"))
            .field("transport", tagged(TRANSPORT_TAG, "transportType")),
    )?;
    let reason = reg.define(
        DefinitionBuilder::new("reason", ns::JINGLE_1)
            .field("condition", enum_sub(ns::JINGLE_1, &REASONS))
            .field("alternativeSession", custom(AlternativeSession))
            .field("text", text_sub(ns::JINGLE_1, "text")),
    )?;

    reg.extend(jingle, content, Some("contents"), true);
    reg.extend(jingle, reason, None, false);
    reg.extend_iq(jingle)?;

    let attach = move |reg: &mut Registry, kind: DefinitionId| -> Result<()> {
        reg.extend(content, kind, None, false);
        Ok(())
    };
    reg.with_tag(APPLICATION_TAG, attach)?;
    reg.with_tag(TRANSPORT_TAG, attach)?;

    reg.with_stanza_error(|reg, error| {
        reg.add(error, "jingleCondition", enum_sub(ns::JINGLE_ERRORS_1, &ERROR_CONDITIONS));
        Ok(())
    })
}
