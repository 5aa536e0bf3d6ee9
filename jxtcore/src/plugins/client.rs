//! `<message/>`, `<presence/>`, `<iq/>` and stanza errors for the client,
//! server and component namespaces.

use jxtcore_xml::Node;

use crate::error::Result;
use crate::field::{
    Field, FieldAccessor, FieldContext, attribute, bool_sub, enum_sub, jid_attribute,
    lang_attribute, lang_text_sub, number_sub, sub_attribute, text_sub,
};
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "client",
    init,
};

pub const CHAT_STATES: [&str; 5] = ["active", "composing", "paused", "inactive", "gone"];

pub const ERROR_CONDITIONS: [&str; 22] = [
    "bad-request",
    "conflict",
    "feature-not-implemented",
    "forbidden",
    "gone",
    "internal-server-error",
    "item-not-found",
    "jid-malformed",
    "not-acceptable",
    "not-allowed",
    "not-authorized",
    "policy-violation",
    "recipient-unavailable",
    "redirect",
    "registration-required",
    "remote-server-not-found",
    "remote-server-timeout",
    "resource-constraint",
    "service-unavailable",
    "subscription-required",
    "undefined-condition",
    "unexpected-request",
];

/// `message`, `serverMessage`, `componentMessage`, ...
pub fn stanza_name(prefix: &str, base: &str) -> String {
    if prefix.is_empty() {
        return base.to_string();
    }
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => format!("{prefix}{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

/// The body in the stanza's own language. Reads pick the `<body/>` whose
/// `xml:lang` matches the stanza's; a plain string write replaces all bodies.
struct LangBody(Field);

impl FieldAccessor for LangBody {
    fn get(&self, cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        let lang = node.attr("xml:lang").unwrap_or_default();
        match self.0.get(cx, node) {
            FieldValue::LangMap(bodies) => {
                FieldValue::from(bodies.get(lang).cloned().unwrap_or_default())
            }
            _ => FieldValue::from(""),
        }
    }

    fn set(&self, cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        self.0.set(cx, node, value);
    }

    fn describe(&self) -> String {
        "langBody".to_string()
    }
}

fn addressing(builder: DefinitionBuilder) -> DefinitionBuilder {
    builder
        .field("lang", lang_attribute())
        .field("id", attribute("id"))
        .field("to", jid_attribute("to"))
        .field("from", jid_attribute("from"))
}

fn init(reg: &mut Registry) -> Result<()> {
    for (prefix, stanza_ns) in ns::STANZA_NAMESPACES {
        let message = reg.define(
            addressing(
                DefinitionBuilder::new(stanza_name(prefix, "message"), stanza_ns)
                    .element("message")
                    .top_level(),
            )
            .field("type", attribute("type").with_default("normal"))
            .field("thread", text_sub(stanza_ns, "thread"))
            .field("parentThread", sub_attribute(stanza_ns, "thread", "parent"))
            .field("subject", text_sub(stanza_ns, "subject"))
            .field(
                "body",
                crate::field::custom(LangBody(lang_text_sub(stanza_ns, "body"))),
            )
            .field("bodies", lang_text_sub(stanza_ns, "body"))
            .field("attention", bool_sub(ns::ATTENTION_0, "attention"))
            .field("chatState", enum_sub(ns::CHAT_STATES, &CHAT_STATES))
            .field("replace", sub_attribute(ns::CORRECTION_0, "replace", "id"))
            .field("requestReceipt", bool_sub(ns::RECEIPTS, "request"))
            .field("receipt", sub_attribute(ns::RECEIPTS, "received", "id")),
        )?;

        let presence = reg.define(
            addressing(
                DefinitionBuilder::new(stanza_name(prefix, "presence"), stanza_ns)
                    .element("presence")
                    .top_level(),
            )
            .field("type", attribute("type").with_default("available"))
            .field("show", text_sub(stanza_ns, "show"))
            .field("status", text_sub(stanza_ns, "status"))
            .field("statuses", lang_text_sub(stanza_ns, "status"))
            .field("priority", number_sub(stanza_ns, "priority").with_default(0i64)),
        )?;

        let iq = reg.define(
            addressing(
                DefinitionBuilder::new(stanza_name(prefix, "iq"), stanza_ns)
                    .element("iq")
                    .top_level(),
            )
            .field("type", attribute("type")),
        )?;

        let error = reg.define(
            DefinitionBuilder::new(stanza_name(prefix, "error"), stanza_ns)
                .element("error")
                .field("type", attribute("type"))
                .field("code", attribute("code"))
                .field("by", jid_attribute("by"))
                .field("condition", enum_sub(ns::STANZA_ERROR, &ERROR_CONDITIONS))
                .field("gone", text_sub(ns::STANZA_ERROR, "gone"))
                .field("redirect", text_sub(ns::STANZA_ERROR, "redirect"))
                .field("text", text_sub(ns::STANZA_ERROR, "text")),
        )?;

        for parent in [message, presence, iq] {
            reg.extend(parent, error, None, false);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stanza_names() {
        assert_eq!(stanza_name("", "message"), "message");
        assert_eq!(stanza_name("server", "message"), "serverMessage");
        assert_eq!(stanza_name("component", "iq"), "componentIq");
    }
}
