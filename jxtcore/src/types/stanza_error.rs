use anyhow::Result;
use jxtcore_xml::{Jid, Node};

use crate::StringEnum;
use crate::ns;
use crate::protocol::XmppNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum ErrorType {
    #[str = "auth"]
    Auth,
    #[string_default]
    #[str = "cancel"]
    Cancel,
    #[str = "continue"]
    Continue,
    #[str = "modify"]
    Modify,
    #[str = "wait"]
    Wait,
}

pub const UNDEFINED_CONDITION: &str = "undefined-condition";

/// An RFC 6120 stanza error. The condition is kept as its element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanzaError {
    pub error_type: ErrorType,
    pub by: Option<Jid>,
    pub condition: String,
    pub text: Option<String>,
}

impl Default for StanzaError {
    fn default() -> Self {
        Self::new(ErrorType::Cancel, UNDEFINED_CONDITION)
    }
}

impl StanzaError {
    pub fn new(error_type: ErrorType, condition: impl Into<String>) -> Self {
        Self {
            error_type,
            by: None,
            condition: condition.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl XmppNode for StanzaError {
    fn tag(&self) -> &'static str {
        "error"
    }

    fn namespace(&self) -> &'static str {
        ns::CLIENT
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::CLIENT, "error");
        node.set_attr("type", self.error_type.as_str());
        if let Some(by) = self.by {
            node.set_attr("by", by.to_string());
        }
        node.append_child(Node::element(ns::STANZA_ERROR, &self.condition));
        if let Some(text) = self.text {
            node.append_child(Node::element(ns::STANZA_ERROR, "text"))
                .set_text(text);
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        super::expect_stanza(node, "error")?;
        let mut attrs = node.attrs();
        let error_type = match attrs.optional_string("type") {
            Some(t) => ErrorType::try_from(t)?,
            None => ErrorType::default(),
        };
        let by = attrs.optional_jid("by");
        let condition = node
            .children()
            .into_iter()
            .flatten()
            .find(|c| c.ns == ns::STANZA_ERROR && c.tag != "text")
            .map(|c| c.tag.clone())
            .unwrap_or_else(|| UNDEFINED_CONDITION.to_string());
        Ok(Self {
            error_type,
            by,
            condition,
            text: super::child_text(node, ns::STANZA_ERROR, "text"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_parse_stanza_error() {
        let node = unmarshal(
            "<error xmlns='jabber:client' type='modify'>\
               <bad-request xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/>\
               <text xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'>nope</text>\
             </error>",
        )
        .unwrap();
        let error = StanzaError::try_from_node(&node).unwrap();
        assert_eq!(error.error_type, ErrorType::Modify);
        assert_eq!(error.condition, "bad-request");
        assert_eq!(error.text.as_deref(), Some("nope"));
    }

    #[test]
    fn test_missing_condition_is_undefined() {
        let node = Node::element(ns::CLIENT, "error");
        let error = StanzaError::try_from_node(&node).unwrap();
        assert_eq!(error, StanzaError::default());
    }

    #[test]
    fn test_unknown_error_type_is_rejected() {
        let mut node = Node::element(ns::CLIENT, "error");
        node.set_attr("type", "sometimes");
        assert!(StanzaError::try_from_node(&node).is_err());
    }
}
