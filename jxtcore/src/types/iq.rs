use anyhow::{Result, anyhow};
use jxtcore_xml::{Jid, Node};

use super::{StanzaError, expect_stanza};
use crate::StringEnum;
use crate::ns;
use crate::protocol::{Payload, XmppNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum IqType {
    #[str = "get"]
    Get,
    #[str = "set"]
    Set,
    #[str = "result"]
    Result,
    #[str = "error"]
    Error,
}

/// An info/query stanza with at most one payload element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Iq {
    pub id: String,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub iq_type: IqType,
    pub payload: Option<Node>,
    pub error: Option<StanzaError>,
}

impl Iq {
    pub fn get(id: impl Into<String>, payload: impl XmppNode) -> Self {
        Self {
            id: id.into(),
            iq_type: IqType::Get,
            payload: Some(payload.into_node()),
            ..Default::default()
        }
    }

    pub fn set(id: impl Into<String>, payload: impl XmppNode) -> Self {
        Self {
            id: id.into(),
            iq_type: IqType::Set,
            payload: Some(payload.into_node()),
            ..Default::default()
        }
    }

    /// An empty `result` addressed back to the sender.
    pub fn result_for(&self) -> Self {
        Self {
            id: self.id.clone(),
            from: self.to.clone(),
            to: self.from.clone(),
            iq_type: IqType::Result,
            payload: None,
            error: None,
        }
    }

    /// An `error` reply carrying `error`, addressed back to the sender.
    pub fn error_for(&self, error: StanzaError) -> Self {
        Self {
            iq_type: IqType::Error,
            error: Some(error),
            ..self.result_for()
        }
    }

    pub fn with_to(mut self, to: Jid) -> Self {
        self.to = Some(to);
        self
    }

    /// Parses the payload as `T`, if the payload has `T`'s qualified name.
    pub fn payload_as<T: Payload>(&self) -> Option<Result<T>> {
        self.payload
            .as_ref()
            .filter(|n| n.is(T::NAMESPACE, T::TAG))
            .map(T::try_from_node)
    }
}

impl XmppNode for Iq {
    fn tag(&self) -> &'static str {
        "iq"
    }

    fn namespace(&self) -> &'static str {
        ns::CLIENT
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::CLIENT, "iq");
        node.set_attr("id", self.id);
        if let Some(to) = self.to {
            node.set_attr("to", to.to_string());
        }
        if let Some(from) = self.from {
            node.set_attr("from", from.to_string());
        }
        node.set_attr("type", self.iq_type.as_str());
        if let Some(payload) = self.payload {
            node.append_child(payload);
        }
        if let Some(error) = self.error {
            node.append_child(error.into_node());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        expect_stanza(node, "iq")?;
        let own = node.ns.as_str();
        let mut attrs = node.attrs();
        let id = attrs.required_string("id")?.to_string();
        let iq_type = IqType::try_from(attrs.required_string("type")?)?;
        let from = attrs.optional_jid("from");
        let to = attrs.optional_jid("to");
        attrs.finish()?;

        let mut payload = None;
        let mut error = None;
        for child in node.children().into_iter().flatten() {
            if child.tag == "error" && child.ns == own {
                error = Some(StanzaError::try_from_node(child)?);
            } else if payload.is_none() {
                payload = Some(child.clone());
            } else {
                return Err(anyhow!("iq '{id}' carries more than one payload"));
            }
        }
        if iq_type == IqType::Error && error.is_none() {
            return Err(anyhow!("error iq '{id}' has no <error/>"));
        }
        Ok(Self {
            id,
            from,
            to,
            iq_type,
            payload,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_parse_error_reply() {
        let node = unmarshal(
            "<iq xmlns='jabber:client' id='q1' type='error' from='x.com'>\
               <ping xmlns='urn:xmpp:ping'/>\
               <error type='cancel'><service-unavailable xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error>\
             </iq>",
        )
        .unwrap();
        let iq = Iq::try_from_node(&node).unwrap();
        assert_eq!(iq.iq_type, IqType::Error);
        assert!(iq.payload.as_ref().unwrap().is(ns::PING, "ping"));
        assert_eq!(iq.error.unwrap().condition, "service-unavailable");
    }

    #[test]
    fn test_type_strings_include_error() {
        assert_eq!(IqType::try_from("error").unwrap(), IqType::Error);
        assert_eq!(IqType::Error.as_str(), "error");
        assert_eq!(
            crate::types::MessageType::try_from("error").unwrap(),
            crate::types::MessageType::Error
        );
        assert_eq!(
            crate::types::PresenceType::try_from("error").unwrap(),
            crate::types::PresenceType::Error
        );
        assert!(IqType::try_from("fetch").is_err());
    }

    #[test]
    fn test_required_attributes() {
        for xml in [
            "<iq xmlns='jabber:client' type='get'/>",
            "<iq xmlns='jabber:client' id='a'/>",
            "<iq xmlns='jabber:client' id='a' type='fetch'/>",
            "<iq xmlns='jabber:client' id='a' type='error'/>",
        ] {
            assert!(Iq::try_from_node(&unmarshal(xml).unwrap()).is_err(), "{xml}");
        }
    }

    #[test]
    fn test_result_for_swaps_addresses() {
        let request = Iq {
            id: "r1".to_string(),
            from: Some("a@x.com/pc".parse().unwrap()),
            to: Some("x.com".parse().unwrap()),
            iq_type: IqType::Get,
            ..Default::default()
        };
        let reply = request.result_for();
        assert_eq!(reply.id, "r1");
        assert_eq!(reply.to, request.from);
        assert_eq!(reply.from, request.to);
        assert_eq!(reply.iq_type, IqType::Result);
    }
}
