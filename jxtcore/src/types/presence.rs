use anyhow::{Result, anyhow};
use jxtcore_xml::{Jid, Node};

use super::{Delay, Extensible, StanzaError, child_text, expect_stanza, push_text_child};
use crate::StringEnum;
use crate::ns;
use crate::protocol::XmppNode;

/// Presence `type`. `Available` is the absence of the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum PresenceType {
    #[string_default]
    #[str = "available"]
    Available,
    #[str = "unavailable"]
    Unavailable,
    #[str = "subscribe"]
    Subscribe,
    #[str = "subscribed"]
    Subscribed,
    #[str = "unsubscribe"]
    Unsubscribe,
    #[str = "unsubscribed"]
    Unsubscribed,
    #[str = "probe"]
    Probe,
    #[str = "error"]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum Show {
    #[str = "away"]
    Away,
    #[str = "chat"]
    Chat,
    #[str = "dnd"]
    Dnd,
    #[str = "xa"]
    Xa,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Presence {
    pub id: Option<String>,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub presence_type: PresenceType,
    pub show: Option<Show>,
    pub status: Option<String>,
    pub priority: i8,
    pub delay: Option<Delay>,
    pub error: Option<StanzaError>,
    pub payloads: Vec<Node>,
}

impl Presence {
    pub fn available() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            presence_type: PresenceType::Unavailable,
            ..Default::default()
        }
    }
}

impl Extensible for Presence {
    fn payloads(&self) -> &[Node] {
        &self.payloads
    }

    fn payloads_mut(&mut self) -> &mut Vec<Node> {
        &mut self.payloads
    }
}

impl XmppNode for Presence {
    fn tag(&self) -> &'static str {
        "presence"
    }

    fn namespace(&self) -> &'static str {
        ns::CLIENT
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::CLIENT, "presence");
        if let Some(id) = self.id {
            node.set_attr("id", id);
        }
        if let Some(to) = self.to {
            node.set_attr("to", to.to_string());
        }
        if let Some(from) = self.from {
            node.set_attr("from", from.to_string());
        }
        if self.presence_type != PresenceType::Available {
            node.set_attr("type", self.presence_type.as_str());
        }
        push_text_child(&mut node, ns::CLIENT, "show", self.show.map(|s| s.to_string()));
        push_text_child(&mut node, ns::CLIENT, "status", self.status);
        if self.priority != 0 {
            push_text_child(&mut node, ns::CLIENT, "priority", Some(self.priority.to_string()));
        }
        if let Some(delay) = self.delay {
            node.append_child(delay.into_node());
        }
        if let Some(error) = self.error {
            node.append_child(error.into_node());
        }
        for payload in self.payloads {
            node.append_child(payload);
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        expect_stanza(node, "presence")?;
        let own = node.ns.as_str();
        let mut attrs = node.attrs();
        let presence_type = match attrs.optional_string("type") {
            // "available" is not a wire value
            Some("available") => return Err(anyhow!("invalid presence type 'available'")),
            Some(t) => PresenceType::try_from(t)?,
            None => PresenceType::Available,
        };
        let mut presence = Presence {
            id: attrs.optional_string("id").map(str::to_string),
            from: attrs.optional_jid("from"),
            to: attrs.optional_jid("to"),
            presence_type,
            show: child_text(node, own, "show")
                .map(|s| Show::try_from(s.as_str()))
                .transpose()?,
            status: child_text(node, own, "status"),
            priority: child_text(node, own, "priority")
                .map(|p| p.trim().parse::<i8>())
                .transpose()?
                .unwrap_or(0),
            ..Default::default()
        };
        attrs.finish()?;

        for child in node.children().into_iter().flatten() {
            match (child.ns.as_str(), child.tag.as_str()) {
                (child_ns, "show" | "status" | "priority" | "error") if child_ns == own => {
                    if child.tag == "error" {
                        presence.error = Some(StanzaError::try_from_node(child)?);
                    }
                }
                (ns::DELAY, "delay") => presence.delay = Some(Delay::try_from_node(child)?),
                _ => presence.payloads.push(child.clone()),
            }
        }
        Ok(presence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_parse_presence() {
        let node = unmarshal(
            "<presence xmlns='jabber:client' from='a@x.com/pc'>\
               <show>dnd</show><status>busy</status><priority>5</priority>\
               <x xmlns='http://jabber.org/protocol/muc'/>\
             </presence>",
        )
        .unwrap();
        let presence = Presence::try_from_node(&node).unwrap();
        assert_eq!(presence.presence_type, PresenceType::Available);
        assert_eq!(presence.show, Some(Show::Dnd));
        assert_eq!(presence.priority, 5);
        assert_eq!(presence.payloads.len(), 1);
        assert_eq!(Presence::try_from_node(&presence.clone().into_node()).unwrap(), presence);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for xml in [
            "<presence xmlns='jabber:client' type='available'/>",
            "<presence xmlns='jabber:client'><show>sleeping</show></presence>",
            "<presence xmlns='jabber:client'><priority>500</priority></presence>",
        ] {
            assert!(Presence::try_from_node(&unmarshal(xml).unwrap()).is_err(), "{xml}");
        }
    }
}
