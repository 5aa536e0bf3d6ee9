use anyhow::Result;
use jxtcore_xml::{Jid, Node};

use super::{Delay, Extensible, StanzaError, child_text, expect_stanza, push_text_child};
use crate::StringEnum;
use crate::ns;
use crate::protocol::XmppNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum MessageType {
    #[string_default]
    #[str = "normal"]
    Normal,
    #[str = "chat"]
    Chat,
    #[str = "groupchat"]
    Groupchat,
    #[str = "headline"]
    Headline,
    #[str = "error"]
    Error,
}

/// XEP-0085 chat state notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum ChatState {
    #[str = "active"]
    Active,
    #[str = "composing"]
    Composing,
    #[str = "paused"]
    Paused,
    #[str = "inactive"]
    Inactive,
    #[str = "gone"]
    Gone,
}

/// A `jabber:client` message with the common extensions pulled out into
/// fields. Everything else stays in `payloads`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub id: Option<String>,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub message_type: MessageType,
    pub lang: Option<String>,
    pub body: Option<String>,
    pub subject: Option<String>,
    pub thread: Option<String>,
    pub chat_state: Option<ChatState>,
    /// XEP-0184 `<request/>`.
    pub request_receipt: bool,
    /// XEP-0184 `<received id=".."/>`.
    pub receipt: Option<String>,
    pub delay: Option<Delay>,
    pub error: Option<StanzaError>,
    pub payloads: Vec<Node>,
}

impl Message {
    pub fn chat(to: Jid, body: impl Into<String>) -> Self {
        Self {
            to: Some(to),
            message_type: MessageType::Chat,
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// The receipt acknowledging this message, when it asked for one.
    pub fn receipt_reply(&self) -> Option<Message> {
        if !self.request_receipt {
            return None;
        }
        Some(Message {
            to: self.from.clone(),
            message_type: self.message_type,
            receipt: self.id.clone(),
            ..Default::default()
        })
    }
}

impl Extensible for Message {
    fn payloads(&self) -> &[Node] {
        &self.payloads
    }

    fn payloads_mut(&mut self) -> &mut Vec<Node> {
        &mut self.payloads
    }
}

impl XmppNode for Message {
    fn tag(&self) -> &'static str {
        "message"
    }

    fn namespace(&self) -> &'static str {
        ns::CLIENT
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::CLIENT, "message");
        if let Some(lang) = self.lang {
            node.set_attr("xml:lang", lang);
        }
        if let Some(id) = self.id {
            node.set_attr("id", id);
        }
        if let Some(to) = self.to {
            node.set_attr("to", to.to_string());
        }
        if let Some(from) = self.from {
            node.set_attr("from", from.to_string());
        }
        if self.message_type != MessageType::Normal {
            node.set_attr("type", self.message_type.as_str());
        }
        push_text_child(&mut node, ns::CLIENT, "subject", self.subject);
        push_text_child(&mut node, ns::CLIENT, "body", self.body);
        push_text_child(&mut node, ns::CLIENT, "thread", self.thread);
        if let Some(state) = self.chat_state {
            node.append_child(Node::element(ns::CHAT_STATES, state.as_str()));
        }
        if self.request_receipt {
            node.append_child(Node::element(ns::RECEIPTS, "request"));
        }
        if let Some(id) = self.receipt {
            node.append_child(Node::element(ns::RECEIPTS, "received"))
                .set_attr("id", id);
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
        expect_stanza(node, "message")?;
        let own = node.ns.as_str();
        let mut attrs = node.attrs();
        let mut message = Message {
            id: attrs.optional_string("id").map(str::to_string),
            from: attrs.optional_jid("from"),
            to: attrs.optional_jid("to"),
            message_type: match attrs.optional_string("type") {
                Some(t) => MessageType::try_from(t)?,
                None => MessageType::Normal,
            },
            lang: attrs.optional_string("xml:lang").map(str::to_string),
            body: child_text(node, own, "body"),
            subject: child_text(node, own, "subject"),
            thread: child_text(node, own, "thread"),
            ..Default::default()
        };
        attrs.finish()?;

        for child in node.children().into_iter().flatten() {
            match (child.ns.as_str(), child.tag.as_str()) {
                // Only the first of each is modelled; extra ones (other
                // languages) stay as payloads.
                (child_ns, tag @ ("body" | "subject" | "thread"))
                    if child_ns == own
                        && node
                            .find_first(own, tag)
                            .is_some_and(|first| std::ptr::eq(first, child)) => {}
                (ns::CHAT_STATES, tag) => message.chat_state = Some(ChatState::try_from(tag)?),
                (ns::RECEIPTS, "request") => message.request_receipt = true,
                (ns::RECEIPTS, "received") => {
                    message.receipt = child.attr("id").map(str::to_string);
                }
                (ns::DELAY, "delay") => message.delay = Some(Delay::try_from_node(child)?),
                (_, "error") if child.ns == own => {
                    message.error = Some(StanzaError::try_from_node(child)?);
                }
                _ => message.payloads.push(child.clone()),
            }
        }
        Ok(message)
    }
}
