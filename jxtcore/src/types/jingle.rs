use anyhow::{Result, anyhow};
use jxtcore_xml::{Jid, Node};

use crate::ns;
use crate::protocol::{Payload, XmppNode};
use crate::StringEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum JingleAction {
    #[str = "content-accept"]
    ContentAccept,
    #[str = "content-add"]
    ContentAdd,
    #[str = "content-modify"]
    ContentModify,
    #[str = "content-reject"]
    ContentReject,
    #[str = "content-remove"]
    ContentRemove,
    #[str = "description-info"]
    DescriptionInfo,
    #[str = "security-info"]
    SecurityInfo,
    #[str = "session-accept"]
    SessionAccept,
    #[str = "session-info"]
    SessionInfo,
    #[string_default]
    #[str = "session-initiate"]
    SessionInitiate,
    #[str = "session-terminate"]
    SessionTerminate,
    #[str = "transport-accept"]
    TransportAccept,
    #[str = "transport-info"]
    TransportInfo,
    #[str = "transport-reject"]
    TransportReject,
    #[str = "transport-replace"]
    TransportReplace,
}

fn check(node: &Node, ns: &str, tag: &str) -> Result<()> {
    if node.is(ns, tag) {
        Ok(())
    } else {
        Err(anyhow!("expected <{tag} xmlns='{ns}'>, got <{} xmlns='{}'>", node.tag, node.ns))
    }
}

/// XEP-0167 payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadType {
    pub id: u8,
    pub name: Option<String>,
    pub clockrate: Option<u32>,
    pub channels: u8,
}

impl PayloadType {
    pub fn new(id: u8, name: impl Into<String>, clockrate: u32) -> Self {
        Self {
            id,
            name: Some(name.into()),
            clockrate: Some(clockrate),
            channels: 1,
        }
    }
}

impl XmppNode for PayloadType {
    fn tag(&self) -> &'static str {
        "payload-type"
    }

    fn namespace(&self) -> &'static str {
        ns::JINGLE_RTP_1
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::JINGLE_RTP_1, "payload-type");
        node.set_attr("id", self.id.to_string());
        if let Some(name) = self.name {
            node.set_attr("name", name);
        }
        if let Some(clockrate) = self.clockrate {
            node.set_attr("clockrate", clockrate.to_string());
        }
        if self.channels != 1 {
            node.set_attr("channels", self.channels.to_string());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        check(node, ns::JINGLE_RTP_1, "payload-type")?;
        let mut attrs = node.attrs();
        let id = attrs.required_string("id")?.parse::<u8>()?;
        let name = attrs.optional_string("name").map(str::to_string);
        let clockrate = attrs.optional_u32("clockrate");
        let channels = attrs.optional_u32("channels").unwrap_or(1);
        attrs.finish()?;
        Ok(Self {
            id,
            name,
            clockrate,
            channels: u8::try_from(channels)?,
        })
    }
}

/// XEP-0167 RTP application description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rtp {
    pub media: String,
    pub ssrc: Option<String>,
    pub payloads: Vec<PayloadType>,
    pub mux: bool,
}

impl XmppNode for Rtp {
    fn tag(&self) -> &'static str {
        "description"
    }

    fn namespace(&self) -> &'static str {
        ns::JINGLE_RTP_1
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::JINGLE_RTP_1, "description");
        node.set_attr("media", self.media);
        if let Some(ssrc) = self.ssrc {
            node.set_attr("ssrc", ssrc);
        }
        for payload in self.payloads {
            node.append_child(payload.into_node());
        }
        if self.mux {
            node.append_child(Node::element(ns::JINGLE_RTP_1, "rtcp-mux"));
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        check(node, ns::JINGLE_RTP_1, "description")?;
        Ok(Self {
            media: node.attrs().required_string("media")?.to_string(),
            ssrc: node.attr("ssrc").map(str::to_string),
            payloads: node
                .find(ns::JINGLE_RTP_1, "payload-type")
                .map(PayloadType::try_from_node)
                .collect::<Result<_>>()?,
            mux: node.find_first(ns::JINGLE_RTP_1, "rtcp-mux").is_some(),
        })
    }
}

/// XEP-0261 in-band bytestream transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IbbTransport {
    pub sid: String,
    pub block_size: u16,
    /// Blocks go in iq stanzas (acknowledged) rather than messages.
    pub ack: bool,
}

impl XmppNode for IbbTransport {
    fn tag(&self) -> &'static str {
        "transport"
    }

    fn namespace(&self) -> &'static str {
        ns::JINGLE_IBB_1
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::JINGLE_IBB_1, "transport");
        node.set_attr("sid", self.sid);
        node.set_attr("block-size", self.block_size.to_string());
        node.set_attr("stanza", if self.ack { "iq" } else { "message" });
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        check(node, ns::JINGLE_IBB_1, "transport")?;
        let mut attrs = node.attrs();
        let sid = attrs.required_string("sid")?.to_string();
        let block_size = attrs.required_string("block-size")?.parse::<u16>()?;
        let ack = attrs.optional_string("stanza") != Some("message");
        attrs.finish()?;
        Ok(Self {
            sid,
            block_size,
            ack,
        })
    }
}

/// What a content negotiates. Descriptions from namespaces this crate does
/// not model are kept as raw elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Application {
    Rtp(Rtp),
    Unknown(Node),
}

impl Application {
    fn from_node(node: &Node) -> Result<Self> {
        if node.ns == ns::JINGLE_RTP_1 {
            Ok(Application::Rtp(Rtp::try_from_node(node)?))
        } else {
            Ok(Application::Unknown(node.clone()))
        }
    }

    fn into_node(self) -> Node {
        match self {
            Application::Rtp(rtp) => rtp.into_node(),
            Application::Unknown(node) => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Ibb(IbbTransport),
    Unknown(Node),
}

impl Transport {
    fn from_node(node: &Node) -> Result<Self> {
        if node.ns == ns::JINGLE_IBB_1 {
            Ok(Transport::Ibb(IbbTransport::try_from_node(node)?))
        } else {
            Ok(Transport::Unknown(node.clone()))
        }
    }

    fn into_node(self) -> Node {
        match self {
            Transport::Ibb(ibb) => ibb.into_node(),
            Transport::Unknown(node) => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Content {
    pub creator: String,
    pub name: String,
    pub senders: Option<String>,
    pub application: Option<Application>,
    pub transport: Option<Transport>,
}

impl XmppNode for Content {
    fn tag(&self) -> &'static str {
        "content"
    }

    fn namespace(&self) -> &'static str {
        ns::JINGLE_1
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::JINGLE_1, "content");
        node.set_attr("creator", self.creator);
        node.set_attr("name", self.name);
        if let Some(senders) = self.senders {
            node.set_attr("senders", senders);
        }
        if let Some(application) = self.application {
            node.append_child(application.into_node());
        }
        if let Some(transport) = self.transport {
            node.append_child(transport.into_node());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        check(node, ns::JINGLE_1, "content")?;
        let mut attrs = node.attrs();
        let creator = attrs.required_string("creator")?.to_string();
        let name = attrs.required_string("name")?.to_string();
        let senders = attrs.optional_string("senders").map(str::to_string);

        let mut content = Content {
            creator,
            name,
            senders,
            ..Default::default()
        };
        for child in node.children().into_iter().flatten() {
            match child.tag.as_str() {
                "description" if content.application.is_none() => {
                    content.application = Some(Application::from_node(child)?);
                }
                "transport" if content.transport.is_none() => {
                    content.transport = Some(Transport::from_node(child)?);
                }
                _ => {}
            }
        }
        Ok(content)
    }
}

/// XEP-0166 session element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Jingle {
    pub action: JingleAction,
    pub sid: String,
    pub initiator: Option<Jid>,
    pub responder: Option<Jid>,
    pub contents: Vec<Content>,
    /// The reason condition, e.g. `success` on `session-terminate`.
    pub reason: Option<String>,
}

impl XmppNode for Jingle {
    fn tag(&self) -> &'static str {
        "jingle"
    }

    fn namespace(&self) -> &'static str {
        ns::JINGLE_1
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::JINGLE_1, "jingle");
        node.set_attr("action", self.action.as_str());
        node.set_attr("sid", self.sid);
        if let Some(initiator) = self.initiator {
            node.set_attr("initiator", initiator.to_string());
        }
        if let Some(responder) = self.responder {
            node.set_attr("responder", responder.to_string());
        }
        for content in self.contents {
            node.append_child(content.into_node());
        }
        if let Some(reason) = self.reason {
            node.append_child(Node::element(ns::JINGLE_1, "reason"))
                .append_child(Node::element(ns::JINGLE_1, &reason));
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        check(node, ns::JINGLE_1, "jingle")?;
        let mut attrs = node.attrs();
        let action = JingleAction::try_from(attrs.required_string("action")?)?;
        let sid = attrs.required_string("sid")?.to_string();
        let initiator = attrs.optional_jid("initiator");
        let responder = attrs.optional_jid("responder");
        attrs.finish()?;

        let reason = node.find_first(ns::JINGLE_1, "reason").and_then(|reason| {
            reason
                .children()
                .into_iter()
                .flatten()
                .find(|c| c.ns == ns::JINGLE_1 && c.tag != "text")
                .map(|c| c.tag.clone())
        });
        Ok(Self {
            action,
            sid,
            initiator,
            responder,
            contents: node
                .find(ns::JINGLE_1, "content")
                .map(Content::try_from_node)
                .collect::<Result<_>>()?,
            reason,
        })
    }
}

impl Payload for Jingle {
    const TAG: &'static str = "jingle";
    const NAMESPACE: &'static str = ns::JINGLE_1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_parse_session_initiate() {
        let node = unmarshal(
            "<jingle xmlns='urn:xmpp:jingle:1' action='session-initiate' sid='s1' initiator='a@x.com/pc'>\
               <content creator='initiator' name='voice'>\
                 <description xmlns='urn:xmpp:jingle:apps:rtp:1' media='audio'>\
                   <payload-type id='111' name='opus' clockrate='48000' channels='2'/>\
                   <rtcp-mux/>\
                 </description>\
                 <transport xmlns='urn:xmpp:jingle:transports:ibb:1' sid='t1' block-size='4096'/>\
               </content>\
             </jingle>",
        )
        .unwrap();
        let jingle = Jingle::try_from_node(&node).unwrap();
        assert_eq!(jingle.action, JingleAction::SessionInitiate);
        let content = &jingle.contents[0];
        let Some(Application::Rtp(rtp)) = &content.application else {
            panic!("expected RTP, got {:?}", content.application);
        };
        assert_eq!(rtp.media, "audio");
        assert!(rtp.mux);
        assert_eq!(rtp.payloads[0].channels, 2);
        assert!(matches!(
            content.transport,
            Some(Transport::Ibb(IbbTransport { ack: true, block_size: 4096, .. }))
        ));
        assert_eq!(Jingle::try_from_node(&jingle.clone().into_node()).unwrap(), jingle);
    }

    #[test]
    fn test_unknown_application_is_kept() {
        let node = unmarshal(
            "<content xmlns='urn:xmpp:jingle:1' creator='initiator' name='file'>\
               <description xmlns='urn:xmpp:jingle:apps:file-transfer:5'><file/></description>\
             </content>",
        )
        .unwrap();
        let content = Content::try_from_node(&node).unwrap();
        let Some(Application::Unknown(raw)) = &content.application else {
            panic!("expected an unknown application");
        };
        assert_eq!(raw.ns, "urn:xmpp:jingle:apps:file-transfer:5");
        assert!(content.transport.is_none());
    }

    #[test]
    fn test_session_terminate_reason() {
        let jingle = Jingle {
            action: JingleAction::SessionTerminate,
            sid: "s1".to_string(),
            reason: Some("success".to_string()),
            ..Default::default()
        };
        let node = jingle.clone().into_node();
        let reason = node.find_first(ns::JINGLE_1, "reason").unwrap();
        assert!(reason.find_first(ns::JINGLE_1, "success").is_some());
        assert_eq!(Jingle::try_from_node(&node).unwrap(), jingle);
    }
}
