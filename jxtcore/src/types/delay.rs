use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use jxtcore_xml::{Jid, Node};

use super::Message;
use crate::ns;
use crate::protocol::{Payload, XmppNode};
use crate::value::format_date;

/// XEP-0203 delayed delivery stamp.
///
/// Wire format: `<delay xmlns="urn:xmpp:delay" from="..." stamp="...">reason</delay>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delay {
    pub from: Option<Jid>,
    pub stamp: DateTime<Utc>,
    pub reason: Option<String>,
}

impl Delay {
    pub fn new(stamp: DateTime<Utc>) -> Self {
        Self {
            from: None,
            stamp,
            reason: None,
        }
    }
}

impl XmppNode for Delay {
    fn tag(&self) -> &'static str {
        "delay"
    }

    fn namespace(&self) -> &'static str {
        ns::DELAY
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::DELAY, "delay");
        if let Some(from) = self.from {
            node.set_attr("from", from.to_string());
        }
        node.set_attr("stamp", format_date(&self.stamp));
        if let Some(reason) = self.reason {
            node.set_text(reason);
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::DELAY, "delay") {
            return Err(anyhow!("expected <delay xmlns='{}'>, got <{}>", ns::DELAY, node.tag));
        }
        let mut attrs = node.attrs();
        let from = attrs.optional_jid("from");
        let stamp = attrs.optional_datetime("stamp");
        attrs.finish()?;
        let stamp = stamp.ok_or_else(|| anyhow!("<delay/> is missing its stamp"))?;
        let reason = Some(node.text()).filter(|t| !t.is_empty()).map(str::to_string);
        Ok(Self {
            from,
            stamp,
            reason,
        })
    }
}

impl Payload for Delay {
    const TAG: &'static str = "delay";
    const NAMESPACE: &'static str = ns::DELAY;
}

/// XEP-0297 forwarded message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Forwarded {
    pub delay: Option<Delay>,
    pub message: Option<Box<Message>>,
}

impl XmppNode for Forwarded {
    fn tag(&self) -> &'static str {
        "forwarded"
    }

    fn namespace(&self) -> &'static str {
        ns::FORWARD_0
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::FORWARD_0, "forwarded");
        if let Some(delay) = self.delay {
            node.append_child(delay.into_node());
        }
        if let Some(message) = self.message {
            node.append_child(message.into_node());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::FORWARD_0, "forwarded") {
            return Err(anyhow!("expected <forwarded xmlns='{}'>, got <{}>", ns::FORWARD_0, node.tag));
        }
        let delay = Delay::find_in(node).transpose()?;
        let message = node
            .children()
            .into_iter()
            .flatten()
            .find(|c| c.tag == "message")
            .map(Message::try_from_node)
            .transpose()?
            .map(Box::new);
        Ok(Self { delay, message })
    }
}

impl Payload for Forwarded {
    const TAG: &'static str = "forwarded";
    const NAMESPACE: &'static str = ns::FORWARD_0;
}

/// XEP-0280 carbon copy of a message sent or received by another resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Carbon {
    Sent(Forwarded),
    Received(Forwarded),
}

impl Carbon {
    pub fn forwarded(&self) -> &Forwarded {
        match self {
            Carbon::Sent(f) | Carbon::Received(f) => f,
        }
    }

    /// Finds the carbon wrapper among a message's children.
    pub fn find_in(parent: &Node) -> Option<Result<Self>> {
        parent
            .children()
            .into_iter()
            .flatten()
            .find(|c| c.ns == ns::CARBONS_2 && matches!(c.tag.as_str(), "sent" | "received"))
            .map(Self::try_from_node)
    }
}

impl XmppNode for Carbon {
    fn tag(&self) -> &'static str {
        match self {
            Carbon::Sent(_) => "sent",
            Carbon::Received(_) => "received",
        }
    }

    fn namespace(&self) -> &'static str {
        ns::CARBONS_2
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::CARBONS_2, self.tag());
        let forwarded = match self {
            Carbon::Sent(f) | Carbon::Received(f) => f,
        };
        node.append_child(forwarded.into_node());
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if node.ns != ns::CARBONS_2 {
            return Err(anyhow!("expected a carbon in {}, got {}", ns::CARBONS_2, node.ns));
        }
        let forwarded = Forwarded::find_in(node)
            .ok_or_else(|| anyhow!("carbon without <forwarded/>"))??;
        match node.tag.as_str() {
            "sent" => Ok(Carbon::Sent(forwarded)),
            "received" => Ok(Carbon::Received(forwarded)),
            other => Err(anyhow!("unknown carbon element <{other}>")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_delay_requires_valid_stamp() {
        let node = unmarshal("<delay xmlns='urn:xmpp:delay' stamp='2002-09-10T23:08:25Z'>Offline</delay>")
            .unwrap();
        let delay = Delay::try_from_node(&node).unwrap();
        assert_eq!(delay.stamp, Utc.with_ymd_and_hms(2002, 9, 10, 23, 8, 25).unwrap());
        assert_eq!(delay.reason.as_deref(), Some("Offline"));

        let bad = unmarshal("<delay xmlns='urn:xmpp:delay' stamp='yesterday'/>").unwrap();
        assert!(Delay::try_from_node(&bad).is_err());
        let missing = unmarshal("<delay xmlns='urn:xmpp:delay'/>").unwrap();
        assert!(Delay::try_from_node(&missing).is_err());
    }

    #[test]
    fn test_received_carbon() {
        let node = unmarshal(
            "<received xmlns='urn:xmpp:carbons:2'>\
               <forwarded xmlns='urn:xmpp:forward:0'>\
                 <message xmlns='jabber:client' from='a@x.com/phone' type='chat'><body>hi</body></message>\
               </forwarded>\
             </received>",
        )
        .unwrap();
        let carbon = Carbon::try_from_node(&node).unwrap();
        assert!(matches!(carbon, Carbon::Received(_)));
        let message = carbon.forwarded().message.as_deref().unwrap();
        assert_eq!(message.body.as_deref(), Some("hi"));
        assert_eq!(Carbon::try_from_node(&carbon.clone().into_node()).unwrap(), carbon);
    }
}
