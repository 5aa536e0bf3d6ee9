use anyhow::{Result, anyhow};
use jxtcore_xml::{Jid, Node};

use crate::ns;
use crate::protocol::Payload;
use crate::{StringEnum, XmppNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum Subscription {
    #[str = "none"]
    None,
    #[str = "to"]
    To,
    #[str = "from"]
    From,
    #[str = "both"]
    Both,
    #[str = "remove"]
    Remove,
}

/// Wire format: `<item xmlns="jabber:iq:roster" jid=".." name=".."><group>..</group></item>`
#[derive(Debug, Clone, PartialEq, Eq, Default, XmppNode)]
#[xmpp(tag = "item", ns = "jabber:iq:roster")]
pub struct RosterItem {
    #[attr(name = "jid", jid)]
    pub jid: Jid,
    #[attr(name = "name")]
    pub name: Option<String>,
    #[attr(name = "subscription", default = "none")]
    pub subscription: String,
    #[attr(name = "ask")]
    pub ask: Option<String>,
    #[multi_text_sub(name = "group")]
    pub groups: Vec<String>,
}

impl RosterItem {
    pub fn new(jid: Jid) -> Self {
        Self {
            jid,
            subscription: Subscription::None.to_string(),
            ..Default::default()
        }
    }

    pub fn subscription(&self) -> Result<Subscription> {
        Subscription::try_from(self.subscription.as_str())
    }

    pub fn is_pending_out(&self) -> bool {
        self.ask.as_deref() == Some("subscribe")
    }
}

/// `<query xmlns="jabber:iq:roster" ver="..">` with its items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterQuery {
    pub ver: Option<String>,
    pub items: Vec<RosterItem>,
}

impl XmppNode for RosterQuery {
    fn tag(&self) -> &'static str {
        "query"
    }

    fn namespace(&self) -> &'static str {
        ns::ROSTER
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::ROSTER, "query");
        if let Some(ver) = self.ver {
            node.set_attr("ver", ver);
        }
        for item in self.items {
            node.append_child(item.into_node());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::ROSTER, "query") {
            return Err(anyhow!("expected roster query, got <{} xmlns='{}'>", node.tag, node.ns));
        }
        let items = node
            .find(ns::ROSTER, "item")
            .map(RosterItem::try_from_node)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            ver: node.attr("ver").map(str::to_string),
            items,
        })
    }
}

impl Payload for RosterQuery {
    const TAG: &'static str = "query";
    const NAMESPACE: &'static str = ns::ROSTER;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_roster_item_derive() {
        let node = unmarshal(
            "<item xmlns='jabber:iq:roster' jid='a@x.com' ask='subscribe'>\
               <group>Friends</group><group>Work</group>\
             </item>",
        )
        .unwrap();
        let item = RosterItem::try_from_node(&node).unwrap();
        assert_eq!(item.jid, Jid::new("a", "x.com"));
        assert_eq!(item.subscription().unwrap(), Subscription::None);
        assert!(item.is_pending_out());
        assert_eq!(item.groups, vec!["Friends", "Work"]);

        let rebuilt = item.clone().into_node();
        assert_eq!(rebuilt.attr("subscription"), Some("none"));
        assert_eq!(RosterItem::try_from_node(&rebuilt).unwrap(), item);
    }

    #[test]
    fn test_item_without_jid_is_rejected() {
        let node = unmarshal("<item xmlns='jabber:iq:roster' name='x'/>").unwrap();
        assert!(RosterItem::try_from_node(&node).is_err());
    }

    #[test]
    fn test_query_keeps_item_order() {
        let query = RosterQuery {
            ver: Some("v3".to_string()),
            items: vec![
                RosterItem::new(Jid::new("b", "x.com")),
                RosterItem::new(Jid::new("a", "x.com")),
            ],
        };
        let parsed = RosterQuery::try_from_node(&query.clone().into_node()).unwrap();
        assert_eq!(parsed, query);
    }
}
