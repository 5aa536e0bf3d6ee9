//! XEP-0191 blocking command.

use anyhow::{Result, anyhow};
use jxtcore_xml::{Jid, Node};
use log::warn;

use crate::StringEnum;
use crate::iq::node::required_jid;
use crate::iq::request::InfoQuery;
use crate::iq::spec::IqSpec;
use crate::ns;
use crate::protocol::{Payload, XmppNode};
use crate::types::Iq;

/// Action to perform on blocklist entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StringEnum)]
pub enum BlocklistAction {
    #[str = "block"]
    Block,
    #[str = "unblock"]
    Unblock,
}

/// Wire format: `<item jid="..."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistEntry {
    pub jid: Jid,
}

impl XmppNode for BlocklistEntry {
    fn tag(&self) -> &'static str {
        "item"
    }

    fn namespace(&self) -> &'static str {
        ns::BLOCKING
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::BLOCKING, "item");
        node.set_attr("jid", self.jid.to_string());
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::BLOCKING, "item") {
            return Err(anyhow!("expected <item>, got <{}>", node.tag));
        }
        Ok(Self {
            jid: required_jid(node, "jid")?,
        })
    }
}

/// Wire format: `<blocklist xmlns="urn:xmpp:blocking"><item .../></blocklist>`
#[derive(Debug, Clone, Default)]
pub struct BlocklistResponse {
    pub entries: Vec<BlocklistEntry>,
}

impl XmppNode for BlocklistResponse {
    fn tag(&self) -> &'static str {
        "blocklist"
    }

    fn namespace(&self) -> &'static str {
        ns::BLOCKING
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::BLOCKING, "blocklist");
        for entry in self.entries {
            node.append_child(entry.into_node());
        }
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::BLOCKING, "blocklist") {
            return Err(anyhow!("expected <blocklist>, got <{}>", node.tag));
        }
        let entries = node
            .find(ns::BLOCKING, "item")
            .filter_map(|item| match BlocklistEntry::try_from_node(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(target: "jxt/blocklist", "Failed to parse blocklist entry: {e}");
                    None
                }
            })
            .collect();
        Ok(Self { entries })
    }
}

impl Payload for BlocklistResponse {
    const TAG: &'static str = "blocklist";
    const NAMESPACE: &'static str = ns::BLOCKING;
}

/// Fetches the blocklist.
#[derive(Debug, Default, Clone, Copy)]
pub struct GetBlocklistSpec;

impl IqSpec for GetBlocklistSpec {
    type Response = Vec<Jid>;

    fn build_iq(&self) -> InfoQuery {
        InfoQuery::get(Node::element(ns::BLOCKING, "blocklist"))
    }

    fn parse_response(&self, response: &Iq) -> Result<Self::Response> {
        let payload = response
            .payload
            .as_ref()
            .ok_or_else(|| anyhow!("blocklist result without payload"))?;
        let list = BlocklistResponse::try_from_node(payload)?;
        Ok(list.entries.into_iter().map(|e| e.jid).collect())
    }
}

/// Blocks or unblocks JIDs. Unblocking with no JIDs clears the whole list.
#[derive(Debug, Clone)]
pub struct UpdateBlocklistSpec {
    action: BlocklistAction,
    jids: Vec<Jid>,
}

impl UpdateBlocklistSpec {
    pub fn new(action: BlocklistAction, jids: Vec<Jid>) -> Self {
        Self { action, jids }
    }

    pub fn block(jid: &Jid) -> Self {
        Self::new(BlocklistAction::Block, vec![jid.clone()])
    }

    pub fn unblock(jid: &Jid) -> Self {
        Self::new(BlocklistAction::Unblock, vec![jid.clone()])
    }

    pub fn unblock_all() -> Self {
        Self::new(BlocklistAction::Unblock, Vec::new())
    }
}

impl IqSpec for UpdateBlocklistSpec {
    type Response = ();

    fn build_iq(&self) -> InfoQuery {
        let mut node = Node::element(ns::BLOCKING, self.action.as_str());
        for jid in &self.jids {
            node.append_child(BlocklistEntry { jid: jid.clone() }.into_node());
        }
        InfoQuery::set(node)
    }

    fn parse_response(&self, _response: &Iq) -> Result<Self::Response> {
        Ok(())
    }
}

/// Server push of a block or unblock performed by another resource.
pub fn parse_push(iq: &Iq) -> Option<(BlocklistAction, Vec<Jid>)> {
    let payload = iq.payload.as_ref()?;
    if payload.ns != ns::BLOCKING {
        return None;
    }
    let action = BlocklistAction::try_from(payload.tag.as_str()).ok()?;
    let jids = payload
        .find(ns::BLOCKING, "item")
        .filter_map(|item| BlocklistEntry::try_from_node(item).ok())
        .map(|e| e.jid)
        .collect();
    Some((action, jids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iq::spec::parse_reply;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_blocklist_action_string_enum() {
        assert_eq!(BlocklistAction::Block.as_str(), "block");
        assert_eq!(
            BlocklistAction::try_from("unblock").unwrap(),
            BlocklistAction::Unblock
        );
        assert!(BlocklistAction::try_from("mute").is_err());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let reply = unmarshal(
            "<iq xmlns='jabber:client' id='b1' type='result'>\
               <blocklist xmlns='urn:xmpp:blocking'>\
                 <item jid='a@x.com'/><item/><item jid='b@x.com'/>\
               </blocklist>\
             </iq>",
        )
        .unwrap();
        let jids = parse_reply(&GetBlocklistSpec, "b1", &reply).unwrap();
        assert_eq!(jids, vec![Jid::new("a", "x.com"), Jid::new("b", "x.com")]);
    }

    #[test]
    fn test_block_request() {
        let jid: Jid = "spam@x.com".parse().unwrap();
        let query = UpdateBlocklistSpec::block(&jid).build_iq();
        assert!(query.payload.is(ns::BLOCKING, "block"));
        let item = query.payload.find_first(ns::BLOCKING, "item").unwrap();
        assert_eq!(item.attr("jid"), Some("spam@x.com"));

        let clear = UpdateBlocklistSpec::unblock_all().build_iq();
        assert!(clear.payload.is(ns::BLOCKING, "unblock"));
        assert!(!clear.payload.has_children());
    }

    #[test]
    fn test_parse_push() {
        let node = unmarshal(
            "<iq xmlns='jabber:client' id='push1' type='set'>\
               <unblock xmlns='urn:xmpp:blocking'><item jid='a@x.com'/></unblock>\
             </iq>",
        )
        .unwrap();
        let iq = Iq::try_from_node(&node).unwrap();
        let (action, jids) = parse_push(&iq).unwrap();
        assert_eq!(action, BlocklistAction::Unblock);
        assert_eq!(jids, vec![Jid::new("a", "x.com")]);
    }
}
