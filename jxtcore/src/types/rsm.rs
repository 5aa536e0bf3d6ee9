use anyhow::{Result, anyhow};
use jxtcore_xml::Node;

use super::{child_text, push_text_child};
use crate::ns;
use crate::protocol::{Payload, XmppNode};

/// XEP-0059 result set. `before: Some("")` asks for the last page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RsmSet {
    pub after: Option<String>,
    pub before: Option<String>,
    pub count: Option<u32>,
    pub first: Option<String>,
    pub first_index: Option<u32>,
    pub index: Option<u32>,
    pub last: Option<String>,
    pub max: Option<u32>,
}

impl RsmSet {
    /// The request for the page after `last`.
    pub fn next_page(&self, max: u32) -> Option<RsmSet> {
        Some(RsmSet {
            after: Some(self.last.clone()?),
            max: Some(max),
            ..Default::default()
        })
    }
}

fn child_u32(node: &Node, tag: &str) -> Result<Option<u32>> {
    child_text(node, ns::RSM, tag)
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| anyhow!("invalid <{tag}/> in result set: {e}"))
        })
        .transpose()
}

impl XmppNode for RsmSet {
    fn tag(&self) -> &'static str {
        "set"
    }

    fn namespace(&self) -> &'static str {
        ns::RSM
    }

    fn into_node(self) -> Node {
        let mut node = Node::element(ns::RSM, "set");
        push_text_child(&mut node, ns::RSM, "after", self.after);
        push_text_child(&mut node, ns::RSM, "before", self.before);
        push_text_child(&mut node, ns::RSM, "count", self.count.map(|c| c.to_string()));
        if let Some(first) = self.first {
            let child = node.append_child(Node::element(ns::RSM, "first"));
            child.set_text(first);
            if let Some(index) = self.first_index {
                child.set_attr("index", index.to_string());
            }
        }
        push_text_child(&mut node, ns::RSM, "index", self.index.map(|i| i.to_string()));
        push_text_child(&mut node, ns::RSM, "last", self.last);
        push_text_child(&mut node, ns::RSM, "max", self.max.map(|m| m.to_string()));
        node
    }

    fn try_from_node(node: &Node) -> Result<Self> {
        if !node.is(ns::RSM, "set") {
            return Err(anyhow!("expected result set, got <{} xmlns='{}'>", node.tag, node.ns));
        }
        let first_index = node
            .find_first(ns::RSM, "first")
            .and_then(|first| first.attrs().optional_u32("index"));
        Ok(Self {
            after: child_text(node, ns::RSM, "after"),
            before: child_text(node, ns::RSM, "before"),
            count: child_u32(node, "count")?,
            first: child_text(node, ns::RSM, "first"),
            first_index,
            index: child_u32(node, "index")?,
            last: child_text(node, ns::RSM, "last"),
            max: child_u32(node, "max")?,
        })
    }
}

impl Payload for RsmSet {
    const TAG: &'static str = "set";
    const NAMESPACE: &'static str = ns::RSM;
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxtcore_xml::unmarshal;

    #[test]
    fn test_parse_result_page() {
        let node = unmarshal(
            "<set xmlns='http://jabber.org/protocol/rsm'>\
               <first index='0'>a1</first><last>a9</last><count>800</count>\
             </set>",
        )
        .unwrap();
        let set = RsmSet::try_from_node(&node).unwrap();
        assert_eq!(set.first.as_deref(), Some("a1"));
        assert_eq!(set.first_index, Some(0));
        assert_eq!(set.count, Some(800));

        let next = set.next_page(10).unwrap();
        assert_eq!(next.after.as_deref(), Some("a9"));
        assert_eq!(next.max, Some(10));
    }

    #[test]
    fn test_last_page_request_keeps_empty_before() {
        let request = RsmSet {
            before: Some(String::new()),
            max: Some(5),
            ..Default::default()
        };
        let node = request.clone().into_node();
        assert!(node.find_first(ns::RSM, "before").is_some());
        assert_eq!(RsmSet::try_from_node(&node).unwrap(), request);
    }

    #[test]
    fn test_bad_count_is_rejected() {
        let node = unmarshal("<set xmlns='http://jabber.org/protocol/rsm'><count>many</count></set>")
            .unwrap();
        assert!(RsmSet::try_from_node(&node).is_err());
    }
}
