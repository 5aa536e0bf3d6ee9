//! Helper functions for pulling required pieces out of IQ payloads with
//! clear error messages.

use anyhow::anyhow;
use jxtcore_xml::{Jid, Node};

/// Get a required string attribute, returning an error if not found.
pub fn required_attr<'a>(node: &'a Node, key: &str) -> Result<&'a str, anyhow::Error> {
    node.attr(key)
        .ok_or_else(|| anyhow!("missing required attribute {key} on <{}>", node.tag))
}

/// Get a required JID attribute, returning an error if not found or invalid.
pub fn required_jid(node: &Node, key: &str) -> Result<Jid, anyhow::Error> {
    required_attr(node, key)?
        .parse()
        .map_err(|err| anyhow!("invalid {key} on <{}>: {err}", node.tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_jid() {
        let mut node = Node::element("urn:xmpp:blocking", "item");
        assert!(required_jid(&node, "jid").is_err());
        node.set_attr("jid", "@x.com");
        assert!(required_jid(&node, "jid").is_err());
        node.set_attr("jid", "a@x.com");
        assert_eq!(required_jid(&node, "jid").unwrap(), Jid::new("a", "x.com"));
    }
}
