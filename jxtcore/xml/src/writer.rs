use std::fmt;

use quick_xml::escape::escape;

use crate::node::{Node, NodeContent};

fn write_node(out: &mut String, node: &Node, parent_ns: Option<&str>) {
    out.push('<');
    out.push_str(&node.tag);
    if parent_ns != Some(node.ns.as_str()) && !(parent_ns.is_none() && node.ns.is_empty()) {
        out.push_str(" xmlns=\"");
        out.push_str(&escape(node.ns.as_str()));
        out.push('"');
    }
    for (key, value) in node.attrs.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }

    match &node.content {
        None => out.push_str("/>"),
        Some(NodeContent::Nodes(children)) if children.is_empty() => out.push_str("/>"),
        Some(NodeContent::Text(text)) => {
            out.push('>');
            out.push_str(&escape(text.as_str()));
            write_close(out, node);
        }
        Some(NodeContent::Nodes(children)) => {
            out.push('>');
            for child in children {
                write_node(out, child, Some(&node.ns));
            }
            write_close(out, node);
        }
    }
}

fn write_close(out: &mut String, node: &Node) {
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

/// Serializes a node to XML text.
///
/// `xmlns` is emitted on the root and wherever a child's namespace differs
/// from its parent's.
pub fn marshal(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, None);
    out
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&marshal(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeBuilder;
    use crate::reader::unmarshal;

    #[test]
    fn test_minimal_xmlns_emission() {
        let node = NodeBuilder::new("message")
            .ns("jabber:client")
            .attr("to", "romeo@montague.lit")
            .children([
                NodeBuilder::new("body").text("a < b").build(),
                NodeBuilder::new("request").ns("urn:xmpp:receipts").build(),
            ])
            .build();

        assert_eq!(
            marshal(&node),
            "<message xmlns=\"jabber:client\" to=\"romeo@montague.lit\">\
             <body>a &lt; b</body>\
             <request xmlns=\"urn:xmpp:receipts\"/></message>"
        );
    }

    #[test]
    fn test_attribute_escaping_survives_reparse() {
        let node = NodeBuilder::new("item")
            .ns("jabber:iq:roster")
            .attr("name", "Tom \"&\" Jerry")
            .build();
        let xml = node.to_string();
        let parsed = unmarshal(&xml).unwrap();
        assert_eq!(parsed.attr("name"), Some("Tom \"&\" Jerry"));
        assert_eq!(parsed, node);
    }
}
