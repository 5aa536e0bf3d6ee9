use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::{Result, XmlError};
use crate::node::{Attrs, Node, NodeContent};

struct Frame {
    node: Node,
    text: String,
}

impl Frame {
    fn finish(mut self) -> Node {
        // Mixed content is not modelled: text only survives on leaf elements.
        if self.node.content.is_none() && !self.text.is_empty() {
            self.node.content = Some(NodeContent::Text(self.text));
        }
        self.node
    }
}

fn resolve_ns(result: ResolveResult<'_>) -> Result<String> {
    match result {
        ResolveResult::Bound(ns) => Ok(std::str::from_utf8(ns.as_ref())?.to_string()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(XmlError::UnknownPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn start_node(ns: String, start: &BytesStart<'_>) -> Result<Node> {
    let tag = std::str::from_utf8(start.local_name().as_ref())?.to_string();
    let mut attrs = Attrs::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::InvalidAttr(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        if key == "xmlns" {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::InvalidAttr(e.to_string()))?;
        attrs.push(key.to_string(), value.into_owned());
    }
    Ok(Node {
        tag,
        ns,
        attrs,
        content: None,
    })
}

// Parsed namespaces are final: an element declared with `xmlns=''` stays
// unqualified, so children are pushed without namespace inheritance.
fn attach(stack: &mut [Frame], root: &mut Option<Node>, node: Node) {
    let Some(parent) = stack.last_mut() else {
        *root = Some(node);
        return;
    };
    match &mut parent.node.content {
        Some(NodeContent::Nodes(nodes)) => nodes.push(node),
        content => *content = Some(NodeContent::Nodes(vec![node])),
    }
}

/// Parses a single XML element (a stanza) from text.
///
/// Namespaces are resolved onto every element. The default `xmlns` is
/// consumed, while `xmlns:prefix` declarations stay as attributes so that
/// prefixed attributes keep their binding when the node is written back out.
pub fn unmarshal(data: &str) -> Result<Node> {
    if data.trim().is_empty() {
        return Err(XmlError::EmptyData);
    }

    let mut reader = NsReader::from_str(data);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = match &event {
            Event::Start(_) | Event::Empty(_) => resolve_ns(resolved)?,
            _ => String::new(),
        };

        if root.is_some() {
            match event {
                Event::Eof => break,
                Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => continue,
                Event::Comment(_) | Event::PI(_) => continue,
                other => {
                    return Err(XmlError::LeftoverData(format!("{other:?}")));
                }
            }
        }

        match event {
            Event::Start(start) => {
                let node = start_node(ns, &start)?;
                stack.push(Frame {
                    node,
                    text: String::new(),
                });
            }
            Event::Empty(start) => {
                let node = start_node(ns, &start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or(XmlError::Eof)?;
                attach(&mut stack, &mut root, frame.finish());
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| XmlError::Syntax(e.to_string()))?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::Syntax(format!("text outside root: {text}"))),
                }
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = std::str::from_utf8(&raw)?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(text);
                }
            }
            Event::Eof => return Err(XmlError::Eof),
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    root.ok_or(XmlError::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_default_and_prefixed_namespaces() {
        let xml = r#"<message xmlns="jabber:client" xmlns:r="urn:xmpp:receipts" to="a@b" id="1">
            <body>hi &amp; bye</body>
            <r:request/>
        </message>"#;
        let node = unmarshal(xml).unwrap();

        assert!(node.is("jabber:client", "message"));
        assert_eq!(node.attr("to"), Some("a@b"));
        assert!(!node.attrs.contains_key("xmlns"));
        assert_eq!(node.find_first("jabber:client", "body").unwrap().text(), "hi & bye");
        assert!(node.find_first("urn:xmpp:receipts", "request").is_some());
        assert_eq!(node.children().unwrap().len(), 2);
    }

    #[test]
    fn test_prefix_declarations_are_kept() {
        let xml = "<message xmlns='jabber:client' xmlns:foo='urn:foo' foo:bar='1'/>";
        let node = unmarshal(xml).unwrap();
        assert_eq!(node.attr("xmlns:foo"), Some("urn:foo"));
        assert_eq!(node.attr("foo:bar"), Some("1"));

        let written = crate::marshal(&node);
        assert!(written.contains("xmlns:foo=\"urn:foo\""), "{written}");
        assert_eq!(unmarshal(&written).unwrap(), node);
    }

    #[test]
    fn test_explicit_empty_namespace_is_not_inherited() {
        let node = unmarshal("<message xmlns='jabber:client'><x xmlns=''/><body>hi</body></message>").unwrap();
        let children = node.children().unwrap();
        assert_eq!(children[0].tag, "x");
        assert_eq!(children[0].ns, "");
        assert_eq!(children[1].ns, "jabber:client");

        let written = crate::marshal(&node);
        assert!(written.contains("<x xmlns=\"\"/>"), "{written}");
        assert_eq!(unmarshal(&written).unwrap().children().unwrap()[0].ns, "");
    }

    #[test]
    fn test_cdata_and_declaration() {
        let xml = "<?xml version='1.0'?><body xmlns='jabber:client'><![CDATA[<b>x</b>]]></body>";
        let node = unmarshal(xml).unwrap();
        assert_eq!(node.text(), "<b>x</b>");
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(unmarshal("   "), Err(XmlError::EmptyData)));
        assert!(matches!(unmarshal("<a><b></a>"), Err(XmlError::Syntax(_))));
        assert!(unmarshal("<a>").is_err());
        assert!(matches!(unmarshal("<a/><b/>"), Err(XmlError::LeftoverData(_))));
        assert!(unmarshal("<x:a/>").is_err());
    }

    #[test]
    fn test_xml_lang_is_kept() {
        let node = unmarshal(r#"<message xmlns="jabber:client" xml:lang="en"/>"#).unwrap();
        assert_eq!(node.attr("xml:lang"), Some("en"));
    }
}
