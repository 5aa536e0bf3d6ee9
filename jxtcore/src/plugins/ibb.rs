//! XEP-0047 in-band bytestreams, and their XEP-0261 Jingle transport.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jxtcore_xml::Node;
use log::warn;

use crate::error::Result;
use crate::field::{FieldAccessor, FieldContext, attribute, constant, custom, number_attribute};
use crate::ns;
use crate::plugins::jingle::TRANSPORT_TAG;
use crate::registry::{DefinitionBuilder, DefinitionId, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "ibb",
    init,
};

pub const DEFAULT_BLOCK_SIZE: i64 = 4096;

/// Whether the session acknowledges blocks, read from `stanza`. Anything but
/// `message` means iq (acknowledged).
fn acked(node: &Node) -> bool {
    node.attr("stanza") != Some("message")
}

fn write_ack(node: &mut Node, ack: Option<&FieldValue>) {
    let stanza = match ack {
        Some(FieldValue::Bool(false)) => "message",
        _ => "iq",
    };
    node.set_attr("stanza", stanza);
}

/// The `<open/>`, `<data/>` or `<close/>` payload carried by an iq or
/// message, as a single `{action, sid, ...}` object.
struct Ibb;

impl FieldAccessor for Ibb {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        let mut out = BTreeMap::new();
        let sid = |n: &Node| FieldValue::from(n.attr("sid").unwrap_or_default());

        if let Some(data) = node.find_first(ns::IBB, "data") {
            let bytes = STANDARD.decode(data.text().trim()).unwrap_or_else(|e| {
                warn!(target: "jxt/ibb", "Invalid base64 in IBB data: {e}");
                Vec::new()
            });
            let seq = data.attr("seq").and_then(|s| s.parse().ok()).unwrap_or(0i64);
            out.insert("action".to_string(), FieldValue::from("data"));
            out.insert("sid".to_string(), sid(data));
            out.insert("seq".to_string(), FieldValue::Int(seq));
            out.insert("data".to_string(), FieldValue::Bytes(bytes));
        } else if let Some(open) = node.find_first(ns::IBB, "open") {
            let block_size = open
                .attr("block-size")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BLOCK_SIZE);
            out.insert("action".to_string(), FieldValue::from("open"));
            out.insert("sid".to_string(), sid(open));
            out.insert("blockSize".to_string(), FieldValue::Int(block_size));
            out.insert("ack".to_string(), FieldValue::Bool(acked(open)));
        } else if let Some(close) = node.find_first(ns::IBB, "close") {
            out.insert("action".to_string(), FieldValue::from("close"));
            out.insert("sid".to_string(), sid(close));
        } else {
            return FieldValue::None;
        }
        FieldValue::Map(out)
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        for tag in ["open", "data", "close"] {
            node.remove_children(ns::IBB, tag);
        }
        let text = |key: &str| value.get(key).and_then(FieldValue::to_text).unwrap_or_default();

        match value.get("action").and_then(FieldValue::as_str) {
            Some("data") => {
                let encoded = match value.get("data") {
                    Some(FieldValue::Bytes(bytes)) => STANDARD.encode(bytes),
                    Some(other) => STANDARD.encode(other.to_text().unwrap_or_default()),
                    None => String::new(),
                };
                let seq = value.get("seq").and_then(FieldValue::as_int).unwrap_or(0);
                let data = node.append_child(Node::element(ns::IBB, "data"));
                data.set_attr("sid", text("sid"));
                data.set_attr("seq", seq.to_string());
                data.set_text(encoded);
            }
            Some("open") => {
                let block_size = value
                    .get("blockSize")
                    .and_then(FieldValue::as_int)
                    .unwrap_or(DEFAULT_BLOCK_SIZE);
                let open = node.append_child(Node::element(ns::IBB, "open"));
                open.set_attr("sid", text("sid"));
                open.set_attr("block-size", block_size.to_string());
                write_ack(open, value.get("ack"));
            }
            Some("close") => {
                node.append_child(Node::element(ns::IBB, "close"))
                    .set_attr("sid", text("sid"));
            }
            _ => {}
        }
    }

    fn describe(&self) -> String {
        "ibb".to_string()
    }
}

/// The transport's `stanza` attribute as a boolean.
struct TransportAck;

impl FieldAccessor for TransportAck {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        FieldValue::Bool(acked(node))
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        write_ack(node, Some(&value));
    }

    fn describe(&self) -> String {
        "ibbAck".to_string()
    }
}

fn init(reg: &mut Registry) -> Result<()> {
    reg.define(
        DefinitionBuilder::new(format!("_{}", ns::JINGLE_IBB_1), ns::JINGLE_IBB_1)
            .element("transport")
            .tag(TRANSPORT_TAG)
            .field("transportType", constant(ns::JINGLE_IBB_1))
            .field("sid", attribute("sid"))
            .field("blockSize", number_attribute("block-size"))
            .field("ack", custom(TransportAck)),
    )?;

    let add_ibb = |reg: &mut Registry, parent: DefinitionId| -> Result<()> {
        reg.add(parent, "ibb", custom(Ibb));
        Ok(())
    };
    reg.with_iq(add_ibb)?;
    reg.with_message(add_ibb)
}
