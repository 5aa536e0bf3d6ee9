//! XEP-0167 RTP sessions, with the SSMA, grouping and RTCP feedback
//! extensions that ride along in the description.

use std::collections::BTreeMap;

use jxtcore_xml::Node;

use crate::error::Result;
use crate::field::{
    FieldAccessor, FieldContext, attribute, bool_sub, constant, custom, multi_sub_attribute,
    number_attribute, text,
};
use crate::ns;
use crate::plugins::jingle::APPLICATION_TAG;
use crate::registry::{DefinitionBuilder, Plugin, Registry};
use crate::value::FieldValue;

pub const PLUGIN: Plugin = Plugin {
    name: "rtp",
    init,
};

fn entry(pairs: &[(&str, Option<&str>)]) -> FieldValue {
    let map: BTreeMap<String, FieldValue> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldValue::from(v.unwrap_or_default())))
        .collect();
    FieldValue::Map(map)
}

fn text_of(value: &FieldValue, key: &str) -> String {
    value.get(key).and_then(FieldValue::to_text).unwrap_or_default()
}

/// `<rtcp-fb/>` and `<rtcp-fb-trr-int/>` children as `{type, subtype}` /
/// `{type: "trr-int", value}` entries.
struct Feedback;

impl FieldAccessor for Feedback {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        let fb = node.find(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb").map(|c| {
            entry(&[("type", c.attr("type")), ("subtype", c.attr("subtype"))])
        });
        let trr = node
            .find(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb-trr-int")
            .map(|c| entry(&[("type", c.attr("type")), ("value", c.attr("value"))]));
        FieldValue::List(fb.chain(trr).collect())
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        node.remove_children(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb");
        node.remove_children(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb-trr-int");
        for item in value.into_list() {
            let kind = text_of(&item, "type");
            if kind == "trr-int" {
                let fb = node.append_child(Node::element(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb-trr-int"));
                fb.set_attr("type", kind);
                fb.set_attr("value", text_of(&item, "value"));
            } else {
                let fb = node.append_child(Node::element(ns::JINGLE_RTP_RTCP_FB_0, "rtcp-fb"));
                fb.set_attr("type", kind);
                let subtype = text_of(&item, "subtype");
                if !subtype.is_empty() {
                    fb.set_attr("subtype", subtype);
                }
            }
        }
    }

    fn describe(&self) -> String {
        "rtcpFeedback".to_string()
    }
}

/// `<parameter name=".." value=".."/>` children as `{key, value}` entries.
struct Parameters(&'static str);

impl FieldAccessor for Parameters {
    fn get(&self, _cx: &FieldContext<'_>, node: &Node) -> FieldValue {
        FieldValue::List(
            node.find(self.0, "parameter")
                .map(|p| entry(&[("key", p.attr("name")), ("value", p.attr("value"))]))
                .collect(),
        )
    }

    fn set(&self, _cx: &FieldContext<'_>, node: &mut Node, value: FieldValue) {
        node.remove_children(self.0, "parameter");
        for item in value.into_list() {
            let param = node.append_child(Node::element(self.0, "parameter"));
            param.set_attr("name", text_of(&item, "key"));
            param.set_attr("value", text_of(&item, "value"));
        }
    }

    fn describe(&self) -> String {
        "parameters".to_string()
    }
}

fn init(reg: &mut Registry) -> Result<()> {
    let rtp = reg.define(
        DefinitionBuilder::new("_rtp", ns::JINGLE_RTP_1)
            .element("description")
            .tag(APPLICATION_TAG)
            .field("applicationType", constant("rtp"))
            .field("media", attribute("media"))
            .field("ssrc", attribute("ssrc"))
            .field("mux", bool_sub(ns::JINGLE_RTP_1, "rtcp-mux"))
            .field("reducedSize", bool_sub(ns::JINGLE_RTP_1, "rtcp-rsize"))
            .field("feedback", custom(Feedback)),
    )?;
    let bandwidth = reg.define(
        DefinitionBuilder::new("bandwidth", ns::JINGLE_RTP_1)
            .field("type", attribute("type"))
            .field("bandwidth", text()),
    )?;
    let payload = reg.define(
        DefinitionBuilder::new("_payloadType", ns::JINGLE_RTP_1)
            .element("payload-type")
            .field("id", attribute("id"))
            .field("name", attribute("name"))
            .field("clockrate", number_attribute("clockrate"))
            .field("channels", number_attribute("channels").with_default(1i64))
            .field("maxptime", number_attribute("maxptime"))
            .field("ptime", number_attribute("ptime"))
            .field("feedback", custom(Feedback))
            .field("parameters", custom(Parameters(ns::JINGLE_RTP_1))),
    )?;
    let source = reg.define(
        DefinitionBuilder::new("_source", ns::JINGLE_RTP_SSMA_0)
            .element("source")
            .field("ssrc", attribute("ssrc"))
            .field("parameters", custom(Parameters(ns::JINGLE_RTP_SSMA_0))),
    )?;
    let source_group = reg.define(
        DefinitionBuilder::new("_sourceGroup", ns::JINGLE_RTP_SSMA_0)
            .element("ssrc-group")
            .field("semantics", attribute("semantics"))
            .field("sources", multi_sub_attribute(ns::JINGLE_RTP_SSMA_0, "source", "ssrc")),
    )?;
    let content_group = reg.define(
        DefinitionBuilder::new("_group", ns::JINGLE_GROUPING_0)
            .element("group")
            .field("semantics", attribute("semantics"))
            .field("contents", multi_sub_attribute(ns::JINGLE_GROUPING_0, "content", "name")),
    )?;

    reg.extend(rtp, bandwidth, None, false);
    reg.extend(rtp, payload, Some("payloads"), false);
    reg.extend(rtp, source, Some("sources"), false);
    reg.extend(rtp, source_group, Some("sourceGroups"), false);

    reg.with_definition("jingle", ns::JINGLE_1, move |reg, jingle| {
        reg.extend(jingle, content_group, Some("groups"), false);
        Ok(())
    })
}
