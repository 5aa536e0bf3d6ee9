use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use jxtcore::plugins::{self, all};
use jxtcore::{FieldValue, Plugin, Registry, ns};

/// name -> (element, namespace, sorted field names, sorted extension names)
type Shape = BTreeMap<String, (String, String, BTreeSet<String>, BTreeSet<String>)>;

fn shape(reg: &Registry) -> Shape {
    reg.definitions()
        .map(|def| {
            let fields = def.fields().map(|(name, _)| name.to_string()).collect();
            let extensions = reg
                .extensions_of(def.id())
                .map(|(name, _)| name.to_string())
                .collect();
            (
                def.name.clone(),
                (def.element.clone(), def.namespace.clone(), fields, extensions),
            )
        })
        .collect()
}

fn load_in(order: &[Plugin]) -> Registry {
    let mut reg = Registry::new();
    for plugin in order {
        reg.use_plugin(plugin).unwrap();
    }
    reg
}

#[test]
fn test_registration_order_does_not_change_the_result() {
    let forward = all();
    let mut backward = all();
    backward.reverse();

    let a = shape(&load_in(&forward));
    let b = shape(&load_in(&backward));
    assert_eq!(a, b);
}

#[test]
fn test_carbons_before_and_after_forwarding() {
    let carbons = plugins::carbons::PLUGIN;
    let forwarded = plugins::forwarded::PLUGIN;
    let client = plugins::client::PLUGIN;

    for order in [
        [carbons, forwarded, client],
        [client, forwarded, carbons],
        [forwarded, client, carbons],
    ] {
        let reg = Arc::new(load_in(&order));
        let sent = reg.get_definition("sent", ns::CARBONS_2).unwrap();
        let forwarded = reg.extension_of(sent.id(), "forwarded").unwrap();
        let message = reg.definition_by_name("message").unwrap();
        assert_eq!(
            reg.extension_of(forwarded, "message"),
            Some(message.id()),
            "forwarded must wrap a message regardless of load order"
        );

        let stanza = reg
            .parse(
                "<message xmlns='jabber:client' from='me@x.com' type='chat'>\
                   <sent xmlns='urn:xmpp:carbons:2'>\
                     <forwarded xmlns='urn:xmpp:forward:0'>\
                       <message xmlns='jabber:client' to='you@x.com'><body>hi</body></message>\
                     </forwarded>\
                   </sent>\
                 </message>",
            )
            .unwrap()
            .unwrap();
        let inner = stanza
            .extension("carbonSent")
            .and_then(|s| s.extension("forwarded"))
            .and_then(|f| f.extension("message"))
            .unwrap();
        assert_eq!(inner.get("body"), FieldValue::from("hi"));
    }
}

#[test]
fn test_missing_dependency_is_silent() {
    let reg = load_in(&[plugins::carbons::PLUGIN]);
    let sent = reg.get_definition("sent", ns::CARBONS_2).unwrap();
    assert!(reg.extension_of(sent.id(), "forwarded").is_none());
    assert!(reg.definition_by_name("message").is_none());
}

#[test]
fn test_use_plugin_twice_is_a_no_op() {
    let mut reg = Registry::new();
    plugins::load(&mut reg, &[]).unwrap();
    let before = shape(&reg);
    let count = reg.definitions().count();

    for plugin in all() {
        reg.use_plugin(&plugin).unwrap();
    }
    assert_eq!(reg.definitions().count(), count);
    assert_eq!(shape(&reg), before);
}

#[test]
fn test_stanza_namespaces_share_extensions() {
    let reg = plugins::default_registry();
    for name in ["message", "serverMessage", "componentMessage"] {
        let def = reg.definition_by_name(name).unwrap();
        for ext in ["delay", "forwarded", "carbonSent", "muc"] {
            assert!(
                reg.extension_of(def.id(), ext).is_some(),
                "{name} lacks {ext}"
            );
        }
    }
    let extensions: Vec<_> = reg
        .get_extensions("iq", ns::SERVER)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(extensions.contains(&"roster"));
    assert!(extensions.contains(&"jingle"));
}
