use std::io::Write;

use jxt_xmpp::config::{ConfigError, InspectConfig, Overrides};
use jxt_xmpp::inspect;
use serde_json::json;
use tempfile::NamedTempFile;

fn fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_fixture_file() {
    let file = fixture(
        "<iq xmlns='jabber:client' type='result' id='r1'>\n\
           <query xmlns='jabber:iq:roster' ver='v9'>\n\
             <item jid='a@x.com' name='Alice' subscription='both'><group>Friends</group></item>\n\
             <item jid='b@x.com'/>\n\
           </query>\n\
         </iq>\n",
    );
    let registry = inspect::registry_for(&InspectConfig::default()).unwrap();
    let xml = inspect::read_input(Some(file.path())).unwrap();
    let view = inspect::parse(&registry, &xml).unwrap();

    let roster = &view["iq"]["roster"];
    assert_eq!(roster["ver"], json!("v9"));
    assert_eq!(roster["items"][0]["jid"], json!("a@x.com"));
    assert_eq!(roster["items"][0]["groups"], json!(["Friends"]));
    assert_eq!(roster["items"][1]["subscription"], json!("none"));
    assert!(roster["items"][1].get("groups").is_none());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = inspect::read_input(Some(&dir.path().join("absent.xml"))).unwrap_err();
    assert!(err.to_string().contains("absent.xml"));
}

#[test]
fn test_config_file_disables_plugins() {
    let file = fixture(r#"{ "pretty": false, "disabled_plugins": ["roster"] }"#);
    let config = InspectConfig::load(Some(file.path())).unwrap();
    assert!(!config.pretty);

    let registry = inspect::registry_for(&config).unwrap();
    assert!(registry.definition_by_name("roster").is_none());

    let view = inspect::parse(
        &registry,
        "<iq xmlns='jabber:client' type='get' id='r2'><query xmlns='jabber:iq:roster'/></iq>",
    )
    .unwrap();
    assert!(view["iq"].get("roster").is_none());
    assert_eq!(inspect::render(&view, config.pretty).unwrap().lines().count(), 1);
}

#[test]
fn test_bad_config_file() {
    let file = fixture("{ not json");
    assert!(matches!(
        InspectConfig::load(Some(file.path())),
        Err(ConfigError::Parse { .. })
    ));

    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        InspectConfig::load(Some(&dir.path().join("missing.json"))),
        Err(ConfigError::Read { .. })
    ));

    let config = InspectConfig::default().apply(Overrides {
        disable: vec!["telepathy".to_string()],
        ..Default::default()
    });
    assert!(inspect::registry_for(&config).is_err());
}

#[test]
fn test_build_then_parse() {
    let registry = inspect::registry_for(&InspectConfig::default()).unwrap();
    let xml = inspect::build(
        &registry,
        "presence",
        r#"{ "to": "room@muc.x.com/me", "joinMuc": { "password": "secret", "historyMaxStanzas": 20 } }"#,
    )
    .unwrap();
    assert!(xml.contains("xmlns=\"http://jabber.org/protocol/muc\""));

    let view = inspect::parse(&registry, &xml).unwrap();
    assert_eq!(view["presence"]["joinMuc"]["password"], json!("secret"));
    assert_eq!(view["presence"]["joinMuc"]["historyMaxStanzas"], json!(20));
    assert_eq!(view["presence"]["to"], json!("room@muc.x.com/me"));
}

#[test]
fn test_describe_everything() {
    let registry = inspect::registry_for(&InspectConfig::default()).unwrap();
    let all = inspect::describe(&registry, None).unwrap();
    let names: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    for expected in ["message", "presence", "iq", "roster", "jingle", "_rtp", "delay"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    let message = inspect::describe(&registry, Some("message")).unwrap();
    assert_eq!(message["topLevel"], json!(true));
    assert_eq!(message["fields"]["chatState"], json!("enumSub"));
}
