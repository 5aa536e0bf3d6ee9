//! The operations behind the `jxt` subcommands.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use jxtcore::{Definition, Registry, default_registry, plugins};
use log::{debug, info};
use serde_json::{Value as Json, json};

use crate::config::InspectConfig;

/// The default registry when nothing is disabled, else a fresh one without
/// the disabled plugins.
pub fn registry_for(config: &InspectConfig) -> Result<Arc<Registry>> {
    config.validate()?;
    if config.disabled_plugins.is_empty() {
        return Ok(default_registry());
    }
    let mut registry = Registry::new();
    plugins::load(&mut registry, &config.disabled_plugins)?;
    info!(
        target: "jxt/inspect",
        "Loaded registry without {}", config.disabled_plugins.join(", ")
    );
    Ok(Arc::new(registry))
}

/// Reads XML from `path`, or from stdin when it is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Parses one stanza and returns its JSON view, keyed by definition name.
pub fn parse(registry: &Arc<Registry>, xml: &str) -> Result<Json> {
    let stanza = registry
        .parse(xml.trim())?
        .ok_or_else(|| anyhow!("no definition matches the root element"))?;
    debug!(target: "jxt/inspect", "Parsed <{}> as '{}'", stanza.node().tag, stanza.name());
    let mut view = serde_json::Map::new();
    view.insert(stanza.name().to_string(), stanza.to_json());
    Ok(Json::Object(view))
}

/// Creates a stanza from a JSON data object and returns its XML.
pub fn build(registry: &Arc<Registry>, name: &str, data: &str) -> Result<String> {
    let data: Json = serde_json::from_str(data).context("--data is not valid JSON")?;
    if !data.is_object() {
        bail!("--data must be a JSON object");
    }
    let stanza = registry.create_from_json(name, &data)?;
    Ok(stanza.to_xml())
}

fn describe_one(registry: &Registry, def: &Definition) -> Json {
    let fields: serde_json::Map<String, Json> = def
        .fields()
        .map(|(name, field)| (name.to_string(), Json::String(field.kind_name())))
        .collect();
    let extensions: Vec<&str> = registry
        .extensions_of(def.id())
        .map(|(name, _)| name)
        .collect();
    json!({
        "name": def.name,
        "element": def.element,
        "namespace": def.namespace,
        "topLevel": def.top_level,
        "tags": def.tags,
        "fields": fields,
        "extensions": extensions,
    })
}

/// One definition by name, or every definition in registration order.
pub fn describe(registry: &Registry, name: Option<&str>) -> Result<Json> {
    match name {
        Some(name) => {
            let def = registry
                .definition_by_name(name)
                .ok_or_else(|| anyhow!("no definition named '{name}'"))?;
            Ok(describe_one(registry, def))
        }
        None => Ok(Json::Array(
            registry
                .definitions()
                .map(|def| describe_one(registry, def))
                .collect(),
        )),
    }
}

pub fn render(value: &Json, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wraps_view_in_definition_name() {
        let registry = default_registry();
        let view = parse(
            &registry,
            "<presence xmlns='jabber:client'><show>away</show><priority>5</priority></presence>",
        )
        .unwrap();
        assert_eq!(view["presence"]["show"], json!("away"));
        assert_eq!(view["presence"]["priority"], json!(5));
    }

    #[test]
    fn test_parse_unknown_root() {
        let registry = default_registry();
        let err = parse(&registry, "<nothing xmlns='urn:nowhere'/>").unwrap_err();
        assert!(err.to_string().contains("no definition"));
    }

    #[test]
    fn test_build_requires_object() {
        let registry = default_registry();
        assert!(build(&registry, "message", "[1, 2]").is_err());
        assert!(build(&registry, "message", "{").is_err());
        let xml = build(&registry, "message", r#"{"to": "a@x.com", "body": "hi"}"#).unwrap();
        assert!(xml.contains("<body>hi</body>"));
    }

    #[test]
    fn test_describe_single_definition() {
        let registry = default_registry();
        let roster = describe(&registry, Some("roster")).unwrap();
        assert_eq!(roster["element"], json!("query"));
        assert_eq!(roster["fields"]["items"], json!("multiExtension"));
        assert!(describe(&registry, Some("nope")).is_err());
    }
}
