//! The stock plugin set.

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{Plugin, Registry};

pub mod blocking;
pub mod bob;
pub mod carbons;
pub mod client;
pub mod dataforms;
pub mod delayed;
pub mod forwarded;
pub mod ibb;
pub mod jingle;
pub mod mam;
pub mod muc;
pub mod ping;
pub mod roster;
pub mod rsm;
pub mod rtp;
pub mod vcard;

/// Every stock plugin. Extensions come before the definitions they attach
/// to, so loading in this order goes through the deferred callbacks.
pub fn all() -> Vec<Plugin> {
    vec![
        carbons::PLUGIN,
        mam::PLUGIN,
        rtp::PLUGIN,
        ibb::PLUGIN,
        jingle::PLUGIN,
        forwarded::PLUGIN,
        delayed::PLUGIN,
        rsm::PLUGIN,
        dataforms::PLUGIN,
        muc::PLUGIN,
        roster::PLUGIN,
        blocking::PLUGIN,
        ping::PLUGIN,
        vcard::PLUGIN,
        bob::PLUGIN,
        client::PLUGIN,
    ]
}

pub fn names() -> Vec<&'static str> {
    all().iter().map(|p| p.name).collect()
}

/// Applies every stock plugin whose name is not in `disabled`.
pub fn load(registry: &mut Registry, disabled: &[String]) -> Result<()> {
    for plugin in all() {
        if disabled.iter().any(|name| name == plugin.name) {
            debug!(target: "jxt/plugins", "Skipping disabled plugin {}", plugin.name);
            continue;
        }
        registry.use_plugin(&plugin)?;
    }
    Ok(())
}

static DEFAULT: Lazy<Arc<Registry>> = Lazy::new(|| {
    let mut registry = Registry::new();
    load(&mut registry, &[]).expect("stock plugins must load into an empty registry");
    Arc::new(registry)
});

/// A process-wide registry with every stock plugin loaded.
pub fn default_registry() -> Arc<Registry> {
    Arc::clone(&DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_names_are_unique() {
        let mut names = names();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_disabled_plugins_are_skipped() {
        let mut reg = Registry::new();
        load(&mut reg, &["jingle".to_string(), "rtp".to_string()]).unwrap();
        assert!(!reg.is_loaded("jingle"));
        assert!(reg.is_loaded("client"));
        assert!(reg.definition_by_name("jingle").is_none());
        assert!(reg.definition_by_name("message").is_some());
    }

    #[test]
    fn test_default_registry_is_shared() {
        let a = default_registry();
        let b = default_registry();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.get_definition("query", crate::ns::ROSTER).is_some());
    }
}
