// Re-export the core crate so users only need one dependency
pub use jxtcore::{
    Definition, DefinitionBuilder, DefinitionId, FieldValue, Payload, Plugin, Registry,
    RegistryError, Stanza, XmppNode, default_registry, field, iq, ns, plugins, types, xml,
};

pub mod config;
pub mod inspect;
