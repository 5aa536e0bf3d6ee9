extern crate self as jxtcore;

pub use jxtcore_derive::{EmptyNode, StringEnum, XmppNode};
pub use jxtcore_xml as xml;

pub mod error;
pub mod field;
pub mod iq;
pub mod ns;
pub mod plugins;
pub mod protocol;
pub mod registry;
pub mod stanza;
pub mod types;
pub mod value;

pub use error::RegistryError;
pub use field::{Field, FieldAccessor, FieldContext};
pub use plugins::{default_registry, load};
pub use protocol::{Payload, XmppNode};
pub use registry::{Definition, DefinitionBuilder, DefinitionId, Plugin, Registry};
pub use stanza::{Stanza, StanzaMut, StanzaRef};
pub use value::FieldValue;
