pub mod attrs;
pub mod builder;
pub mod error;
pub mod jid;
pub mod node;
mod reader;
mod writer;

pub use attrs::AttrParser;
pub use builder::NodeBuilder;
pub use error::{Result, XmlError};
pub use jid::{Jid, JidError};
pub use node::{Attrs, Node, NodeContent};
pub use reader::unmarshal;
pub use writer::marshal;
