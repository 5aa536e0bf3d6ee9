//! Request/response pairs for info/query exchanges.

pub mod blocklist;
pub mod carbons;
pub mod node;
pub mod ping;
pub mod request;
pub mod roster;
pub mod spec;

pub use request::{InfoQuery, InfoQueryType, IqError, RequestIds};
pub use spec::{IqSpec, parse_reply};
