//! XEP-0297 stanza forwarding.
//!
//! A `<forwarded/>` wraps one full stanza plus an optional delay stamp, and
//! is itself carried by messages.

use crate::error::Result;
use crate::ns;
use crate::registry::{DefinitionBuilder, DefinitionId, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "forwarded",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    let forwarded = reg.define(DefinitionBuilder::new("forwarded", ns::FORWARD_0))?;

    let wrap = move |reg: &mut Registry, inner: DefinitionId| -> Result<()> {
        reg.extend(forwarded, inner, None, false);
        Ok(())
    };
    reg.with_message(wrap)?;
    reg.with_presence(wrap)?;
    reg.with_iq(wrap)?;
    reg.with_definition("delay", ns::DELAY, wrap)?;

    reg.extend_message(forwarded)
}
