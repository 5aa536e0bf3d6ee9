//! XEP-0280 message carbons.

use crate::error::Result;
use crate::field::bool_sub;
use crate::ns;
use crate::registry::{DefinitionBuilder, Plugin, Registry};

pub const PLUGIN: Plugin = Plugin {
    name: "carbons",
    init,
};

fn init(reg: &mut Registry) -> Result<()> {
    for (name, element) in [("carbonsEnable", "enable"), ("carbonsDisable", "disable")] {
        let id = reg.define(DefinitionBuilder::new(name, ns::CARBONS_2).element(element))?;
        reg.extend_iq(id)?;
    }

    let sent = reg.define(DefinitionBuilder::new("carbonSent", ns::CARBONS_2).element("sent"))?;
    let received =
        reg.define(DefinitionBuilder::new("carbonReceived", ns::CARBONS_2).element("received"))?;

    reg.with_definition("forwarded", ns::FORWARD_0, move |reg, forwarded| {
        reg.extend(sent, forwarded, None, false);
        reg.extend(received, forwarded, None, false);
        Ok(())
    })?;

    reg.with_message(move |reg, message| {
        reg.extend(message, sent, None, false);
        reg.extend(message, received, None, false);
        reg.add(message, "carbonPrivate", bool_sub(ns::CARBONS_2, "private"));
        Ok(())
    })
}
