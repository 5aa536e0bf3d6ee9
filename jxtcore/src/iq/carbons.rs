//! XEP-0280 message carbons toggle.

use anyhow::Result;

use crate::iq::request::InfoQuery;
use crate::iq::spec::IqSpec;
use crate::protocol::XmppNode;
use crate::types::{CarbonsDisable, CarbonsEnable, Iq};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarbonsSpec {
    pub enable: bool,
}

impl CarbonsSpec {
    pub fn enable() -> Self {
        Self { enable: true }
    }

    pub fn disable() -> Self {
        Self { enable: false }
    }
}

impl IqSpec for CarbonsSpec {
    type Response = ();

    fn build_iq(&self) -> InfoQuery {
        let payload = if self.enable {
            CarbonsEnable.into_node()
        } else {
            CarbonsDisable.into_node()
        };
        InfoQuery::set(payload)
    }

    fn parse_response(&self, _response: &Iq) -> Result<Self::Response> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns;

    #[test]
    fn test_toggle_payload() {
        assert!(CarbonsSpec::enable().build_iq().payload.is(ns::CARBONS_2, "enable"));
        assert!(CarbonsSpec::disable().build_iq().payload.is(ns::CARBONS_2, "disable"));
    }
}
