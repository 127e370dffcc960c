//! Address-pattern routing for inbound messages.

use std::fmt;

use tracing::trace;

use vrcbridge_core::AddressPattern;

use crate::convert::OscArgs;
use crate::errors::Result;

/// Callback invoked with `(address, args)` for a matching message.
///
/// Runs on the listener thread.
pub type Handler = Box<dyn Fn(&str, OscArgs) + Send + Sync>;

/// Ordered route table. The first matching pattern wins; unmatched messages
/// go to the default handler, if any.
#[derive(Default)]
pub struct OscRouter {
    routes: Vec<(AddressPattern, Handler)>,
    default: Option<Handler>,
}

impl OscRouter {
    /// Empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn map<F>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(&str, OscArgs) + Send + Sync + 'static,
    {
        let pattern = AddressPattern::parse(pattern)?;
        self.routes.push((pattern, Box::new(handler)));
        Ok(())
    }

    /// Handler for messages no route matches.
    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: Fn(&str, OscArgs) + Send + Sync + 'static,
    {
        self.default = Some(Box::new(handler));
    }

    /// Route one message. Returns whether a mapped route (not the default)
    /// handled it.
    pub fn dispatch(&self, address: &str, args: OscArgs) -> bool {
        if let Some((pattern, handler)) = self.routes.iter().find(|(p, _)| p.matches(address)) {
            trace!(address, pattern = %pattern, "osc route matched");
            handler(address, args);
            return true;
        }
        if let Some(default) = &self.default {
            default(address, args);
        }
        false
    }

    /// Number of mapped routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are mapped.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for OscRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OscRouter")
            .field(
                "routes",
                &self.routes.iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>(),
            )
            .field("default", &self.default.is_some())
            .finish()
    }
}
