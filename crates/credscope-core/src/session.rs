//! Page session wiring
//!
//! One `PageSession` per monitored page load: it owns the wrapped
//! credential container and the sink slot. The slot is registered by the
//! embedding environment at setup and dies with the session; the proxy
//! only ever reads it.

use crate::container::MemoryCredentials;
use crate::intercept::{Intercepting, SinkSlot};

/// Per-page-load owner of the instrumented credential container.
pub struct PageSession {
    credentials: Intercepting<MemoryCredentials>,
    sink: SinkSlot,
}

impl PageSession {
    /// Set up a fresh session: native container captured and wrapped once,
    /// sink slot empty until the embedder registers an observer.
    pub fn new() -> Self {
        let sink = SinkSlot::new();
        let credentials = Intercepting::wrap(MemoryCredentials::new(), sink.clone());
        Self { credentials, sink }
    }

    /// The sink registration slot for this page.
    pub fn sink(&self) -> &SinkSlot {
        &self.sink
    }

    /// The instrumented credential container the page calls into.
    pub fn credentials(&self) -> &Intercepting<MemoryCredentials> {
        &self.credentials
    }
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new()
    }
}
