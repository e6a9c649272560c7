//! credscope JS bindings
//!
//! Installs a `navigator.credentials` object into a QuickJS context,
//! backed by the instrumented container of a [`credscope_core::PageSession`].
//!
//! Page script talks to the same four entry points a browser exposes
//! (`create`, `get`, `preventSilentAccess`, `store`) and receives promises;
//! every call is captured and delivered to the session's sink before the
//! underlying operation runs.

mod bindings;

pub use bindings::install_credentials;
