//! Interception proxy
//!
//! Transparent wrapper around a credential container. Every entry point
//! snapshots its arguments, hands the event to the registered sink, then
//! forwards to the captured native implementation with the original
//! arguments and returns the still-pending native result untouched.
//!
//! Instrumentation must never break the page under observation: capture is
//! built from total conversions, a panicking sink is trapped and logged,
//! and the only error that ever reaches the caller is the native
//! operation's own.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::InterceptError;
use crate::container::{CredentialsContainer, PendingCredential, PendingVoid};
use crate::credential::Credential;
use crate::options::{CredentialCreationOptions, CredentialRequestOptions};
use crate::snapshot::CredentialSnapshot;

/// Wrapped entry point names, as the page spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CredentialMethod {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "get")]
    Get,
    #[serde(rename = "preventSilentAccess")]
    PreventSilentAccess,
    #[serde(rename = "store")]
    Store,
}

impl CredentialMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::PreventSilentAccess => "preventSilentAccess",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for CredentialMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one argument of an intercepted call. Recognized credential
/// variants get structured serialization; option objects and anything else
/// are kept as shallow best-effort copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgumentSnapshot {
    Credential(CredentialSnapshot),
    Opaque(serde_json::Value),
}

impl ArgumentSnapshot {
    fn credential(credential: &Credential) -> Self {
        Self::Credential(CredentialSnapshot::of(credential))
    }

    /// Best-effort copy of a non-credential argument. Serialization
    /// failure degrades to `null` instead of dropping the event (partial
    /// events are preferred over missing ones).
    fn opaque<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Opaque(value),
            Err(error) => {
                tracing::warn!(%error, "argument snapshot failed, capturing null");
                Self::Opaque(serde_json::Value::Null)
            }
        }
    }
}

/// One intercepted container call, produced immediately before the native
/// call executes and handed to the sink by value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptedCall {
    pub method: CredentialMethod,
    pub arguments: Vec<ArgumentSnapshot>,
}

/// Observer callback receiving intercepted calls.
pub type SinkFn = Arc<dyn Fn(InterceptedCall) + Send + Sync>;

/// The per-page-session sink registration slot. Written by the embedding
/// environment, read by the proxy; an empty slot is a valid, silent no-op
/// state.
#[derive(Clone, Default)]
pub struct SinkSlot {
    inner: Arc<Mutex<Option<SinkFn>>>,
}

impl SinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the observer callback. Expected once, at session setup.
    pub fn register(&self, sink: impl Fn(InterceptedCall) + Send + Sync + 'static) {
        *self.inner.lock().unwrap() = Some(Arc::new(sink));
    }

    pub fn is_registered(&self) -> bool {
        self.inner.lock().unwrap().is_some()
    }

    /// Deliver one event. A panicking sink is trapped here so delivery can
    /// never disturb the call being observed, and the slot's lock is not
    /// held across the callback, so a sink may touch the instrumentation
    /// it observes.
    pub fn deliver(&self, call: InterceptedCall) {
        let sink = self.inner.lock().unwrap().as_ref().cloned();
        let Some(sink) = sink else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| sink(call))).is_err() {
            tracing::error!("credential sink panicked; event dropped");
        }
    }
}

impl fmt::Debug for SinkSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Interception wrapper around a native credential container.
///
/// Owns the native implementation it captured at install time and a
/// read-only handle to the sink slot. Implements `CredentialsContainer`
/// itself, so callers cannot tell wrapped from native behavior.
pub struct Intercepting<N> {
    native: N,
    sink: SinkSlot,
}

impl<N: CredentialsContainer> Intercepting<N> {
    /// Install the wrapper, capturing the native container. One install
    /// per page session: wrapping an already-instrumented container is
    /// refused, so a single native invocation can never emit twice.
    pub fn install(native: N, sink: SinkSlot) -> Result<Self, InterceptError> {
        if native.is_instrumented() {
            return Err(InterceptError::AlreadyInstrumented);
        }
        Ok(Self::wrap(native, sink))
    }

    pub(crate) fn wrap(native: N, sink: SinkSlot) -> Self {
        Self { native, sink }
    }

    fn emit(&self, method: CredentialMethod, arguments: Vec<ArgumentSnapshot>) {
        tracing::debug!(method = %method, "credentials call intercepted");
        self.sink.deliver(InterceptedCall { method, arguments });
    }
}

impl<N: CredentialsContainer> CredentialsContainer for Intercepting<N> {
    fn create(&self, options: CredentialCreationOptions) -> PendingCredential<'_> {
        self.emit(
            CredentialMethod::Create,
            vec![ArgumentSnapshot::opaque(&options)],
        );
        self.native.create(options)
    }

    fn get(&self, options: CredentialRequestOptions) -> PendingCredential<'_> {
        self.emit(
            CredentialMethod::Get,
            vec![ArgumentSnapshot::opaque(&options)],
        );
        self.native.get(options)
    }

    fn prevent_silent_access(&self) -> PendingVoid<'_> {
        self.emit(CredentialMethod::PreventSilentAccess, Vec::new());
        self.native.prevent_silent_access()
    }

    fn store(&self, credential: Credential) -> PendingVoid<'_> {
        self.emit(
            CredentialMethod::Store,
            vec![ArgumentSnapshot::credential(&credential)],
        );
        self.native.store(credential)
    }

    fn is_instrumented(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryCredentials;
    use crate::credential::PasswordCredential;

    fn collecting_sink() -> (SinkSlot, Arc<Mutex<Vec<InterceptedCall>>>) {
        let slot = SinkSlot::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = events.clone();
        slot.register(move |call| captured.lock().unwrap().push(call));
        (slot, events)
    }

    fn password_credential() -> Credential {
        Credential::Password(PasswordCredential {
            id: "alice".to_string(),
            name: None,
            icon_url: None,
            password: "s3cret".to_string(),
        })
    }

    #[test]
    fn test_store_emits_structured_snapshot() {
        let (slot, events) = collecting_sink();
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        smol::block_on(container.store(password_credential())).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].method, CredentialMethod::Store);
        let json = serde_json::to_value(&events[0].arguments[0]).unwrap();
        assert_eq!(json["type"], "password");
        assert_eq!(json["password"], "s3cret");
    }

    #[test]
    fn test_event_is_emitted_before_native_settlement() {
        let (slot, events) = collecting_sink();
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        let pending = container.get(CredentialRequestOptions {
            password: true,
            ..Default::default()
        });
        // Captured at invocation, not at settlement.
        assert_eq!(events.lock().unwrap().len(), 1);
        smol::block_on(pending).unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_prevent_silent_access_emits_empty_arguments() {
        let (slot, events) = collecting_sink();
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        smol::block_on(container.prevent_silent_access()).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events[0].method, CredentialMethod::PreventSilentAccess);
        assert!(events[0].arguments.is_empty());
    }

    #[test]
    fn test_unregistered_sink_is_a_silent_noop() {
        let container =
            Intercepting::install(MemoryCredentials::new(), SinkSlot::new()).unwrap();
        let got = smol::block_on(container.get(CredentialRequestOptions {
            password: true,
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn test_panicking_sink_does_not_disturb_native_call() {
        let slot = SinkSlot::new();
        slot.register(|_| panic!("sink failure"));
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        smol::block_on(container.store(password_credential())).unwrap();
        let got = smol::block_on(container.get(CredentialRequestOptions {
            password: true,
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(got, Some(password_credential()));
    }

    #[test]
    fn test_reentrant_sink_does_not_block_delivery() {
        let slot = SinkSlot::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = events.clone();
        let handle = slot.clone();
        slot.register(move |call| {
            // A sink may look back at the slot it is registered in.
            assert!(handle.is_registered());
            captured.lock().unwrap().push(call);
        });
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        smol::block_on(container.prevent_silent_access()).unwrap();
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_native_rejection_propagates_after_capture() {
        let (slot, events) = collecting_sink();
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        let err = smol::block_on(container.create(CredentialCreationOptions::default()))
            .unwrap_err();
        assert!(matches!(err, crate::CredentialError::NotSupported(_)));
        // The failed call was still captured.
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_double_install_is_refused() {
        let first =
            Intercepting::install(MemoryCredentials::new(), SinkSlot::new()).unwrap();
        assert!(matches!(
            Intercepting::install(first, SinkSlot::new()),
            Err(InterceptError::AlreadyInstrumented)
        ));
    }

    #[test]
    fn test_one_invocation_emits_one_event() {
        let (slot, events) = collecting_sink();
        let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

        smol::block_on(container.prevent_silent_access()).unwrap();
        smol::block_on(container.prevent_silent_access()).unwrap();
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_method_names_serialize_as_the_page_spells_them() {
        let call = InterceptedCall {
            method: CredentialMethod::PreventSilentAccess,
            arguments: Vec::new(),
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["method"], "preventSilentAccess");
    }
}
