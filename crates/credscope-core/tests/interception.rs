//! Integration tests for the interception layer
//!
//! The page-facing contract: a wrapped container is indistinguishable from
//! the native one, and instrumentation failures never reach the page.

use std::sync::{Arc, Mutex};

use credscope_core::{
    Credential, CredentialCreationOptions, CredentialError, CredentialRequestOptions,
    CredentialsContainer, InterceptedCall, Intercepting, MemoryCredentials, PageSession,
    PasswordCredential, PasswordCredentialInit, PublicKeyCreationOptions, SinkSlot,
};

fn collecting_sink() -> (SinkSlot, Arc<Mutex<Vec<InterceptedCall>>>) {
    let slot = SinkSlot::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let captured = events.clone();
    slot.register(move |call| captured.lock().unwrap().push(call));
    (slot, events)
}

fn password_credential(id: &str) -> Credential {
    Credential::Password(PasswordCredential {
        id: id.to_string(),
        name: None,
        icon_url: None,
        password: "s3cret".to_string(),
    })
}

fn webauthn_creation() -> CredentialCreationOptions {
    CredentialCreationOptions {
        public_key: Some(PublicKeyCreationOptions {
            challenge: "Y2hhbGxlbmdl".to_string(),
            rp: None,
            user: None,
            timeout: None,
            extra: serde_json::Map::new(),
        }),
        ..Default::default()
    }
}

/// With no sink registered, every entry point behaves exactly like the
/// unwrapped native container, for resolutions and rejections alike.
#[test]
fn wrapped_container_matches_native_behavior() {
    let native = MemoryCredentials::new();
    let wrapped = Intercepting::install(MemoryCredentials::new(), SinkSlot::new()).unwrap();

    // store + get resolve identically.
    smol::block_on(native.store(password_credential("alice"))).unwrap();
    smol::block_on(wrapped.store(password_credential("alice"))).unwrap();
    let request = CredentialRequestOptions {
        password: true,
        ..Default::default()
    };
    assert_eq!(
        smol::block_on(native.get(request.clone())).unwrap(),
        smol::block_on(wrapped.get(request)).unwrap(),
    );

    // preventSilentAccess resolves identically.
    assert_eq!(
        smol::block_on(native.prevent_silent_access()),
        smol::block_on(wrapped.prevent_silent_access()),
    );

    // Rejections are identical too.
    let invalid = CredentialCreationOptions {
        password: Some(PasswordCredentialInit {
            id: "alice".to_string(),
            password: "s3cret".to_string(),
            name: None,
            icon_url: Some("not a url".to_string()),
        }),
        ..Default::default()
    };
    assert_eq!(
        smol::block_on(native.create(invalid.clone())).unwrap_err(),
        smol::block_on(wrapped.create(invalid)).unwrap_err(),
    );
    assert_eq!(
        smol::block_on(native.create(CredentialCreationOptions::default())).unwrap_err(),
        smol::block_on(wrapped.create(CredentialCreationOptions::default())).unwrap_err(),
    );
}

/// A WebAuthn registration is captured on invocation: the sink sees the
/// request arguments before the operation settles, and the authenticator
/// response is not part of the captured call.
#[test]
fn webauthn_create_is_captured_on_invocation() {
    let (slot, events) = collecting_sink();
    let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

    let pending = container.create(webauthn_creation());

    {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].method.as_str(), "create");
        let arguments = serde_json::to_value(&events[0].arguments).unwrap();
        assert_eq!(arguments[0]["publicKey"]["challenge"], "Y2hhbGxlbmdl");
        // Request capture only; no authenticator response in the event.
        assert!(arguments[0].get("response").is_none());
        assert!(arguments[0]["publicKey"].get("response").is_none());
    }

    let created = smol::block_on(pending).unwrap().unwrap();
    assert_eq!(created.kind(), "public-key");
    // Settlement added nothing to the capture.
    assert_eq!(events.lock().unwrap().len(), 1);
}

/// A sink that panics on every event cannot block the credential flow.
#[test]
fn panicking_sink_never_reaches_the_page() {
    let session = PageSession::new();
    session.sink().register(|_| panic!("observer bug"));

    smol::block_on(session.credentials().store(password_credential("alice"))).unwrap();
    let got = smol::block_on(session.credentials().get(CredentialRequestOptions {
        password: true,
        ..Default::default()
    }))
    .unwrap();
    assert_eq!(got, Some(password_credential("alice")));

    // Native rejections still come through unchanged.
    let err = smol::block_on(
        session
            .credentials()
            .create(CredentialCreationOptions::default()),
    )
    .unwrap_err();
    assert!(matches!(err, CredentialError::NotSupported(_)));
}

/// The serialized event stream carries the shapes the downstream analysis
/// pipeline consumes: method names as the page spells them and raw
/// argument objects with their discriminating members.
#[test]
fn event_stream_is_downstream_consumable() {
    let (slot, events) = collecting_sink();
    let container = Intercepting::install(MemoryCredentials::new(), slot).unwrap();

    let _ = smol::block_on(container.create(webauthn_creation()));
    smol::block_on(container.store(password_credential("alice"))).unwrap();
    smol::block_on(container.prevent_silent_access()).unwrap();

    let events = events.lock().unwrap();
    let stream: Vec<serde_json::Value> = events
        .iter()
        .map(|call| serde_json::to_value(call).unwrap())
        .collect();

    assert_eq!(stream[0]["method"], "create");
    assert!(stream[0]["arguments"][0].get("publicKey").is_some());
    assert_eq!(stream[1]["method"], "store");
    assert_eq!(stream[1]["arguments"][0]["type"], "password");
    assert_eq!(stream[2]["method"], "preventSilentAccess");
    assert_eq!(stream[2]["arguments"].as_array().unwrap().len(), 0);
}
