//! credscope core
//!
//! Credential API interception and serialization for automated analysis of
//! single-sign-on login flows.
//!
//! Features:
//! - Native credential model (password, federated, identity, public-key)
//! - Serialization adapter: plain, JSON-representable credential snapshots
//! - Interception proxy: transparent wrapper around the credential container
//! - Sink channel: per-page observer callback slot
//!
//! The proxy owns the native container it wraps (dependency injection, one
//! install per page session) and never alters what the page observes: the
//! native result, its timing, and its rejections pass through untouched.

pub mod container;
pub mod credential;
pub mod intercept;
pub mod options;
pub mod session;
pub mod snapshot;

pub use container::{CredentialsContainer, MemoryCredentials, PendingCredential, PendingVoid};
pub use credential::{
    AuthenticatorAttachment, AuthenticatorResponse, Credential, FederatedCredential,
    IdentityCredential, OtherCredential, PasswordCredential, PublicKeyCredential,
};
pub use intercept::{
    ArgumentSnapshot, CredentialMethod, InterceptedCall, Intercepting, SinkFn, SinkSlot,
};
pub use options::{
    CredentialCreationOptions, CredentialRequestOptions, FederatedCredentialInit,
    FederatedRequestOptions, IdentityProviderConfig, IdentityRequestOptions, Mediation,
    PasswordCredentialInit, PublicKeyCreationOptions, PublicKeyRequestOptions, PublicKeyUser,
    RelyingParty,
};
pub use session::PageSession;
pub use snapshot::{AuthenticatorResponseSnapshot, CredentialSnapshot};

/// Error raised by a native credential operation.
///
/// Mirrors the exception names the web credential API surfaces, so a
/// wrapped container rejects exactly like the unwrapped one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("not allowed: {0}")]
    NotAllowed(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("type error: {0}")]
    Type(String),
}

/// Error raised while wiring the interception layer.
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// The container is already wrapped; one wrapper per page session.
    #[error("credential container is already instrumented")]
    AlreadyInstrumented,
}
