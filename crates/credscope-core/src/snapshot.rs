//! Serialization adapter
//!
//! Converts platform credential objects into plain, acyclic,
//! JSON-representable snapshots. Conversion is total (no error path) and
//! idempotent: every field is copied by value from the live object, absent
//! optional state is simply omitted, and anything outside the allow-list
//! for a recognized variant is discarded. Unrecognized variants come
//! through as shallow opaque copies instead of vanishing.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;

use crate::credential::{AuthenticatorResponse, Credential};

/// Plain descriptor of one platform credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CredentialSnapshot {
    Password(PasswordSnapshot),
    Federated(FederatedSnapshot),
    Identity(IdentitySnapshot),
    PublicKey(PublicKeySnapshot),
    /// Shallow own-field copy of an unrecognized variant.
    Opaque(serde_json::Map<String, serde_json::Value>),
}

/// `{id, type, name?, iconURL?, password}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub password: String,
}

/// `{id, type, name?, iconURL?, provider, protocol?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FederatedSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// `{id, type, token?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentitySnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `{id, type, rawId, response, authenticatorAttachment?}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeySnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub raw_id: String,
    pub response: AuthenticatorResponseSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
}

/// Base64url copies of the authenticator payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorResponseSnapshot {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

impl CredentialSnapshot {
    /// Snapshot one platform credential.
    pub fn of(credential: &Credential) -> Self {
        match credential {
            Credential::Password(c) => Self::Password(PasswordSnapshot {
                id: c.id.clone(),
                kind: "password".to_string(),
                name: c.name.clone(),
                icon_url: c.icon_url.as_ref().map(|u| u.as_str().to_string()),
                password: c.password.clone(),
            }),
            Credential::Federated(c) => Self::Federated(FederatedSnapshot {
                id: c.id.clone(),
                kind: "federated".to_string(),
                name: c.name.clone(),
                icon_url: c.icon_url.as_ref().map(|u| u.as_str().to_string()),
                provider: c.provider.as_str().to_string(),
                protocol: c.protocol.clone(),
            }),
            Credential::Identity(c) => Self::Identity(IdentitySnapshot {
                id: c.id.clone(),
                kind: "identity".to_string(),
                token: c.token.clone(),
            }),
            Credential::PublicKey(c) => Self::PublicKey(PublicKeySnapshot {
                id: c.id.clone(),
                kind: "public-key".to_string(),
                raw_id: URL_SAFE_NO_PAD.encode(&c.raw_id),
                response: AuthenticatorResponseSnapshot::of(&c.response),
                authenticator_attachment: c.authenticator_attachment.map(|a| a.as_str().to_string()),
            }),
            Credential::Other(c) => {
                let mut fields = c.fields.clone();
                // An opaque snapshot still identifies itself.
                fields
                    .entry("id".to_string())
                    .or_insert_with(|| serde_json::Value::String(c.id.clone()));
                fields
                    .entry("type".to_string())
                    .or_insert_with(|| serde_json::Value::String(c.kind.clone()));
                Self::Opaque(fields)
            }
        }
    }
}

impl AuthenticatorResponseSnapshot {
    fn of(response: &AuthenticatorResponse) -> Self {
        match response {
            AuthenticatorResponse::Attestation {
                client_data_json,
                attestation_object,
            } => Self {
                client_data_json: URL_SAFE_NO_PAD.encode(client_data_json),
                attestation_object: Some(URL_SAFE_NO_PAD.encode(attestation_object)),
                authenticator_data: None,
                signature: None,
                user_handle: None,
            },
            AuthenticatorResponse::Assertion {
                client_data_json,
                authenticator_data,
                signature,
                user_handle,
            } => Self {
                client_data_json: URL_SAFE_NO_PAD.encode(client_data_json),
                attestation_object: None,
                authenticator_data: Some(URL_SAFE_NO_PAD.encode(authenticator_data)),
                signature: Some(URL_SAFE_NO_PAD.encode(signature)),
                user_handle: user_handle.as_ref().map(|h| URL_SAFE_NO_PAD.encode(h)),
            },
        }
    }
}
