//! Request and creation options
//!
//! Typed mirrors of the option dictionaries the credential container
//! accepts. Every struct round-trips through serde with the member names
//! the web API uses, and carries a flattened `extra` map so unknown
//! members coming across the page boundary survive capture verbatim.

use serde::{Deserialize, Serialize};

fn is_false(v: &bool) -> bool {
    !*v
}

/// Options for `credentials.create()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialCreationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<PasswordCredentialInit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federated: Option<FederatedCredentialInit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyCreationOptions>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Seed data for a new password credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordCredentialInit {
    pub id: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Seed data for a new federated credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedCredentialInit {
    pub id: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// WebAuthn registration options (the members this layer needs; the rest
/// ride along in `extra`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCreationOptions {
    pub challenge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp: Option<RelyingParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicKeyUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Relying-party identity for WebAuthn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelyingParty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// User account entity for WebAuthn registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicKeyUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Options for `credentials.get()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialRequestOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federated: Option<FederatedRequestOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityRequestOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKeyRequestOptions>,
    #[serde(skip_serializing_if = "Mediation::is_default")]
    pub mediation: Mediation,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Mediation requirement for `credentials.get()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mediation {
    Silent,
    #[default]
    Optional,
    Conditional,
    Required,
}

impl Mediation {
    fn is_default(&self) -> bool {
        *self == Self::Optional
    }
}

/// Legacy federated request member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederatedRequestOptions {
    pub providers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
}

/// FedCM request member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityRequestOptions {
    pub providers: Vec<IdentityProviderConfig>,
}

/// One identity provider entry of a FedCM request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityProviderConfig {
    #[serde(rename = "configURL", skip_serializing_if = "Option::is_none")]
    pub config_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// WebAuthn assertion request options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRequestOptions {
    pub challenge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
