//! Native credential model
//!
//! The platform objects the credential container hands out: password,
//! federated, identity, and public-key (WebAuthn) credentials, plus an
//! opaque variant for credential types this build does not recognize.

use url::Url;

/// A platform credential, one of the four recognized variants or an
/// unrecognized passthrough.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Password(PasswordCredential),
    Federated(FederatedCredential),
    Identity(IdentityCredential),
    PublicKey(PublicKeyCredential),
    Other(OtherCredential),
}

/// Password credential
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordCredential {
    pub id: String,
    pub name: Option<String>,
    pub icon_url: Option<Url>,
    pub password: String,
}

/// Federated credential (legacy federation, pre-FedCM)
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedCredential {
    pub id: String,
    pub name: Option<String>,
    pub icon_url: Option<Url>,
    pub provider: Url,
    pub protocol: Option<String>,
}

/// Identity credential (FedCM)
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityCredential {
    pub id: String,
    pub token: Option<String>,
}

/// Public-key credential (WebAuthn)
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeyCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub response: AuthenticatorResponse,
    pub authenticator_attachment: Option<AuthenticatorAttachment>,
}

/// Payload returned by the authenticator for a public-key credential.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthenticatorResponse {
    /// Registration (`create`) response.
    Attestation {
        client_data_json: Vec<u8>,
        attestation_object: Vec<u8>,
    },
    /// Authentication (`get`) response.
    Assertion {
        client_data_json: Vec<u8>,
        authenticator_data: Vec<u8>,
        signature: Vec<u8>,
        user_handle: Option<Vec<u8>>,
    },
}

/// Authenticator attachment modality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorAttachment {
    Platform,
    CrossPlatform,
}

impl AuthenticatorAttachment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::CrossPlatform => "cross-platform",
        }
    }
}

/// A credential variant this build does not recognize. Kept as a shallow
/// field bag so future platform credential types still show up in the
/// event stream instead of vanishing.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherCredential {
    pub id: String,
    pub kind: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Credential {
    /// Credential identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Password(c) => &c.id,
            Self::Federated(c) => &c.id,
            Self::Identity(c) => &c.id,
            Self::PublicKey(c) => &c.id,
            Self::Other(c) => &c.id,
        }
    }

    /// The `type` discriminant the web API exposes.
    pub fn kind(&self) -> &str {
        match self {
            Self::Password(_) => "password",
            Self::Federated(_) => "federated",
            Self::Identity(_) => "identity",
            Self::PublicKey(_) => "public-key",
            Self::Other(c) => &c.kind,
        }
    }

    /// Classify an untyped (page-supplied) credential object into a
    /// variant. Recognized `type` values with well-formed required fields
    /// become structured variants; everything else is kept opaque.
    pub fn from_untyped(fields: &serde_json::Map<String, serde_json::Value>) -> Self {
        let str_field = |name: &str| {
            fields
                .get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        let kind = str_field("type").unwrap_or_default();

        match kind.as_str() {
            "password" => {
                if let (Some(id), Some(password)) = (str_field("id"), str_field("password")) {
                    return Self::Password(PasswordCredential {
                        id,
                        name: str_field("name"),
                        icon_url: str_field("iconURL").and_then(|u| Url::parse(&u).ok()),
                        password,
                    });
                }
            }
            "federated" => {
                let provider = str_field("provider").and_then(|u| Url::parse(&u).ok());
                if let (Some(id), Some(provider)) = (str_field("id"), provider) {
                    return Self::Federated(FederatedCredential {
                        id,
                        name: str_field("name"),
                        icon_url: str_field("iconURL").and_then(|u| Url::parse(&u).ok()),
                        provider,
                        protocol: str_field("protocol"),
                    });
                }
            }
            "identity" => {
                if let Some(id) = str_field("id") {
                    return Self::Identity(IdentityCredential {
                        id,
                        token: str_field("token"),
                    });
                }
            }
            _ => {}
        }

        Self::Other(OtherCredential {
            id: str_field("id").unwrap_or_default(),
            kind: if kind.is_empty() {
                "unknown".to_string()
            } else {
                kind
            },
            fields: fields.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(json: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match json {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_classify_password() {
        let cred = Credential::from_untyped(&obj(serde_json::json!({
            "type": "password",
            "id": "alice",
            "password": "s3cret",
            "name": "Alice",
        })));
        match cred {
            Credential::Password(c) => {
                assert_eq!(c.id, "alice");
                assert_eq!(c.password, "s3cret");
                assert_eq!(c.name.as_deref(), Some("Alice"));
                assert!(c.icon_url.is_none());
            }
            other => panic!("expected password credential, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_federated() {
        let cred = Credential::from_untyped(&obj(serde_json::json!({
            "type": "federated",
            "id": "alice@idp.example",
            "provider": "https://idp.example",
        })));
        match cred {
            Credential::Federated(c) => {
                assert_eq!(c.provider.as_str(), "https://idp.example/");
            }
            other => panic!("expected federated credential, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_required_field_degrades_to_other() {
        // Federated without a parseable provider is not a recognized shape.
        let cred = Credential::from_untyped(&obj(serde_json::json!({
            "type": "federated",
            "id": "alice",
            "provider": "not a url",
        })));
        match cred {
            Credential::Other(c) => {
                assert_eq!(c.kind, "federated");
                assert_eq!(c.id, "alice");
            }
            other => panic!("expected opaque credential, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown_type() {
        let cred = Credential::from_untyped(&obj(serde_json::json!({
            "type": "otp",
            "id": "device-1",
            "code": "123456",
        })));
        match &cred {
            Credential::Other(c) => {
                assert_eq!(c.kind, "otp");
                assert!(c.fields.contains_key("code"));
            }
            other => panic!("expected opaque credential, got {other:?}"),
        }
        assert_eq!(cred.kind(), "otp");
        assert_eq!(cred.id(), "device-1");
    }
}
