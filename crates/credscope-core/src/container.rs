//! Credential container
//!
//! The native API surface the interception proxy wraps: `create`, `get`,
//! `preventSilentAccess`, `store`. Operations settle asynchronously, so
//! each returns a boxed pending future, matching the promise contract of
//! the web API. `MemoryCredentials` is the in-process backend the engine
//! runs pages against.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use url::Url;

use crate::CredentialError;
use crate::credential::{
    AuthenticatorAttachment, AuthenticatorResponse, Credential, FederatedCredential,
    IdentityCredential, PasswordCredential, PublicKeyCredential,
};
use crate::options::{CredentialCreationOptions, CredentialRequestOptions, Mediation};

/// A pending operation that settles with a credential (or `None`).
pub type PendingCredential<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Credential>, CredentialError>> + Send + 'a>>;

/// A pending operation that settles with no value.
pub type PendingVoid<'a> = Pin<Box<dyn Future<Output = Result<(), CredentialError>> + Send + 'a>>;

/// The credential-container entry points.
pub trait CredentialsContainer: Send {
    /// Mint a new credential from the given options.
    fn create(&self, options: CredentialCreationOptions) -> PendingCredential<'_>;

    /// Retrieve a credential matching the given options.
    fn get(&self, options: CredentialRequestOptions) -> PendingCredential<'_>;

    /// Block silent mediation until the next explicit sign-in.
    fn prevent_silent_access(&self) -> PendingVoid<'_>;

    /// Persist a credential for later retrieval.
    fn store(&self, credential: Credential) -> PendingVoid<'_>;

    /// Whether this container is already an interception wrapper. Used to
    /// refuse double installation; native containers report `false`.
    fn is_instrumented(&self) -> bool {
        false
    }
}

/// In-memory credential backend.
pub struct MemoryCredentials {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    // Stored credentials keyed by (type, id); BTreeMap keeps retrieval
    // order stable.
    stored: BTreeMap<(String, String), Credential>,
    // Public-key credentials registered via create(), newest last.
    passkeys: Vec<(String, Vec<u8>)>,
    silent_access_blocked: bool,
    counter: u64,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn create_password(
        init: &crate::options::PasswordCredentialInit,
    ) -> Result<Credential, CredentialError> {
        let icon_url = match &init.icon_url {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|_| CredentialError::Type(format!("invalid iconURL: {raw}")))?,
            ),
            None => None,
        };
        Ok(Credential::Password(PasswordCredential {
            id: init.id.clone(),
            name: init.name.clone(),
            icon_url,
            password: init.password.clone(),
        }))
    }

    fn create_federated(
        init: &crate::options::FederatedCredentialInit,
    ) -> Result<Credential, CredentialError> {
        let provider = Url::parse(&init.provider)
            .map_err(|_| CredentialError::Type(format!("invalid provider: {}", init.provider)))?;
        let icon_url = match &init.icon_url {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|_| CredentialError::Type(format!("invalid iconURL: {raw}")))?,
            ),
            None => None,
        };
        Ok(Credential::Federated(FederatedCredential {
            id: init.id.clone(),
            name: init.name.clone(),
            icon_url,
            provider,
            protocol: init.protocol.clone(),
        }))
    }

    fn create_public_key(
        state: &mut State,
        options: &crate::options::PublicKeyCreationOptions,
    ) -> Credential {
        state.counter += 1;
        let mut raw_id = [0u8; 16];
        raw_id[8..].copy_from_slice(&state.counter.to_be_bytes());
        let id = URL_SAFE_NO_PAD.encode(raw_id);

        let origin = options
            .rp
            .as_ref()
            .and_then(|rp| rp.id.clone())
            .unwrap_or_else(|| "localhost".to_string());
        let client_data = serde_json::json!({
            "type": "webauthn.create",
            "challenge": options.challenge,
            "origin": format!("https://{origin}"),
        });

        state.passkeys.push((id.clone(), raw_id.to_vec()));
        Credential::PublicKey(PublicKeyCredential {
            id,
            raw_id: raw_id.to_vec(),
            response: AuthenticatorResponse::Attestation {
                client_data_json: client_data.to_string().into_bytes(),
                // Would come from the platform authenticator.
                attestation_object: b"mock-attestation-object".to_vec(),
            },
            authenticator_attachment: Some(AuthenticatorAttachment::Platform),
        })
    }

    fn get_public_key(
        state: &mut State,
        options: &crate::options::PublicKeyRequestOptions,
    ) -> Result<Option<Credential>, CredentialError> {
        let Some((id, raw_id)) = state.passkeys.last().cloned() else {
            return Err(CredentialError::NotAllowed(
                "no passkey available".to_string(),
            ));
        };
        let origin = options.rp_id.clone().unwrap_or_else(|| "localhost".to_string());
        let client_data = serde_json::json!({
            "type": "webauthn.get",
            "challenge": options.challenge,
            "origin": format!("https://{origin}"),
        });
        Ok(Some(Credential::PublicKey(PublicKeyCredential {
            id,
            raw_id,
            response: AuthenticatorResponse::Assertion {
                client_data_json: client_data.to_string().into_bytes(),
                authenticator_data: b"mock-authenticator-data".to_vec(),
                signature: b"mock-signature".to_vec(),
                user_handle: None,
            },
            authenticator_attachment: Some(AuthenticatorAttachment::Platform),
        })))
    }

    fn get_sync(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<Credential>, CredentialError> {
        let mut state = self.state.lock().unwrap();

        if options.mediation == Mediation::Silent && state.silent_access_blocked {
            return Ok(None);
        }

        if let Some(public_key) = &options.public_key {
            return Self::get_public_key(&mut state, public_key);
        }

        if let Some(identity) = &options.identity {
            // Would run the FedCM flow against the configured provider.
            let Some(provider) = identity.providers.first() else {
                return Err(CredentialError::Type(
                    "identity request without providers".to_string(),
                ));
            };
            state.counter += 1;
            let id = provider
                .client_id
                .clone()
                .or_else(|| provider.config_url.clone())
                .unwrap_or_else(|| "identity".to_string());
            return Ok(Some(Credential::Identity(IdentityCredential {
                id,
                token: Some(format!("idtoken-{}", state.counter)),
            })));
        }

        if let Some(federated) = &options.federated {
            let found = state.stored.iter().find_map(|((kind, _), credential)| {
                if kind != "federated" {
                    return None;
                }
                match credential {
                    Credential::Federated(c)
                        if federated
                            .providers
                            .iter()
                            .any(|p| p.trim_end_matches('/') == c.provider.as_str().trim_end_matches('/')) =>
                    {
                        Some(credential.clone())
                    }
                    _ => None,
                }
            });
            if let Some(credential) = found {
                return Ok(Some(credential));
            }
        }

        if options.password {
            let found = state
                .stored
                .iter()
                .find(|((kind, _), _)| kind == "password")
                .map(|(_, credential)| credential.clone());
            if let Some(credential) = found {
                return Ok(Some(credential));
            }
        }

        if !options.password && options.federated.is_none() {
            return Err(CredentialError::NotSupported(
                "no credential type requested".to_string(),
            ));
        }

        Ok(None)
    }
}

impl Default for MemoryCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsContainer for MemoryCredentials {
    fn create(&self, options: CredentialCreationOptions) -> PendingCredential<'_> {
        let requested = usize::from(options.password.is_some())
            + usize::from(options.federated.is_some())
            + usize::from(options.public_key.is_some());
        let result = if requested > 1 {
            Err(CredentialError::Type(
                "exactly one credential type must be requested".to_string(),
            ))
        } else if let Some(init) = &options.password {
            Self::create_password(init).map(Some)
        } else if let Some(init) = &options.federated {
            Self::create_federated(init).map(Some)
        } else if let Some(public_key) = &options.public_key {
            let mut state = self.state.lock().unwrap();
            Ok(Some(Self::create_public_key(&mut state, public_key)))
        } else {
            Err(CredentialError::NotSupported(
                "no credential type requested".to_string(),
            ))
        };
        Box::pin(async move { result })
    }

    fn get(&self, options: CredentialRequestOptions) -> PendingCredential<'_> {
        let result = self.get_sync(&options);
        Box::pin(async move { result })
    }

    fn prevent_silent_access(&self) -> PendingVoid<'_> {
        self.state.lock().unwrap().silent_access_blocked = true;
        Box::pin(async move { Ok(()) })
    }

    fn store(&self, credential: Credential) -> PendingVoid<'_> {
        let result = match &credential {
            Credential::Password(_) | Credential::Federated(_) => {
                let key = (credential.kind().to_string(), credential.id().to_string());
                self.state.lock().unwrap().stored.insert(key, credential);
                Ok(())
            }
            other => Err(CredentialError::Type(format!(
                "credential of type {:?} is not storable",
                other.kind()
            ))),
        };
        Box::pin(async move { result })
    }
}
