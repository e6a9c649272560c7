//! navigator.credentials bindings
//!
//! Raw Rust entry points are installed on the global object; a small
//! evaluated shim exposes them as `async` methods on
//! `navigator.credentials`, so callers receive promises and native errors
//! become rejections.
//!
//! Arguments cross the boundary as `JSON.stringify` output (the same
//! deep-copy semantics the capture contract requires: plain values only,
//! live object state left behind). Results travel back as a JSON envelope
//! `{value}` / `{error}` that the shim unwraps.

use std::sync::Arc;

use rquickjs::function::Opt;
use rquickjs::{Ctx, Function, Value};

use credscope_core::{
    ArgumentSnapshot, Credential, CredentialCreationOptions, CredentialMethod,
    CredentialRequestOptions, CredentialSnapshot, CredentialsContainer, InterceptedCall,
    PageSession,
};

const SHIM: &str = r#"
(function () {
    const unwrap = (raw) => {
        const result = JSON.parse(raw);
        if (result.error !== undefined) throw new Error(result.error);
        return result.value;
    };
    // A non-serializable argument must not block the call itself.
    const pack = (value) => {
        try {
            return JSON.stringify(value === undefined ? null : value);
        } catch (e) {
            return undefined;
        }
    };
    globalThis.navigator = globalThis.navigator || {};
    navigator.credentials = {
        async create(options) {
            return unwrap(__credscope_create(pack(options)));
        },
        async get(options) {
            return unwrap(__credscope_get(pack(options)));
        },
        async preventSilentAccess() {
            return unwrap(__credscope_prevent_silent_access());
        },
        async store(credential) {
            return unwrap(__credscope_store(pack(credential)));
        },
    };
})();
"#;

/// Install `navigator.credentials` into the global object, backed by the
/// session's instrumented container.
pub fn install_credentials(
    ctx: &Ctx,
    session: Arc<PageSession>,
) -> Result<(), rquickjs::Error> {
    let globals = ctx.globals();

    // `Opt` keeps the hooks callable with zero arguments; a plain optional
    // parameter would make the engine reject the bare call.
    let s = session.clone();
    globals.set(
        "__credscope_create",
        Function::new(ctx.clone(), move |input: Opt<String>| -> String {
            create_raw(&s, input.0)
        })?,
    )?;

    let s = session.clone();
    globals.set(
        "__credscope_get",
        Function::new(ctx.clone(), move |input: Opt<String>| -> String {
            get_raw(&s, input.0)
        })?,
    )?;

    let s = session.clone();
    globals.set(
        "__credscope_prevent_silent_access",
        Function::new(ctx.clone(), move |_input: Opt<String>| -> String {
            prevent_silent_access_raw(&s)
        })?,
    )?;

    let s = session.clone();
    globals.set(
        "__credscope_store",
        Function::new(ctx.clone(), move |input: Opt<String>| -> String {
            store_raw(&s, input.0)
        })?,
    )?;

    let _: Value = ctx.eval(SHIM)?;
    tracing::debug!("navigator.credentials instrumentation installed");

    Ok(())
}

/// Parse the page-side `JSON.stringify` output. `undefined` arguments
/// stringify to nothing at all and arrive as `None`.
fn page_value(input: Option<String>) -> serde_json::Value {
    match input {
        Some(raw) => serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
        None => serde_json::Value::Null,
    }
}

fn ok_envelope(value: serde_json::Value) -> String {
    serde_json::json!({ "value": value }).to_string()
}

fn err_envelope(message: String) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// An argument the boundary is about to refuse is still a call the page
/// made: capture it as-is before the rejection, so the observer sees
/// malformed attempts too.
fn capture_rejected(session: &PageSession, method: CredentialMethod, value: serde_json::Value) {
    session.sink().deliver(InterceptedCall {
        method,
        arguments: vec![ArgumentSnapshot::Opaque(value)],
    });
}

fn credential_envelope(
    result: Result<Option<Credential>, credscope_core::CredentialError>,
) -> String {
    match result {
        Ok(Some(credential)) => ok_envelope(
            serde_json::to_value(CredentialSnapshot::of(&credential))
                .unwrap_or(serde_json::Value::Null),
        ),
        Ok(None) => ok_envelope(serde_json::Value::Null),
        Err(error) => err_envelope(error.to_string()),
    }
}

fn create_raw(session: &PageSession, input: Option<String>) -> String {
    let value = page_value(input);
    let options: CredentialCreationOptions = if value.is_null() {
        CredentialCreationOptions::default()
    } else {
        match serde_json::from_value(value.clone()) {
            Ok(options) => options,
            Err(error) => {
                capture_rejected(session, CredentialMethod::Create, value);
                return err_envelope(format!("type error: invalid create options: {error}"));
            }
        }
    };
    credential_envelope(smol::block_on(session.credentials().create(options)))
}

fn get_raw(session: &PageSession, input: Option<String>) -> String {
    let value = page_value(input);
    let options: CredentialRequestOptions = if value.is_null() {
        CredentialRequestOptions::default()
    } else {
        match serde_json::from_value(value.clone()) {
            Ok(options) => options,
            Err(error) => {
                capture_rejected(session, CredentialMethod::Get, value);
                return err_envelope(format!("type error: invalid get options: {error}"));
            }
        }
    };
    credential_envelope(smol::block_on(session.credentials().get(options)))
}

fn prevent_silent_access_raw(session: &PageSession) -> String {
    match smol::block_on(session.credentials().prevent_silent_access()) {
        Ok(()) => ok_envelope(serde_json::Value::Null),
        Err(error) => err_envelope(error.to_string()),
    }
}

fn store_raw(session: &PageSession, input: Option<String>) -> String {
    let fields = match page_value(input) {
        serde_json::Value::Object(fields) => fields,
        other => {
            capture_rejected(session, CredentialMethod::Store, other);
            return err_envelope("type error: store requires a credential object".to_string());
        }
    };
    let credential = Credential::from_untyped(&fields);
    match smol::block_on(session.credentials().store(credential)) {
        Ok(()) => ok_envelope(serde_json::Value::Null),
        Err(error) => err_envelope(error.to_string()),
    }
}
