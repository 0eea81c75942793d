//! Negative-case payload mutation.
//!
//! Derives an intentionally-invalid request body from a valid template by
//! replacing the transaction-reference field with a fixed invalid sentinel.
//! Only the known envelope shape is corrupted meaningfully; anything else
//! passes through untouched. Best-effort, never an error.

use serde_json::Value;

use crate::config::ResponseContract;

/// Deep-copy `payload` and corrupt the transaction reference if the
/// expected nested envelope shape is present. `Null` stays `Null`.
pub fn corrupt_payload(payload: &Value, contract: &ResponseContract) -> Value {
    if payload.is_null() {
        return Value::Null;
    }

    let mut corrupted = payload.clone();
    if let Some(request) = corrupted
        .get_mut(&contract.envelope)
        .and_then(|envelope| envelope.get_mut(&contract.request_wrapper))
    {
        if let Some(trans_ref) = request.get_mut(&contract.trans_ref_field) {
            *trans_ref = Value::String(contract.invalid_sentinel.clone());
        }
    }
    corrupted
}

/// Absent payloads (GET requests) stay absent.
pub fn corrupt_optional(payload: Option<&Value>, contract: &ResponseContract) -> Option<Value> {
    payload.map(|p| corrupt_payload(p, contract))
}
