//! JSON method codec.
//!
//! Wire shapes:
//! - call: `{"method": "<name>", "args": <value>}`, `args` optional
//! - success: `[<result>]`
//! - error: `[<code>, <message>, <details>]`
//! - not implemented: empty reply

use crate::channel::{MethodCall, MethodResponse};
use crate::error::{Result, VibrationError};
use serde_json::Value;

/// Decode an inbound call envelope.
pub fn decode_method_call(message: &[u8]) -> Result<MethodCall> {
    let value: Value = serde_json::from_slice(message)?;
    if !value.is_object() {
        return Err(VibrationError::Codec("call envelope is not an object".into()));
    }
    match value.get("method") {
        Some(Value::String(_)) => {}
        Some(_) => return Err(VibrationError::Codec("method is not a string".into())),
        None => return Err(VibrationError::Codec("missing method".into())),
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode an outbound call envelope.
pub fn encode_method_call(call: &MethodCall) -> Vec<u8> {
    serde_json::json!({ "method": call.method, "args": call.arguments })
        .to_string()
        .into_bytes()
}

/// Encode a reply.
pub fn encode_response(response: &MethodResponse) -> Vec<u8> {
    let envelope = match response {
        MethodResponse::NotImplemented => return Vec::new(),
        MethodResponse::Success(result) => Value::Array(vec![result.clone()]),
        MethodResponse::Error { code, message, details } => Value::Array(vec![
            Value::String(code.clone()),
            message.clone().map(Value::String).unwrap_or(Value::Null),
            details.clone(),
        ]),
    };
    envelope.to_string().into_bytes()
}

/// Decode a reply, as the UI side would.
pub fn decode_response(reply: &[u8]) -> Result<MethodResponse> {
    if reply.is_empty() {
        return Ok(MethodResponse::NotImplemented);
    }

    let value: Value = serde_json::from_slice(reply)?;
    let Value::Array(mut items) = value else {
        return Err(VibrationError::Codec("reply envelope is not a list".into()));
    };

    match items.len() {
        1 => Ok(MethodResponse::Success(items.remove(0))),
        3 => {
            let details = items.pop().unwrap_or(Value::Null);
            let message = match items.pop() {
                Some(Value::String(m)) => Some(m),
                Some(Value::Null) | None => None,
                Some(_) => return Err(VibrationError::Codec("error message is not a string".into())),
            };
            let code = match items.pop() {
                Some(Value::String(c)) => c,
                _ => return Err(VibrationError::Codec("error code is not a string".into())),
            };
            Ok(MethodResponse::Error { code, message, details })
        }
        n => Err(VibrationError::Codec(format!("reply envelope has {} items", n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_call_with_args() {
        let call = decode_method_call(br#"{"method":"vibrate","args":{"duration":1200}}"#).unwrap();
        assert_eq!(call.method, "vibrate");
        assert_eq!(call.arguments, json!({"duration": 1200}));
    }

    #[test]
    fn test_decode_call_without_args() {
        let call = decode_method_call(br#"{"method":"vibrate"}"#).unwrap();
        assert_eq!(call.arguments, Value::Null);
    }

    #[test]
    fn test_decode_call_rejects_bad_envelopes() {
        assert!(matches!(decode_method_call(b"[1]"), Err(VibrationError::Codec(_))));
        assert!(matches!(decode_method_call(br#"{"args":{}}"#), Err(VibrationError::Codec(_))));
        assert!(matches!(decode_method_call(br#"{"method":7}"#), Err(VibrationError::Codec(_))));
        assert!(matches!(decode_method_call(b"{"), Err(VibrationError::Json(_))));
    }

    #[test]
    fn test_encode_call() {
        let bytes = encode_method_call(&MethodCall::new("vibrate", json!({"duration": 5})));
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"method": "vibrate", "args": {"duration": 5}}));
    }

    #[test]
    fn test_encode_success_empty() {
        assert_eq!(encode_response(&MethodResponse::empty()), b"[null]".to_vec());
    }

    #[test]
    fn test_not_implemented_is_empty_reply() {
        assert!(encode_response(&MethodResponse::NotImplemented).is_empty());
        assert_eq!(decode_response(b"").unwrap(), MethodResponse::NotImplemented);
    }

    #[test]
    fn test_error_reply() {
        let bytes = encode_response(&MethodResponse::error("MALFORMED_CALL", "missing method"));
        assert_eq!(bytes, br#"["MALFORMED_CALL","missing method",null]"#.to_vec());
        assert_eq!(
            decode_response(&bytes).unwrap(),
            MethodResponse::error("MALFORMED_CALL", "missing method")
        );
    }

    #[test]
    fn test_decode_response_rejects_odd_lengths() {
        assert!(decode_response(b"[1,2]").is_err());
        assert!(decode_response(br#"{"ok":true}"#).is_err());
    }
}
