//! Method channels between the UI layer and the host.
//!
//! A [`MessagingContext`] is owned by the host and maps channel names to
//! handlers. Nothing here is global: a host that wants two isolated engines
//! creates two contexts.

use crate::codec;
use crate::error::{Result, VibrationError};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One inbound invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name, matched exactly
    pub method: String,
    /// Named arguments; null when the caller sent none
    #[serde(default, rename = "args")]
    pub arguments: Value,
}

impl MethodCall {
    /// Build a call
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The single reply to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// Handled, with a result payload
    Success(Value),
    /// Handled and failed
    #[allow(missing_docs)]
    Error {
        code: String,
        message: Option<String>,
        details: Value,
    },
    /// The receiver does not know the method. Not a failure.
    NotImplemented,
}

impl MethodResponse {
    /// Success without payload
    pub fn empty() -> Self {
        MethodResponse::Success(Value::Null)
    }

    /// Error reply without details
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    /// True for [`MethodResponse::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }
}

/// Receives calls for one channel.
pub trait MethodCallHandler: Send + Sync {
    /// Produce exactly one reply for `call`.
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse;
}

impl<F> MethodCallHandler for F
where
    F: Fn(&MethodCall) -> MethodResponse + Send + Sync,
{
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        self(call)
    }
}

/// Channel registry supplied by the host.
#[derive(Default)]
pub struct MessagingContext {
    handlers: HashMap<String, Arc<dyn MethodCallHandler>>,
}

impl MessagingContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `channel`. An existing handler for the same name is
    /// replaced; returns true in that case.
    pub fn register(&mut self, channel: impl Into<String>, handler: Arc<dyn MethodCallHandler>) -> bool {
        let channel = channel.into();
        let replaced = self.handlers.insert(channel.clone(), handler).is_some();
        if replaced {
            warn!(channel = %channel, "Replaced existing method channel handler");
        } else {
            info!(channel = %channel, "Registered method channel handler");
        }
        replaced
    }

    /// Detach the handler for `channel`, if any.
    pub fn unregister(&mut self, channel: &str) -> bool {
        self.handlers.remove(channel).is_some()
    }

    /// Whether `channel` has a handler
    pub fn is_registered(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    /// Deliver a decoded call. Unknown channels answer `NotImplemented`.
    pub fn invoke(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        match self.handlers.get(channel) {
            Some(handler) => handler.on_method_call(call),
            None => {
                debug!(channel = %channel, method = %call.method, "No handler for channel");
                MethodResponse::NotImplemented
            }
        }
    }

    /// Deliver an encoded call and return the encoded reply.
    pub fn send(&self, channel: &str, message: &[u8]) -> Vec<u8> {
        let response = match codec::decode_method_call(message) {
            Ok(call) => self.invoke(channel, &call),
            Err(e) => {
                warn!(channel = %channel, error = %e, "Dropping malformed method call");
                MethodResponse::error("MALFORMED_CALL", e.to_string())
            }
        };
        codec::encode_response(&response)
    }
}

/// Set-once holder for the context a native host attaches.
///
/// Foreign entry points cannot carry a Rust value between calls, so the
/// context built at attach time lives here. The first successful attach wins;
/// later attaches return the existing context.
pub struct AttachedChannels {
    channels: OnceCell<MessagingContext>,
}

impl AttachedChannels {
    /// Empty slot
    pub const fn new() -> Self {
        Self {
            channels: OnceCell::new(),
        }
    }

    /// Build the context with `init` unless one is already attached.
    pub fn attach_with<F>(&self, init: F) -> Result<&MessagingContext>
    where
        F: FnOnce() -> Result<MessagingContext>,
    {
        self.channels.get_or_try_init(init)
    }

    /// Whether a context has been attached
    pub fn is_attached(&self) -> bool {
        self.channels.get().is_some()
    }

    /// Forward an encoded call to the attached context.
    pub fn send(&self, channel: &str, message: &[u8]) -> Result<Vec<u8>> {
        let channels = self.channels.get().ok_or(VibrationError::NotAttached)?;
        Ok(channels.send(channel, message))
    }
}

impl Default for AttachedChannels {
    fn default() -> Self {
        Self::new()
    }
}
