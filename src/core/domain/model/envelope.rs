//! Response envelopes of the cPanel JSON APIs.
//!
//! Every dialect wraps its payload in an object carrying an `error` string.
//! Payloads are kept as raw JSON and decoded in a second step, after the
//! envelope has been checked, so a malformed payload never hides the error
//! the server actually reported.

use crate::core::domain::error::{CpanelError, CpanelResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;

/// Common contract of all response envelopes.
pub trait Envelope {
    /// The failure reported by the server, if any.
    fn error_message(&self) -> Option<Cow<'_, str>>;

    /// Turns a reported failure into `CpanelError::Api`.
    fn check(&self) -> CpanelResult<()> {
        match self.error_message() {
            Some(message) => Err(CpanelError::Api(message.into_owned())),
            None => Ok(()),
        }
    }
}

fn non_empty(error: &str) -> Option<Cow<'_, str>> {
    (!error.is_empty()).then_some(Cow::Borrowed(error))
}

/// Envelope of a UAPI (`/execute/...`) response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UapiEnvelope {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope for UapiEnvelope {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        if let Some(error) = non_empty(&self.error) {
            return Some(error);
        }
        // UAPI reports its own failures through `status: 0` and `errors`.
        match &self.errors {
            Some(errors) if self.status == 0 && !errors.is_empty() => {
                Some(Cow::Owned(errors.join("; ")))
            }
            _ => None,
        }
    }
}

impl UapiEnvelope {
    /// Checks the envelope, then decodes `data` into `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> CpanelResult<T> {
        self.check()?;
        serde_json::from_value(self.data)
            .map_err(|e| CpanelError::Decode(format!("Failed to decode UAPI data: {}", e)))
    }
}

/// The `event` block of legacy responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Api2Event {
    #[serde(default)]
    pub result: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Envelope of an API1/API2 (`/json-api/cpanel`) response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api2Envelope {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub event: Option<Api2Event>,
    #[serde(default)]
    pub cpanelresult: Value,
}

impl Envelope for Api2Envelope {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        non_empty(&self.error)
    }
}

impl Api2Envelope {
    /// Checks the envelope, then decodes `cpanelresult` into `T`.
    pub fn into_result<T: DeserializeOwned>(self) -> CpanelResult<T> {
        self.check()?;
        serde_json::from_value(self.cpanelresult)
            .map_err(|e| CpanelError::Decode(format!("Failed to decode cpanelresult: {}", e)))
    }
}
