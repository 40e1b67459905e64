//! Request descriptors for the three cPanel API dialects.
//!
//! UAPI calls go to `/execute/{module}/{function}`, API1 and API2 calls go to
//! `/json-api/cpanel` with the call coordinates passed as query parameters.

use crate::core::domain::error::{CpanelError, CpanelResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The API generation a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// The modern "UAPI" dialect.
    Uapi,
    /// Legacy API2.
    Api2,
    /// Legacy API1, where bare keys act as positional flags.
    Api1,
}

impl ApiVersion {
    /// The version tag as cPanel spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::Uapi => "uapi",
            ApiVersion::Api2 => "2",
            ApiVersion::Api1 => "1",
        }
    }

    /// Returns true for the `/json-api/cpanel` dialects.
    pub fn is_legacy(&self) -> bool {
        !matches!(self, ApiVersion::Uapi)
    }
}

impl FromStr for ApiVersion {
    type Err = CpanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uapi" => Ok(ApiVersion::Uapi),
            "2" => Ok(ApiVersion::Api2),
            "1" => Ok(ApiVersion::Api1),
            other => Err(CpanelError::Configuration(format!(
                "Unknown api version: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loosely-typed call arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiArgs(BTreeMap<String, Value>);

impl ApiArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, replacing any previous value under `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Encodes the arguments as query pairs for `version`.
    ///
    /// For API1 the value is ignored: a key of the form `name=value` is split
    /// on its first `=`, and a bare key becomes `key=` (an empty value).
    /// Every other version uses the value's plain string form.
    pub fn to_query_pairs(&self, version: ApiVersion) -> Vec<(String, String)> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .map(|(key, value)| match version {
                ApiVersion::Api1 => match key.split_once('=') {
                    Some((name, val)) => (name.to_string(), val.to_string()),
                    None => (key.clone(), String::new()),
                },
                _ => (key.clone(), value_to_string(value)),
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

impl<K, V> FromIterator<(K, V)> for ApiArgs
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A single call against the cPanel API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub version: ApiVersion,
    pub module: String,
    pub function: String,
    pub arguments: ApiArgs,
}

impl ApiRequest {
    pub fn new(
        version: ApiVersion,
        module: impl Into<String>,
        function: impl Into<String>,
        arguments: ApiArgs,
    ) -> Self {
        Self {
            version,
            module: module.into(),
            function: function.into(),
            arguments,
        }
    }

    /// Like [`ApiRequest::new`] but takes the version tag as text.
    ///
    /// # Errors
    /// Returns `CpanelError::Configuration` for an unknown version.
    pub fn parse(
        version: &str,
        module: impl Into<String>,
        function: impl Into<String>,
        arguments: ApiArgs,
    ) -> CpanelResult<Self> {
        Ok(Self::new(version.parse()?, module, function, arguments))
    }

    /// Builds the full request URL on top of `base` (scheme, host and port).
    ///
    /// Legacy calls get the `cpanel_jsonapi_*` coordinates injected, with
    /// `user` naming the authenticated account.
    pub fn build_url(&self, base: &Url, user: &str) -> CpanelResult<Url> {
        let mut pairs = self.arguments.to_query_pairs(self.version);

        let mut url = match self.version {
            ApiVersion::Uapi => {
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|_| {
                        CpanelError::Configuration(format!("Cannot use {} as a base URL", base))
                    })?
                    .clear()
                    .extend(["execute", self.module.as_str(), self.function.as_str()]);
                url
            }
            ApiVersion::Api2 | ApiVersion::Api1 => {
                pairs.extend([
                    ("cpanel_jsonapi_user".to_string(), user.to_string()),
                    (
                        "cpanel_jsonapi_apiversion".to_string(),
                        self.version.as_str().to_string(),
                    ),
                    ("cpanel_jsonapi_module".to_string(), self.module.clone()),
                    ("cpanel_jsonapi_func".to_string(), self.function.clone()),
                ]);
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                base.join("json-api/cpanel").map_err(|e| {
                    CpanelError::Configuration(format!("Invalid request URL: {}", e))
                })?
            }
        };

        url.set_query(None);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}
