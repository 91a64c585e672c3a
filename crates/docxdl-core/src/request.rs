//! Download request model and validation of loosely-typed download options.

use crate::error::DownloadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One download as the host hands it over: a resource locator plus opaque metadata.
///
/// Metadata is never inspected by the interceptor; it travels unchanged to the
/// default handler when the request is not intercepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    #[serde(default, flatten)]
    pub metadata: Map<String, Value>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Builds a request from a host options object such as `{"url": "...", "data": ...}`.
    ///
    /// A missing, empty or non-string `url` is an input error; every other field
    /// becomes metadata.
    pub fn from_options(options: Value) -> Result<Self, DownloadError> {
        let mut map = match options {
            Value::Object(map) => map,
            other => {
                return Err(DownloadError::InvalidRequest(format!(
                    "options must be an object, got {}",
                    json_type(&other)
                )))
            }
        };
        let url = match map.remove("url") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::String(_)) => {
                return Err(DownloadError::InvalidRequest("url is empty".into()))
            }
            Some(other) => {
                return Err(DownloadError::InvalidRequest(format!(
                    "url must be a string, got {}",
                    json_type(&other)
                )))
            }
            None => return Err(DownloadError::InvalidRequest("url is missing".into())),
        };
        Ok(Self { url, metadata: map })
    }

    /// True when the locator contains `marker` (plain, case-sensitive substring).
    pub fn matches_marker(&self, marker: &str) -> bool {
        !marker.is_empty() && self.url.contains(marker)
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolves a locator to an absolute URL, joining relative paths onto `base_url`.
pub fn resolve_url(locator: &str, base_url: Option<&str>) -> Result<url::Url, DownloadError> {
    match url::Url::parse(locator) {
        Ok(u) => Ok(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base_url.ok_or_else(|| {
                DownloadError::InvalidRequest(format!(
                    "relative url {} needs a base_url",
                    locator
                ))
            })?;
            let base = url::Url::parse(base).map_err(|e| {
                DownloadError::InvalidRequest(format!("base_url {}: {}", base, e))
            })?;
            base.join(locator)
                .map_err(|e| DownloadError::InvalidRequest(format!("{}: {}", locator, e)))
        }
        Err(e) => Err(DownloadError::InvalidRequest(format!("{}: {}", locator, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_options_keeps_other_fields_as_metadata() {
        let r = DownloadRequest::from_options(json!({
            "url": "/report/download",
            "data": "[\"/report/pdf/sale.report_saleorder/7\", \"qweb-pdf\"]",
            "context": {"lang": "en_US"}
        }))
        .unwrap();
        assert_eq!(r.url, "/report/download");
        assert_eq!(r.metadata.len(), 2);
        assert_eq!(r.metadata["context"]["lang"], "en_US");
    }

    #[test]
    fn from_options_rejects_bad_url() {
        for bad in [json!({}), json!({"url": 3}), json!({"url": ""}), json!("x")] {
            let err = DownloadRequest::from_options(bad).unwrap_err();
            assert!(matches!(err, DownloadError::InvalidRequest(_)));
        }
    }

    #[test]
    fn marker_is_case_sensitive() {
        let r = DownloadRequest::new("/report/docx/7");
        assert!(r.matches_marker("docx"));
        assert!(!DownloadRequest::new("/report/DOCX/7").matches_marker("docx"));
        assert!(!r.matches_marker(""));
    }

    #[test]
    fn resolve_relative_against_base() {
        let u = resolve_url("/report/123.pdf", Some("https://erp.example.com/web")).unwrap();
        assert_eq!(u.as_str(), "https://erp.example.com/report/123.pdf");
        let abs = resolve_url("http://a.test/x.pdf", None).unwrap();
        assert_eq!(abs.as_str(), "http://a.test/x.pdf");
    }

    #[test]
    fn resolve_relative_without_base_is_invalid() {
        let err = resolve_url("/report/123.pdf", None).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidRequest(_)));
    }

    #[test]
    fn serde_flattens_metadata() {
        let r = DownloadRequest::new("/a").with_metadata("token", "t1");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, json!({"url": "/a", "token": "t1"}));
    }
}
