//! Request extractors for position parameters

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ServerError;

/// Position parameters, kept as text until parsed into a coordinate.
#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl LocationParams {
    /// Field-by-field merge; values in `self` win.
    pub fn or(self, fallback: LocationParams) -> LocationParams {
        LocationParams {
            latitude: self.latitude.or(fallback.latitude),
            longitude: self.longitude.or(fallback.longitude),
        }
    }
}

/// JSON bodies may carry numbers or strings.
#[derive(Debug, Default, Deserialize)]
struct JsonLocationParams {
    latitude: Option<JsonValue>,
    longitude: Option<JsonValue>,
}

impl From<JsonLocationParams> for LocationParams {
    fn from(params: JsonLocationParams) -> Self {
        Self {
            latitude: json_param(params.latitude),
            longitude: json_param(params.longitude),
        }
    }
}

fn json_param(value: Option<JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

/// Position parameters from the request body.
///
/// `application/json` bodies are decoded as JSON and must be well formed.
/// Any other body is read as a url-encoded form; a body that is not a form
/// yields no parameters.
#[derive(Debug, Default)]
pub struct LocationBody(pub LocationParams);

#[axum::async_trait]
impl<S> FromRequest<S> for LocationBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        if is_json(req.headers()) {
            let Json(params) = Json::<JsonLocationParams>::from_request(req, state)
                .await
                .map_err(|rejection| ServerError::InvalidBody(rejection.body_text()))?;
            return Ok(Self(params.into()));
        }

        Ok(Form::<LocationParams>::from_request(req, state)
            .await
            .map(|Form(params)| Self(params))
            .unwrap_or_default())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn body_params_take_precedence_over_query() {
        let body = LocationParams {
            latitude: Some("1".to_string()),
            longitude: None,
        };
        let query = LocationParams {
            latitude: Some("9".to_string()),
            longitude: Some("2".to_string()),
        };
        let merged = body.or(query);
        assert_eq!(merged.latitude.as_deref(), Some("1"));
        assert_eq!(merged.longitude.as_deref(), Some("2"));
    }

    #[test]
    fn json_numbers_and_strings_become_text() {
        let params: JsonLocationParams =
            serde_json::from_value(serde_json::json!({"latitude": 48.84, "longitude": "2.39"})).expect("decode");
        let params = LocationParams::from(params);
        assert_eq!(params.latitude.as_deref(), Some("48.84"));
        assert_eq!(params.longitude.as_deref(), Some("2.39"));

        let params: JsonLocationParams =
            serde_json::from_value(serde_json::json!({"latitude": null})).expect("decode");
        let params = LocationParams::from(params);
        assert!(params.latitude.is_none());
        assert!(params.longitude.is_none());
    }

    #[test]
    fn json_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
        assert!(!is_json(&headers));
    }
}
