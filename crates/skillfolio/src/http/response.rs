//! HTTP response handling

use serde::de::DeserializeOwned;
use skillfolio_transport::HttpResponse;

use crate::error::{Error, Result};

/// Conversion of a raw [`HttpResponse`] into a typed result.
pub trait ResponseExt {
    /// Fail with the mapped error for a non-2xx status, otherwise hand the
    /// response back.
    fn error_for_status(self) -> Result<HttpResponse>;

    /// Parse a successful response, converting HTTP errors to client errors.
    fn parse_result<T: DeserializeOwned>(self) -> Result<T>;
}

impl ResponseExt for HttpResponse {
    fn error_for_status(self) -> Result<HttpResponse> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::from_response(self.status, &self.text()))
        }
    }

    fn parse_result<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.error_for_status()?;
        serde_json::from_slice(&response.body).map_err(Error::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success() {
        let response = HttpResponse::json_body(200, &json!({"value": 5}));
        let value: serde_json::Value = response.parse_result().unwrap();
        assert_eq!(value["value"], 5);
    }

    #[test]
    fn test_parse_error_status() {
        let response = HttpResponse::json_body(404, &json!({"message": "Skill not found"}));
        let err = response.parse_result::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "Skill not found"));
    }

    #[test]
    fn test_malformed_success_body() {
        let response = HttpResponse::new(200, Default::default(), b"<html>".to_vec());
        assert!(matches!(
            response.parse_result::<serde_json::Value>(),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_empty_success() {
        assert!(HttpResponse::empty(204).error_for_status().is_ok());
        assert!(HttpResponse::empty(500).error_for_status().is_err());
    }
}
