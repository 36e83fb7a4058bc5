//! Transport used by the listing provider to talk to the bucket endpoint
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use super::s3::ListingError;
use crate::config::{BucketConfig, MAX_KEYS};

/// One `ListObjectsV2` request against the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub prefix: String,
    pub continuation_token: Option<String>,
}

impl ListRequest {
    pub fn new(prefix: &str, continuation_token: Option<&str>) -> ListRequest {
        ListRequest {
            prefix: prefix.to_owned(),
            continuation_token: continuation_token.map(str::to_owned),
        }
    }

    /// Query string of the request, without the leading '?'
    ///
    /// The prefix is omitted for the bucket root. Both the prefix and the
    /// continuation token are percent-encoded.
    pub fn query_string(&self) -> String {
        let mut query = String::from("list-type=2");
        if !self.prefix.is_empty() {
            query.push_str(&format!("&prefix={}", urlencoding::encode(&self.prefix)));
        }
        query.push_str(&format!("&delimiter=%2F&max-keys={}", MAX_KEYS));
        if let Some(token) = &self.continuation_token {
            query.push_str(&format!(
                "&continuation-token={}",
                urlencoding::encode(token)
            ));
        }
        query
    }
}

/// Anything able to answer listing requests with a raw XML body
#[async_trait]
pub trait ListingTransport: Send + Sync {
    async fn list(&self, request: &ListRequest) -> Result<Bytes, ListingError>;
}

#[derive(Debug, Deserialize)]
struct S3ErrorBody {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// Maps a non-success response to a network error
///
/// * `status` - HTTP status of the response
/// * `body` - raw response body, parsed as an S3 error document when possible
pub fn error_from_response(status: reqwest::StatusCode, body: &[u8]) -> ListingError {
    let reason = status
        .canonical_reason()
        .unwrap_or("Unexpected response")
        .to_owned();
    let parsed: Option<S3ErrorBody> = std::str::from_utf8(body)
        .ok()
        .and_then(|text| quick_xml::de::from_str(text).ok());
    match parsed {
        Some(err) if !err.code.is_empty() => ListingError::Network {
            status: Some(status.as_u16()),
            code: Some(err.code),
            message: if err.message.is_empty() {
                reason
            } else {
                err.message
            },
        },
        _ => ListingError::Network {
            status: Some(status.as_u16()),
            code: None,
            message: reason,
        },
    }
}

/// Unauthenticated HTTP transport for public buckets
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &BucketConfig) -> HttpTransport {
        HttpTransport {
            endpoint: config.endpoint(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, request: &ListRequest) -> String {
        format!("{}/?{}", self.endpoint, request.query_string())
    }
}

#[async_trait]
impl ListingTransport for HttpTransport {
    async fn list(&self, request: &ListRequest) -> Result<Bytes, ListingError> {
        let url = self.url_for(request);
        debug!(%url, "sending listing request");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ListingError::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ListingError::transport)?;
        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{error_from_response, HttpTransport, ListRequest};
    use crate::{config::BucketConfig, providers::s3::ListingError};

    #[test]
    fn root_request_omits_prefix() {
        let request = ListRequest::new("", None);
        assert_eq!(
            request.query_string(),
            "list-type=2&delimiter=%2F&max-keys=1000"
        );
    }

    #[test]
    fn prefix_and_token_are_percent_encoded() {
        let request = ListRequest::new("my docs/a&b/", Some("1/abc+=="));
        assert_eq!(
            request.query_string(),
            "list-type=2&prefix=my%20docs%2Fa%26b%2F&delimiter=%2F&max-keys=1000\
             &continuation-token=1%2Fabc%2B%3D%3D"
        );
    }

    #[test]
    fn url_targets_virtual_hosted_bucket() {
        let config = BucketConfig::new("photos", "s3.eu-central-1.amazonaws.com");
        let transport = HttpTransport::new(&config);
        assert_eq!(
            transport.url_for(&ListRequest::new("2023/", None)),
            "https://photos.s3.eu-central-1.amazonaws.com/?list-type=2&prefix=2023%2F\
             &delimiter=%2F&max-keys=1000"
        );
    }

    #[test]
    fn s3_error_body_is_attached_to_network_error() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
            <Error>
                <Code>AccessDenied</Code>
                <Message>Access Denied</Message>
                <RequestId>4442587FB7D0A2F9</RequestId>
            </Error>"#;
        match error_from_response(StatusCode::FORBIDDEN, body) {
            ListingError::Network {
                status,
                code,
                message,
            } => {
                assert_eq!(status, Some(403));
                assert_eq!(code.as_deref(), Some("AccessDenied"));
                assert_eq!(message, "Access Denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unparseable_error_body_falls_back_to_reason() {
        match error_from_response(StatusCode::BAD_GATEWAY, b"<html>oops</html>") {
            ListingError::Network { status, code, message } => {
                assert_eq!(status, Some(502));
                assert_eq!(code, None);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
