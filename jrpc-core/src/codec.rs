//! Wire codec for JSON-RPC requests and responses
//!
//! Transports that move bytes (HTTP, pipes, sockets) share the same framing
//! rules, collected here:
//!
//! - a single call is encoded as a bare request object
//! - a batch is encoded as a JSON array of request objects, in request order
//! - a single reply is decoded as one response object
//! - a batch reply is decoded as a JSON array of response objects, in
//!   whatever order the peer chose
//!
//! Errors carry the method of the first request, which is the one a
//! transport reports failures against.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{codec, IdValue, Request};
//!
//! let requests = vec![
//!     Request::new("a", None, IdValue::from_integer(1)),
//!     Request::new("b", None, IdValue::from_integer(2)),
//! ];
//! let body = codec::encode_requests(&requests, true).unwrap();
//! assert!(body.starts_with(b"["));
//!
//! let reply = br#"[{"jsonrpc":"2.0","id":2,"result":true},{"jsonrpc":"2.0","id":1,"result":false}]"#;
//! let responses = codec::decode_responses(reply, true, "a").unwrap().unwrap();
//! assert_eq!(responses.len(), 2);
//! ```

use crate::error::{Error, Result};
use crate::types::{Request, Response};
use serde::Serialize;

/// Serialize a value as JSON, reporting failures against `method`
pub fn encode<T: Serialize + ?Sized>(method: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Marshal {
        method: method.to_string(),
        source: Box::new(e),
    })
}

/// Encode requests for the wire
///
/// With `batch` set, every request goes into one JSON array. Otherwise only
/// the first request is encoded, as a bare object.
///
/// # Errors
///
/// - `Error::InvalidRequest` if `requests` is empty
/// - `Error::Marshal` if serialization fails
pub fn encode_requests(requests: &[Request], batch: bool) -> Result<Vec<u8>> {
    let first = requests
        .first()
        .ok_or_else(|| Error::InvalidRequest("no request provided".to_string()))?;

    if batch {
        encode(&first.method, requests)
    } else {
        encode(&first.method, first)
    }
}

/// Decode a reply body
///
/// Returns `None` when the body is a JSON `null` (the peer produced no
/// response set) and an empty list when the body is empty, which is how a
/// peer answers a batch made only of notifications.
///
/// # Errors
///
/// Returns `Error::Unmarshal` if the body is not a response object (or, with
/// `batch` set, an array of response objects).
pub fn decode_responses(body: &[u8], batch: bool, method: &str) -> Result<Option<Vec<Response>>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Some(Vec::new()));
    }

    let unmarshal = |source| Error::Unmarshal {
        method: method.to_string(),
        source,
    };

    if batch {
        serde_json::from_slice::<Option<Vec<Response>>>(body).map_err(unmarshal)
    } else {
        serde_json::from_slice::<Option<Response>>(body)
            .map(|response| response.map(|r| vec![r]))
            .map_err(unmarshal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdValue;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_encode_single_request_as_object() {
        let requests = vec![
            Request::new("first", Some(json!({"k": 1})), IdValue::from_integer(1)),
            Request::new("second", None, IdValue::from_integer(2)),
        ];
        let body = encode_requests(&requests, false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert!(value.is_object());
        assert_eq!(value["method"], "first");
    }

    #[test]
    fn test_encode_batch_as_array_in_order() {
        let requests = vec![
            Request::new("first", None, IdValue::from_integer(1)),
            Request::notification("second", None),
        ];
        let body = encode_requests(&requests, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["method"], "first");
        assert_eq!(items[1]["method"], "second");
        assert!(items[1].get("id").is_none());
    }

    #[test]
    fn test_encode_empty_request_list() {
        let result = encode_requests(&[], true);
        match result {
            Err(Error::InvalidRequest(msg)) => assert_eq!(msg, "no request provided"),
            other => panic!("Expected InvalidRequest, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_encode_failure_is_marshal_error() {
        let mut unencodable = HashMap::new();
        unencodable.insert((1, 2), "tuple keys are not JSON object keys");

        match encode("test.method", &unencodable) {
            Err(Error::Marshal { method, .. }) => assert_eq!(method, "test.method"),
            other => panic!("Expected Marshal error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_decode_single_response() {
        let body = br#"{"jsonrpc":"2.0","id":1,"result":{"result":"success"}}"#;
        let responses = decode_responses(body, false, "m").unwrap().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].result, Some(json!({"result": "success"})));
    }

    #[test]
    fn test_decode_batch_preserves_peer_order() {
        let body = br#"[{"jsonrpc":"2.0","id":2,"result":2},{"jsonrpc":"2.0","id":1,"result":1}]"#;
        let responses = decode_responses(body, true, "m").unwrap().unwrap();
        assert_eq!(responses[0].id, IdValue::from_integer(2));
        assert_eq!(responses[1].id, IdValue::from_integer(1));
    }

    #[test]
    fn test_decode_null_body_is_no_response_set() {
        assert!(decode_responses(b"null", true, "m").unwrap().is_none());
        assert!(decode_responses(b"null", false, "m").unwrap().is_none());
    }

    #[test]
    fn test_decode_empty_body_is_empty_list() {
        let responses = decode_responses(b" \n", true, "m").unwrap().unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn test_decode_invalid_body() {
        match decode_responses(b"invalid json", false, "test.method") {
            Err(Error::Unmarshal { method, .. }) => assert_eq!(method, "test.method"),
            other => panic!("Expected Unmarshal error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_decode_batch_rejects_single_object() {
        let body = br#"{"jsonrpc":"2.0","id":1,"result":1}"#;
        assert!(matches!(
            decode_responses(body, true, "m"),
            Err(Error::Unmarshal { .. })
        ));
    }
}
