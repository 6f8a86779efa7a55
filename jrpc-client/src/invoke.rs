//! Typed invocation descriptors
//!
//! An [`Invoke`] binds a method name, an optional id, a typed request payload
//! and a typed response slot. The client borrows it mutably for the length of
//! one call: it reads the request out with [`MethodCaller::to_request`] and,
//! once the matching response arrives, writes the result back with
//! [`MethodCaller::decode_into`].
//!
//! The request payload is a [`Payload`]: either a value to send as `params`,
//! or [`Payload::Omitted`], in which case the `params` member is left out of
//! the wire request. An omitted payload also means "no result expected": the
//! response slot is left alone unless [`Invoke::expect_result`] opts back in.
//!
//! Notifications are made explicit with [`AsNotification`], which strips the
//! id so the client sends the call without one and never waits on a reply.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_client::{Invoke, MethodCaller};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct AddParams {
//!     a: i64,
//!     b: i64,
//! }
//!
//! #[derive(Deserialize)]
//! struct AddResult {
//!     sum: i64,
//! }
//!
//! let call: Invoke<AddParams, AddResult> = Invoke::new("add", AddParams { a: 5, b: 3 });
//! let request = call.to_request().unwrap();
//!
//! assert_eq!(request.method, "add");
//! assert!(request.id.is_absent());
//! assert!(request.params.is_some());
//! ```

use jrpc_core::{Error, IdValue, Request, Response, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Request payload of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Sent as the `params` member
    Present(T),
    /// No `params` member on the wire and, by default, no result decoded
    Omitted,
}

impl<T> Payload<T> {
    /// Whether the payload was left out
    pub fn is_omitted(&self) -> bool {
        matches!(self, Payload::Omitted)
    }

    /// Borrow the payload value, if any
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Payload::Present(value) => Some(value),
            Payload::Omitted => None,
        }
    }
}

impl<T> Default for Payload<T> {
    fn default() -> Self {
        Payload::Omitted
    }
}

impl<T> From<Option<T>> for Payload<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Payload::Present(value),
            None => Payload::Omitted,
        }
    }
}

/// A call the client can send and complete
///
/// Implemented by [`Invoke`] for any serializable payload and deserializable
/// result, and by [`AsNotification`]. Custom implementations are possible for
/// callers that build requests by hand.
pub trait MethodCaller: Send {
    /// Name of the remote method
    fn method(&self) -> &str;

    /// Build the wire request
    ///
    /// The id is left absent when none was set; the client fills it in.
    fn to_request(&self) -> Result<Request>;

    /// Take the result out of the response addressed to this call
    ///
    /// Only called for responses that carry no error object.
    fn decode_into(&mut self, response: &Response) -> Result<()>;

    /// Whether the call must go out without an id and without awaiting a reply
    fn is_notification(&self) -> bool {
        false
    }
}

impl<M: MethodCaller + ?Sized> MethodCaller for &mut M {
    fn method(&self) -> &str {
        (**self).method()
    }

    fn to_request(&self) -> Result<Request> {
        (**self).to_request()
    }

    fn decode_into(&mut self, response: &Response) -> Result<()> {
        (**self).decode_into(response)
    }

    fn is_notification(&self) -> bool {
        (**self).is_notification()
    }
}

/// Typed invocation of a remote method
///
/// `In` is the request payload type, `Out` the type the result decodes into.
/// A payload that serializes to `null`, such as `()`, is sent without a
/// `params` member.
///
/// A call that expects a result fails with `Error::EmptyResult` when the peer
/// answers `"result": null`, whatever `Out` is. For methods whose result is
/// ignored, build the call with [`Invoke::without_params`] (or
/// [`Payload::Omitted`]) so nothing is decoded, or send it through
/// [`AsNotification`] when no reply is wanted at all.
#[derive(Debug, Clone)]
pub struct Invoke<In, Out> {
    /// Call id; absent until the caller or the client assigns one
    pub id: IdValue,
    /// Remote method name
    pub name: String,
    /// Request payload
    pub request: Payload<In>,
    /// Response slot, filled in when the call succeeds
    pub response: Option<Out>,
    expect_result: bool,
}

impl<In, Out> Invoke<In, Out> {
    /// Invocation sending `params` as its payload
    pub fn new(name: impl Into<String>, params: In) -> Self {
        Self::with_payload(name, Payload::Present(params))
    }

    /// Invocation with no `params` member
    ///
    /// No result is decoded unless [`Invoke::expect_result`] is called.
    pub fn without_params(name: impl Into<String>) -> Self {
        Self::with_payload(name, Payload::Omitted)
    }

    /// Invocation with an explicit payload
    pub fn with_payload(name: impl Into<String>, request: Payload<In>) -> Self {
        let expect_result = !request.is_omitted();
        Self {
            id: IdValue::Absent,
            name: name.into(),
            request,
            response: None,
            expect_result,
        }
    }

    /// Use a caller-chosen id instead of a generated one
    pub fn with_id(mut self, id: impl Into<IdValue>) -> Self {
        self.id = id.into();
        self
    }

    /// Decode the result even though no payload is sent
    pub fn expect_result(mut self) -> Self {
        self.expect_result = true;
        self
    }

    /// Whether a result will be decoded into the response slot
    pub fn expects_result(&self) -> bool {
        self.expect_result
    }

    /// Borrow the decoded result
    pub fn result(&self) -> Option<&Out> {
        self.response.as_ref()
    }

    /// Take the decoded result
    pub fn into_result(self) -> Option<Out> {
        self.response
    }

    /// Send this invocation as a notification
    pub fn into_notification(self) -> AsNotification<Self> {
        AsNotification::new(self)
    }
}

impl<In, Out> MethodCaller for Invoke<In, Out>
where
    In: Serialize + Send,
    Out: DeserializeOwned + Send,
{
    fn method(&self) -> &str {
        &self.name
    }

    fn to_request(&self) -> Result<Request> {
        let params = match &self.request {
            Payload::Present(value) => {
                let params = serde_json::to_value(value).map_err(|e| Error::Marshal {
                    method: self.name.clone(),
                    source: Box::new(e),
                })?;
                // `params` must be structured or left out, never `null`
                Some(params).filter(|params| !params.is_null())
            }
            Payload::Omitted => None,
        };

        Ok(Request::new(self.name.clone(), params, self.id.clone()))
    }

    fn decode_into(&mut self, response: &Response) -> Result<()> {
        if !self.expect_result {
            return Ok(());
        }

        let raw = response
            .result
            .as_ref()
            .filter(|value| !value.is_null())
            .ok_or_else(|| Error::EmptyResult {
                method: self.name.clone(),
            })?;

        let value = Out::deserialize(raw).map_err(|source| Error::Decode {
            method: self.name.clone(),
            source,
        })?;

        self.response = Some(value);
        Ok(())
    }
}

/// Sends the wrapped call as a notification
///
/// The request goes out without an `id` member, the client assigns none, and
/// nothing is decoded afterwards.
///
/// ```rust
/// use jrpc_client::{AsNotification, Invoke, MethodCaller};
///
/// let call: Invoke<Vec<String>, ()> = Invoke::new("log", vec!["started".to_string()]).with_id(9);
/// let note = AsNotification::new(call);
///
/// assert!(note.is_notification());
/// assert!(note.to_request().unwrap().id.is_absent());
/// ```
#[derive(Debug, Clone)]
pub struct AsNotification<M>(pub M);

impl<M> AsNotification<M> {
    /// Wrap a call
    pub fn new(inner: M) -> Self {
        AsNotification(inner)
    }

    /// Unwrap the call
    pub fn into_inner(self) -> M {
        self.0
    }
}

impl<M: MethodCaller> MethodCaller for AsNotification<M> {
    fn method(&self) -> &str {
        self.0.method()
    }

    fn to_request(&self) -> Result<Request> {
        let mut request = self.0.to_request()?;
        request.id = IdValue::Absent;
        Ok(request)
    }

    fn decode_into(&mut self, _response: &Response) -> Result<()> {
        Ok(())
    }

    fn is_notification(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Serialize)]
    struct Params {
        value: i32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doubled {
        doubled: i32,
    }

    #[test]
    fn test_to_request_with_params() {
        let call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 21 });
        let request = call.to_request().unwrap();

        assert_eq!(request.method, "double");
        assert_eq!(request.params, Some(json!({"value": 21})));
        assert!(request.id.is_absent());
    }

    #[test]
    fn test_to_request_omitted_payload_has_no_params() {
        let call: Invoke<Params, ()> = Invoke::without_params("ping");
        let request = call.to_request().unwrap();
        assert!(request.params.is_none());

        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("params").is_none());
    }

    #[test]
    fn test_to_request_null_payload_has_no_params() {
        let call: Invoke<(), i64> = Invoke::new("ping", ());
        let request = call.to_request().unwrap();
        assert!(request.params.is_none());

        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("params").is_none());
        assert_eq!(wire["method"], "ping");

        let call: Invoke<Option<Params>, i64> = Invoke::new("ping", None);
        assert!(call.to_request().unwrap().params.is_none());
    }

    #[test]
    fn test_ignored_result_needs_no_decoding() {
        let null_result = Response::success(serde_json::Value::Null, IdValue::from_integer(1));

        let mut expecting: Invoke<Vec<String>, ()> = Invoke::new("log", vec!["x".to_string()]);
        assert!(matches!(
            expecting.decode_into(&null_result),
            Err(Error::EmptyResult { .. })
        ));

        let mut ignoring: Invoke<(), ()> = Invoke::without_params("log");
        ignoring.decode_into(&null_result).unwrap();

        let mut note = Invoke::<_, ()>::new("log", vec!["x".to_string()]).into_notification();
        note.decode_into(&null_result).unwrap();
    }

    #[test]
    fn test_to_request_keeps_caller_id() {
        let call: Invoke<Params, Doubled> =
            Invoke::new("double", Params { value: 1 }).with_id("req-1");
        let request = call.to_request().unwrap();
        assert_eq!(request.id, IdValue::from_string("req-1"));
    }

    #[test]
    fn test_to_request_marshal_failure() {
        let mut unencodable = HashMap::new();
        unencodable.insert(vec![1u8], 1);
        let call: Invoke<HashMap<Vec<u8>, i32>, ()> = Invoke::new("bad", unencodable);

        match call.to_request() {
            Err(Error::Marshal { method, .. }) => assert_eq!(method, "bad"),
            other => panic!("Expected Marshal error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_into_fills_slot() {
        let mut call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 21 });
        let response = Response::success(json!({"doubled": 42}), IdValue::from_integer(1));

        call.decode_into(&response).unwrap();
        assert_eq!(call.result(), Some(&Doubled { doubled: 42 }));
    }

    #[test]
    fn test_decode_into_skipped_without_payload() {
        let mut call: Invoke<Params, Doubled> = Invoke::without_params("ping");
        let response = Response::success(json!("not a Doubled"), IdValue::from_integer(1));

        call.decode_into(&response).unwrap();
        assert!(call.result().is_none());
    }

    #[test]
    fn test_expect_result_opts_into_decoding() {
        let mut call: Invoke<(), String> = Invoke::without_params("version").expect_result();
        assert!(call.expects_result());

        let response = Response::success(json!("1.0.0"), IdValue::from_integer(1));
        call.decode_into(&response).unwrap();
        assert_eq!(call.into_result(), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_decode_into_missing_result() {
        let mut call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 1 });
        let response: Response = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();

        match call.decode_into(&response) {
            Err(Error::EmptyResult { method }) => assert_eq!(method, "double"),
            other => panic!("Expected EmptyResult, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_into_null_result() {
        let mut call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 1 });
        let response = Response::success(serde_json::Value::Null, IdValue::from_integer(1));

        assert!(matches!(
            call.decode_into(&response),
            Err(Error::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_decode_into_type_mismatch() {
        let mut call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 1 });
        let response = Response::success(json!({"doubled": "forty-two"}), IdValue::from_integer(1));

        match call.decode_into(&response) {
            Err(Error::Decode { method, .. }) => assert_eq!(method, "double"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
        assert!(call.result().is_none());
    }

    #[test]
    fn test_notification_strips_id() {
        let call: Invoke<Params, Doubled> = Invoke::new("notify", Params { value: 1 }).with_id(5);
        let mut note = call.into_notification();

        assert!(note.is_notification());
        assert_eq!(note.method(), "notify");

        let request = note.to_request().unwrap();
        assert!(request.is_notification());
        assert_eq!(request.params, Some(json!({"value": 1})));

        let response = Response::success(json!({"doubled": 2}), IdValue::from_integer(5));
        note.decode_into(&response).unwrap();
        assert!(note.into_inner().result().is_none());
    }

    fn complete<M: MethodCaller>(mut caller: M, response: &Response) -> Result<String> {
        caller.decode_into(response)?;
        Ok(caller.method().to_string())
    }

    #[test]
    fn test_mutable_reference_delegates() {
        let mut call: Invoke<Params, Doubled> = Invoke::new("double", Params { value: 2 });
        let response = Response::success(json!({"doubled": 4}), IdValue::from_integer(1));

        let method = complete(&mut call, &response).unwrap();
        assert_eq!(method, "double");
        assert_eq!(call.result(), Some(&Doubled { doubled: 4 }));
    }

    #[test]
    fn test_payload_helpers() {
        let present: Payload<i32> = Some(3).into();
        let omitted: Payload<i32> = None.into();

        assert_eq!(present.as_present(), Some(&3));
        assert!(omitted.is_omitted());
        assert_eq!(Payload::<i32>::default(), Payload::Omitted);
    }
}
