// API client module: a small blocking JSON-RPC client for the Saplo API.
// Every call is a single POST to the RPC endpoint; the access token from
// `auth.accessToken` rides along as a query parameter.
//
// The pipeline never talks to `ApiClient` directly. It goes through the
// `SaploApi` trait so the stages can be driven by a fake in tests.

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Credentials;
use crate::model::{Collection, CollectionId, Language, Prediction, TextId};

pub const DEFAULT_ENDPOINT: &str = "https://api.saplo.com/rpc/json";

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method}: transport error: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method}: server responded {status}: {body}")]
    Status {
        method: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The call went through but the service rejected it.
    #[error("{method}: ({code}) {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("{method}: unexpected response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method}: response carried neither result nor error")]
    MissingResult { method: &'static str },
}

impl ApiError {
    /// True when the service answered with an error object. Everything
    /// else means we could not talk to it properly.
    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Rpc { .. })
    }

    /// Service error code, if the service sent one.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Parameters of the `collection.predict` call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub collection_id: CollectionId,
    pub target_word: String,
    pub model_id: u64,
    pub wait: u64,
}

/// Remote operations the run depends on.
pub trait SaploApi {
    fn list_collections(&self) -> Result<Vec<Collection>, ApiError>;

    fn create_collection(&self, name: &str, language: Language) -> Result<Collection, ApiError>;

    /// Remove every text from the collection.
    fn reset_collection(&self, id: CollectionId) -> Result<(), ApiError>;

    fn create_text(&self, collection: CollectionId, body: &str) -> Result<TextId, ApiError>;

    fn predict(&self, request: &PredictRequest) -> Result<Vec<Prediction>, ApiError>;
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: u64,
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    /// `None` only when the key is absent; `"result": null` is a result.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(alias = "msg", default)]
    message: String,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<Collection>,
}

#[derive(Deserialize)]
struct CreatedText {
    text_id: TextId,
}

#[derive(Deserialize)]
struct PredictResult {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// Blocking Saplo client. Holds the HTTP client, the RPC endpoint and the
/// access token once authenticated.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    next_id: Arc<AtomicU64>,
}

impl ApiClient {
    /// Build an unauthenticated client for `endpoint`.
    ///
    /// The client-side request timeout is disabled: `collection.predict`
    /// blocks for as long as the server-side `wait` hint allows.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|source| ApiError::Transport {
                method: "client",
                source,
            })?;
        Ok(ApiClient {
            client,
            endpoint: endpoint.into(),
            token: None,
            next_id: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Build a client and exchange the credentials for an access token.
    pub fn connect(endpoint: impl Into<String>, credentials: &Credentials) -> Result<Self, ApiError> {
        let mut api = Self::new(endpoint)?;
        api.authenticate(credentials)?;
        Ok(api)
    }

    pub fn authenticate(&mut self, credentials: &Credentials) -> Result<(), ApiError> {
        let params = json!({
            "api_key": credentials.api_key(),
            "secret_key": credentials.secret_key(),
        });
        let token: AccessToken = self.call("auth.accessToken", params)?;
        self.set_token(&token.access_token);
        tracing::debug!("authenticated against {}", self.endpoint);
        Ok(())
    }

    /// Store an access token for subsequent calls.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Send one JSON-RPC request and decode its `result` into `T`.
    fn call<P, T>(&self, method: &'static str, params: P) -> Result<T, ApiError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let mut req = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.token {
            req = req.query(&[("access_token", token)]);
        }

        let res = req
            .send()
            .map_err(|source| ApiError::Transport { method, source })?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status {
                method,
                status,
                body,
            });
        }

        let text = res
            .text()
            .map_err(|source| ApiError::Transport { method, source })?;
        decode_response(method, &text)
    }
}

fn decode_response<T: DeserializeOwned>(method: &'static str, text: &str) -> Result<T, ApiError> {
    let response: RpcResponse =
        serde_json::from_str(text).map_err(|source| ApiError::Decode { method, source })?;
    if let Some(error) = response.error {
        return Err(ApiError::Rpc {
            method,
            code: error.code,
            message: error.message,
        });
    }
    let result = response.result.ok_or(ApiError::MissingResult { method })?;
    serde_json::from_value(result).map_err(|source| ApiError::Decode { method, source })
}

impl SaploApi for ApiClient {
    fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        let list: CollectionList = self.call("collection.list", json!({}))?;
        Ok(list.collections)
    }

    fn create_collection(&self, name: &str, language: Language) -> Result<Collection, ApiError> {
        self.call(
            "collection.create",
            json!({ "name": name, "language": language }),
        )
    }

    fn reset_collection(&self, id: CollectionId) -> Result<(), ApiError> {
        let _: Value = self.call("collection.reset", json!({ "collection_id": id }))?;
        Ok(())
    }

    fn create_text(&self, collection: CollectionId, body: &str) -> Result<TextId, ApiError> {
        let created: CreatedText = self.call(
            "text.create",
            json!({ "collection_id": collection, "body": body }),
        )?;
        Ok(created.text_id)
    }

    fn predict(&self, request: &PredictRequest) -> Result<Vec<Prediction>, ApiError> {
        let result: PredictResult = self.call("collection.predict", request)?;
        Ok(result.predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_result_payload() {
        let text = r#"{"jsonrpc":"2.0","id":0,"result":{"text_id":42,"collection_id":1}}"#;
        let created: CreatedText = decode_response("text.create", text).unwrap();
        assert_eq!(created.text_id, TextId(42));
    }

    #[test]
    fn decode_error_object_with_msg_field() {
        let text = r#"{"jsonrpc":"2.0","id":0,"error":{"code":1202,"msg":"Text too short"}}"#;
        let err = decode_response::<Value>("text.create", text).unwrap_err();
        assert!(err.is_application());
        assert_eq!(err.code(), Some(1202));
        assert_eq!(err.to_string(), "text.create: (1202) Text too short");
    }

    #[test]
    fn decode_error_wins_over_result() {
        let text = r#"{"result":{},"error":{"code":5,"message":"nope"}}"#;
        let err = decode_response::<Value>("collection.predict", text).unwrap_err();
        assert!(matches!(err, ApiError::Rpc { code: 5, .. }));
    }

    #[test]
    fn null_result_is_a_result() {
        let text = r#"{"jsonrpc":"2.0","id":0,"result":null}"#;
        let result = decode_response::<Value>("collection.reset", text).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn null_error_with_result_is_success() {
        let text = r#"{"result":{"text_id":3},"error":null}"#;
        let created: CreatedText = decode_response("text.create", text).unwrap();
        assert_eq!(created.text_id, TextId(3));
    }

    #[test]
    fn missing_result_is_not_application_error() {
        let err = decode_response::<Value>("collection.list", r#"{"id":1}"#).unwrap_err();
        assert!(matches!(err, ApiError::MissingResult { .. }));
        assert!(!err.is_application());
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = decode_response::<Value>("collection.list", "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(!err.is_application());
    }

    #[test]
    fn predict_request_serializes_wire_params() {
        let request = PredictRequest {
            collection_id: CollectionId(3),
            target_word: "good".into(),
            model_id: 3827,
            wait: 30,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "collection_id": 3, "target_word": "good", "model_id": 3827, "wait": 30 })
        );
    }
}
