//! HTTP client for the todo API.
//!
//! Every method returns the decoded payload on success. Any non-2xx
//! response becomes [`ClientError::Api`] carrying the status and the
//! server's `error` message. No retries or timeouts are applied beyond
//! whatever the supplied [`reqwest::Client`] does.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::domain::family_member::{FamilyMemberPatch, MemberId, NewFamilyMember};
use crate::domain::todo::{NewTodo, TodoId, TodoPatch};
use crate::http::types::{
    DeleteFamilyMemberResponse, DeleteTodoResponse, ErrorBody, FamilyMemberResponse, FamilyMembersResponse, TodoResponse,
    TodosResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Api { status: StatusCode, message: String, details: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
        }
    }

    /// Server message for API errors, the transport error otherwise.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Transport(e) => e.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Operations the UI needs from the backend.
#[async_trait]
pub trait FamilyTodoApi: Send + Sync {
    async fn list_todos(&self) -> ClientResult<TodosResponse>;
    async fn create_todo(&self, input: &NewTodo) -> ClientResult<TodoResponse>;
    async fn update_todo(&self, id: &TodoId, patch: &TodoPatch) -> ClientResult<TodoResponse>;
    async fn delete_todo(&self, id: &TodoId) -> ClientResult<DeleteTodoResponse>;
    async fn list_family_members(&self) -> ClientResult<FamilyMembersResponse>;
    async fn create_family_member(&self, input: &NewFamilyMember) -> ClientResult<FamilyMemberResponse>;
    async fn update_family_member(&self, id: &MemberId, patch: &FamilyMemberPatch) -> ClientResult<FamilyMemberResponse>;
    async fn delete_family_member(&self, id: &MemberId) -> ClientResult<DeleteFamilyMemberResponse>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self { Self::with_http(Client::new(), base_url) }

    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (message, details) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error, body.details),
                Err(_) => (format!("HTTP {}", status.as_u16()), None),
            };
            tracing::debug!(%status, %message, "api request failed");
            return Err(ClientError::Api { status, message, details });
        }
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, method: Method, path: &str, body: &B) -> ClientResult<T> {
        self.send(self.request(method, path).json(body)).await
    }
}

#[async_trait]
impl FamilyTodoApi for ApiClient {
    async fn list_todos(&self) -> ClientResult<TodosResponse> { self.send(self.request(Method::GET, "/todos")).await }

    async fn create_todo(&self, input: &NewTodo) -> ClientResult<TodoResponse> { self.send_json(Method::POST, "/todos", input).await }

    async fn update_todo(&self, id: &TodoId, patch: &TodoPatch) -> ClientResult<TodoResponse> {
        self.send_json(Method::PUT, &format!("/todos/{}", urlencoding::encode(&id.0)), patch).await
    }

    async fn delete_todo(&self, id: &TodoId) -> ClientResult<DeleteTodoResponse> {
        self.send(self.request(Method::DELETE, &format!("/todos/{}", urlencoding::encode(&id.0)))).await
    }

    async fn list_family_members(&self) -> ClientResult<FamilyMembersResponse> {
        self.send(self.request(Method::GET, "/family-members")).await
    }

    async fn create_family_member(&self, input: &NewFamilyMember) -> ClientResult<FamilyMemberResponse> {
        self.send_json(Method::POST, "/family-members", input).await
    }

    async fn update_family_member(&self, id: &MemberId, patch: &FamilyMemberPatch) -> ClientResult<FamilyMemberResponse> {
        self.send_json(Method::PUT, &format!("/family-members/{}", urlencoding::encode(&id.0)), patch).await
    }

    async fn delete_family_member(&self, id: &MemberId) -> ClientResult<DeleteFamilyMemberResponse> {
        self.send(self.request(Method::DELETE, "/family-members").query(&[("id", id.0.as_str())])).await
    }
}
