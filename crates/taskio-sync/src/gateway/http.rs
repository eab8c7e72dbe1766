//! HTTP gateway backed by [`reqwest::Client`].
//!
//! On `wasm32` reqwest goes through the browser's fetch API, natively
//! through hyper. Responses are decoded into the typed models and checked
//! before they reach the cache.

use std::cell::RefCell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::TaskGateway;
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, ApiResult};
use crate::list_view::ListSelection;
use crate::models::{
    Comment, CommentsResponse, Credentials, NewComment, ProfileUpdate, Session, SignUpForm, TaskPage, TaskPatch,
    TasksResponse, User,
};

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: RefCell<Option<String>>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: RefCell::new(None),
        })
    }

    /// Resume a session restored from storage.
    pub fn with_token(self, token: Option<String>) -> Self {
        *self.token.borrow_mut() = token;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.borrow().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token.borrow().as_deref() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| {
            warn!("request failed before reaching the server: {}", e);
            ApiError::Network(e.to_string())
        })?;
        let status = response.status();
        debug!("{} -> {}", response.url().path(), status);
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        decode(&body)
    }

    async fn write<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> ApiResult<()> {
        self.send_empty(self.request(method, path).json(body)).await
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(ApiError::from)
}

/// Query string for `GET /tasks/my`. `page` is one-based.
fn tasks_query(selection: ListSelection) -> [(&'static str, String); 3] {
    [
        ("page", selection.page_param().to_string()),
        ("limit", selection.per_page.get().to_string()),
        ("sort", selection.sort.as_param().to_string()),
    ]
}

#[async_trait(?Send)]
impl TaskGateway for HttpGateway {
    async fn sign_in(&self, credentials: &Credentials) -> ApiResult<Session> {
        let session: Session = self
            .send_json(self.request(Method::POST, "/sign-in").json(credentials))
            .await?;
        *self.token.borrow_mut() = Some(session.token.clone());
        Ok(session)
    }

    async fn sign_up(&self, form: &SignUpForm) -> ApiResult<()> {
        self.write(Method::POST, "/users", form).await
    }

    fn sign_out(&self) {
        self.token.borrow_mut().take();
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.send_json(self.request(Method::GET, "/users/me")).await
    }

    async fn update_profile(&self, user_id: u32, update: &ProfileUpdate) -> ApiResult<()> {
        self.write(Method::PUT, &format!("/users/{}", user_id), update).await
    }

    async fn list_tasks(&self, selection: ListSelection) -> ApiResult<TaskPage> {
        let builder = self.request(Method::GET, "/tasks/my").query(&tasks_query(selection));
        let response: TasksResponse = self.send_json(builder).await?;
        TaskPage::try_from(response)
    }

    async fn create_task(&self, description: &str) -> ApiResult<()> {
        self.write(Method::POST, "/tasks", &serde_json::json!({ "description": description }))
            .await
    }

    async fn update_task(&self, id: u32, patch: &TaskPatch) -> ApiResult<()> {
        self.write(Method::PUT, &format!("/tasks/{}", id), patch).await
    }

    async fn delete_task(&self, id: u32) -> ApiResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/tasks/{}", id)))
            .await
    }

    async fn list_comments(&self, task_id: u32) -> ApiResult<Vec<Comment>> {
        let response: CommentsResponse = self
            .send_json(self.request(Method::GET, &format!("/comments/{}", task_id)))
            .await?;
        if let Some(stray) = response.comments.iter().find(|c| c.task_id != task_id) {
            return Err(ApiError::MalformedResponse(format!(
                "comment {} belongs to task {}, not {}",
                stray.id, stray.task_id, task_id
            )));
        }
        Ok(response.comments)
    }

    async fn create_comment(&self, comment: &NewComment) -> ApiResult<()> {
        self.write(Method::POST, "/comments", comment).await
    }

    async fn delete_comment(&self, comment_id: u32) -> ApiResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/comments/{}", comment_id)))
            .await
    }
}
