//! Remote Gateway
//!
//! Defines the abstract interface to the REST API. [`HttpGateway`] talks to
//! the real server; tests drive the store with a scripted stub.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::list_view::ListSelection;
use crate::models::{Comment, Credentials, NewComment, ProfileUpdate, Session, SignUpForm, TaskPage, TaskPatch, User};

/// One method per REST operation. Every call is a single attempt.
///
/// `?Send`: the client runs on the browser's single thread.
#[async_trait(?Send)]
pub trait TaskGateway {
    /// `POST /sign-in`; a successful sign-in also authorizes later calls.
    async fn sign_in(&self, credentials: &Credentials) -> ApiResult<Session>;

    /// `POST /users`
    async fn sign_up(&self, form: &SignUpForm) -> ApiResult<()>;

    /// Forget the session token.
    fn sign_out(&self);

    /// `GET /users/me`
    async fn current_user(&self) -> ApiResult<User>;

    /// `PUT /users/:id`
    async fn update_profile(&self, user_id: u32, update: &ProfileUpdate) -> ApiResult<()>;

    /// `GET /tasks/my?page&limit&sort`
    async fn list_tasks(&self, selection: ListSelection) -> ApiResult<TaskPage>;

    /// `POST /tasks`
    async fn create_task(&self, description: &str) -> ApiResult<()>;

    /// `PUT /tasks/:id`
    async fn update_task(&self, id: u32, patch: &TaskPatch) -> ApiResult<()>;

    /// `DELETE /tasks/:id`
    async fn delete_task(&self, id: u32) -> ApiResult<()>;

    /// `GET /comments/:taskId`
    async fn list_comments(&self, task_id: u32) -> ApiResult<Vec<Comment>>;

    /// `POST /comments`
    async fn create_comment(&self, comment: &NewComment) -> ApiResult<()>;

    /// `DELETE /comments/:commentId`
    async fn delete_comment(&self, comment_id: u32) -> ApiResult<()>;
}
