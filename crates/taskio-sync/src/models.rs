//! Client Models
//!
//! Data structures matching the REST API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Task as returned by `GET /tasks/my`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub completed: bool,
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment attached to exactly one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u32,
    pub content: String,
    pub task_id: u32,
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signed-in user profile (`GET /users/me`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token returned by `POST /sign-in`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

// ========================
// List Selection Types
// ========================

/// Ordering of the task list. Sent to the server as the `sort` hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "toDo")]
    PendingFirst,
    #[serde(rename = "completed")]
    CompletedFirst,
}

impl SortMode {
    pub fn as_param(self) -> &'static str {
        match self {
            SortMode::PendingFirst => "toDo",
            SortMode::CompletedFirst => "completed",
        }
    }

    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "toDo" => Some(SortMode::PendingFirst),
            "completed" => Some(SortMode::CompletedFirst),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::PendingFirst => "To do",
            SortMode::CompletedFirst => "Completed",
        }
    }
}

/// Allowed page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PerPage {
    #[default]
    Five,
    Fifteen,
    Thirty,
}

impl PerPage {
    pub const ALL: [PerPage; 3] = [PerPage::Five, PerPage::Fifteen, PerPage::Thirty];

    pub fn get(self) -> u32 {
        match self {
            PerPage::Five => 5,
            PerPage::Fifteen => 15,
            PerPage::Thirty => 30,
        }
    }
}

impl TryFrom<u32> for PerPage {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(PerPage::Five),
            15 => Ok(PerPage::Fifteen),
            30 => Ok(PerPage::Thirty),
            other => Err(format!("unsupported page size {}", other)),
        }
    }
}

impl From<PerPage> for u32 {
    fn from(value: PerPage) -> Self {
        value.get()
    }
}

// ========================
// Task Page
// ========================

/// One page of the task list plus the server's counters
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub page_index: u32,
    pub per_page: PerPage,
    pub total_count: u32,
    pub completed_total_count: u32,
}

impl TaskPage {
    pub fn empty(per_page: PerPage) -> Self {
        Self {
            items: Vec::new(),
            page_index: 0,
            per_page,
            total_count: 0,
            completed_total_count: 0,
        }
    }

    /// Number of completed tasks among `items`
    pub fn completed_on_page(&self) -> u32 {
        self.items.iter().filter(|t| t.completed).count() as u32
    }

    /// Check the page invariants:
    /// `items.len() <= per_page` and
    /// `total_count >= completed_total_count >= completed items on this page`.
    pub fn validate(&self) -> ApiResult<()> {
        if self.items.len() as u32 > self.per_page.get() {
            return Err(ApiError::MalformedResponse(format!(
                "page holds {} tasks but perPage is {}",
                self.items.len(),
                self.per_page.get()
            )));
        }
        if self.completed_total_count > self.total_count {
            return Err(ApiError::MalformedResponse(format!(
                "completedTotalCount {} exceeds totalCount {}",
                self.completed_total_count, self.total_count
            )));
        }
        if self.completed_on_page() > self.completed_total_count {
            return Err(ApiError::MalformedResponse(format!(
                "page has {} completed tasks but completedTotalCount is {}",
                self.completed_on_page(),
                self.completed_total_count
            )));
        }
        Ok(())
    }
}

/// Wire shape of `GET /tasks/my`
#[derive(Debug, Clone, Deserialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page_index: u32,
    pub per_page: u32,
    pub total_count: u32,
    pub completed_total_count: u32,
}

impl TryFrom<TasksResponse> for TaskPage {
    type Error = ApiError;

    fn try_from(response: TasksResponse) -> Result<Self, Self::Error> {
        let per_page = PerPage::try_from(response.meta.per_page).map_err(ApiError::MalformedResponse)?;
        let page = TaskPage {
            items: response.tasks,
            page_index: response.meta.page_index,
            per_page,
            total_count: response.meta.total_count,
            completed_total_count: response.meta.completed_total_count,
        };
        page.validate()?;
        Ok(page)
    }
}

/// Wire shape of `GET /comments/:taskId`
#[derive(Debug, Clone, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

// ========================
// Request Bodies
// ========================

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpForm {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Partial task update for `PUT /tasks/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub task_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u32, completed: bool) -> Task {
        Task {
            id,
            description: format!("Task {}", id),
            completed,
            owner_id: 1,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_task_decodes_user_id_as_owner() {
        let json = r#"{
            "id": 7,
            "description": "Write report",
            "completed": false,
            "userId": 3,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.owner_id, 3);
    }

    #[test]
    fn test_tasks_response_rejects_unknown_page_size() {
        let response = TasksResponse {
            tasks: vec![],
            meta: PageMeta { page_index: 0, per_page: 7, total_count: 0, completed_total_count: 0 },
        };
        assert!(matches!(TaskPage::try_from(response), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn test_page_validate_counters() {
        let mut page = TaskPage {
            items: vec![task(1, true), task(2, true)],
            page_index: 0,
            per_page: PerPage::Five,
            total_count: 4,
            completed_total_count: 1,
        };
        assert!(page.validate().is_err());

        page.completed_total_count = 2;
        assert!(page.validate().is_ok());

        page.total_count = 1;
        assert!(page.validate().is_err());
    }

    #[test]
    fn test_sort_mode_params() {
        assert_eq!(SortMode::PendingFirst.as_param(), "toDo");
        assert_eq!(SortMode::from_param("completed"), Some(SortMode::CompletedFirst));
        assert_eq!(SortMode::from_param("newest"), None);
    }

    #[test]
    fn test_task_patch_skips_missing_fields() {
        let patch = TaskPatch { completed: Some(true), description: None };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"completed":true}"#);
    }
}
