//! Task.io client state
//!
//! Layered architecture:
//! - gateway: typed calls to the REST API
//! - cache: keyed query cache with invalidation and de-duplication
//! - mutation: writes with optimistic updates and rollback
//! - list_view: pagination and sort state of the task list
//! - store: the session object the UI talks to

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod list_view;
pub mod models;
pub mod mutation;
pub mod notice;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use cache::{CacheEvent, EntryState, QueryCache, QueryKey, SubscriptionId};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, FieldError};
pub use gateway::{HttpGateway, TaskGateway};
pub use guard::{GuardTicket, StaleGuard};
pub use list_view::{ListSelection, ListViewModel, LoadTicket, ViewState};
pub use models::{Comment, Credentials, PerPage, ProfileUpdate, Session, SignUpForm, SortMode, Task, TaskPage, User};
pub use mutation::{MutationCoordinator, MutationState};
pub use notice::{Notice, NoticeLevel, Notifier};
pub use store::{QueryData, TaskStore};
