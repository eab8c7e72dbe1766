//! UI Components
//!
//! Reusable Leptos components.

mod comments_dialog;
mod confirm_delete;
mod field_hint;
mod header;
mod list_controls;
mod new_task_form;
mod pagination;
mod profile_sheet;
mod sign_in;
mod sign_up;
mod task_list;
mod task_row;
mod toaster;

pub use comments_dialog::CommentsDialog;
pub use confirm_delete::ConfirmDelete;
pub use field_hint::FieldHint;
pub use header::Header;
pub use list_controls::ListControls;
pub use new_task_form::NewTaskForm;
pub use pagination::Pagination;
pub use profile_sheet::ProfileSheet;
pub use sign_in::SignIn;
pub use sign_up::SignUp;
pub use task_list::TaskList;
pub use task_row::TaskRow;
pub use toaster::Toaster;
