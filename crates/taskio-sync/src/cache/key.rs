//! Cache Keys
//!
//! Structured tuple keys such as `("tasks", 0, 5, "toDo")` or
//! `("comments", 42)`. Invalidation matches on leading segments.

use std::fmt;

use crate::list_view::ListSelection;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Name(&'static str),
    Int(i64),
    Text(String),
}

impl From<&'static str> for KeyPart {
    fn from(value: &'static str) -> Self {
        KeyPart::Name(value)
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        KeyPart::Int(i64::from(value))
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Name(name) => write!(f, "{:?}", name),
            KeyPart::Int(n) => write!(f, "{}", n),
            KeyPart::Text(text) => write!(f, "{:?}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub const TASKS: &'static str = "tasks";
    pub const COMMENTS: &'static str = "comments";
    pub const USER: &'static str = "user";

    pub fn root(name: &'static str) -> Self {
        Self(vec![KeyPart::Name(name)])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// `("tasks",)`: prefix of every task page
    pub fn all_tasks() -> Self {
        Self::root(Self::TASKS)
    }

    /// `("tasks", pageIndex, perPage, sort)`
    pub fn tasks(selection: ListSelection) -> Self {
        Self::all_tasks()
            .with(selection.page_index)
            .with(selection.per_page.get())
            .with(selection.sort.as_param())
    }

    /// `("comments", taskId)`
    pub fn comments(task_id: u32) -> Self {
        Self::root(Self::COMMENTS).with(task_id)
    }

    pub fn user() -> Self {
        Self::root(Self::USER)
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Segment-wise prefix test. Every key starts with itself.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}
