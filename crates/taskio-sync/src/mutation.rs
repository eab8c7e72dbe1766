//! Mutation Coordinator
//!
//! Runs every write against the gateway exactly once and leaves the cache
//! consistent with the server:
//! - task writes invalidate every cached task page on success;
//! - registering a comment refetches that task's comment list;
//! - deleting a comment removes it from the cached list immediately and
//!   puts it back if the server refuses.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::error::{ApiError, ApiResult};
use crate::gateway::TaskGateway;
use crate::models::{Comment, NewComment, TaskPatch};
use crate::notice::{report_failure, Notice, Notifier, Origin};
use crate::store::{load_comments, QueryData};
use crate::validation::{validate_comment, validate_description};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(u64);

/// `Pending → Committed | RolledBack | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    /// Failed and the optimistic change was undone.
    RolledBack,
    /// Failed with nothing to undo.
    Failed,
}

/// One write in flight.
#[derive(Debug)]
pub struct Mutation {
    id: MutationId,
    label: &'static str,
    state: MutationState,
}

impl Mutation {
    fn new(id: MutationId, label: &'static str) -> Self {
        debug!("mutation #{} {} pending", id.0, label);
        Self {
            id,
            label,
            state: MutationState::Pending,
        }
    }

    pub fn id(&self) -> MutationId {
        self.id
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    fn settle(&mut self, state: MutationState) -> MutationState {
        debug_assert_eq!(self.state, MutationState::Pending, "mutation settled twice");
        self.state = state;
        info!("mutation #{} {} {:?}", self.id.0, self.label, state);
        state
    }
}

// ========================
// Optimistic Comment Removal
// ========================

/// Removes one comment from the cached list before the delete is sent and
/// remembers the list as it was, so a failure can undo exactly this removal.
pub struct OptimisticRemoval {
    mutation: Mutation,
    key: QueryKey,
    comment_id: u32,
    snapshot: Option<Vec<Comment>>,
    generation: u64,
}

impl OptimisticRemoval {
    /// Snapshot and splice, synchronously.
    pub fn begin(cache: &QueryCache<QueryData>, mutation: Mutation, task_id: u32, comment_id: u32) -> Self {
        let key = QueryKey::comments(task_id);
        let snapshot = cache.value(&key).and_then(QueryData::into_comments_opt);
        if snapshot.is_some() {
            cache.modify(&key, |data| {
                if let QueryData::Comments(list) = data {
                    list.retain(|c| c.id != comment_id);
                }
            });
        }
        Self {
            mutation,
            key,
            comment_id,
            snapshot,
            generation: cache.generation(),
        }
    }

    /// The server confirmed. A refetch that raced the delete may have
    /// brought the comment back, so splice once more.
    pub fn commit(mut self, cache: &QueryCache<QueryData>) -> MutationState {
        if cache.generation() == self.generation {
            let comment_id = self.comment_id;
            let present = cache
                .value(&self.key)
                .and_then(QueryData::into_comments_opt)
                .is_some_and(|list| list.iter().any(|c| c.id == comment_id));
            if present {
                cache.modify(&self.key, |data| {
                    if let QueryData::Comments(list) = data {
                        list.retain(|c| c.id != comment_id);
                    }
                });
            }
        }
        self.mutation.settle(MutationState::Committed)
    }

    /// Put this comment back where it was. Other mutations that settled in
    /// the meantime keep their effect.
    pub fn roll_back(mut self, cache: &QueryCache<QueryData>) -> MutationState {
        let Some(snapshot) = self.snapshot.take() else {
            return self.mutation.settle(MutationState::Failed);
        };
        if cache.generation() != self.generation {
            debug!("cache cleared since {} started, not rolling back", self.key);
            return self.mutation.settle(MutationState::Failed);
        }
        let comment_id = self.comment_id;
        let restored = cache.modify(&self.key, |data| {
            if let QueryData::Comments(current) = data {
                *current = restore_removed(&snapshot, current, comment_id);
            }
        });
        if restored {
            self.mutation.settle(MutationState::RolledBack)
        } else {
            self.mutation.settle(MutationState::Failed)
        }
    }
}

/// Rebuild the list from `snapshot` order: keep what is still present,
/// bring back `removed_id`, and append anything that arrived since.
pub fn restore_removed(snapshot: &[Comment], current: &[Comment], removed_id: u32) -> Vec<Comment> {
    let present: HashSet<u32> = current.iter().map(|c| c.id).collect();
    let known: HashSet<u32> = snapshot.iter().map(|c| c.id).collect();

    let mut restored: Vec<Comment> = snapshot
        .iter()
        .filter(|c| c.id == removed_id || present.contains(&c.id))
        .cloned()
        .collect();
    restored.extend(current.iter().filter(|c| !known.contains(&c.id)).cloned());
    restored
}

// ========================
// Coordinator
// ========================

pub struct MutationCoordinator<G> {
    gateway: Rc<G>,
    cache: QueryCache<QueryData>,
    notifier: Rc<dyn Notifier>,
    next_id: Cell<u64>,
}

impl<G: TaskGateway + 'static> MutationCoordinator<G> {
    pub fn new(gateway: Rc<G>, cache: QueryCache<QueryData>, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            gateway,
            cache,
            notifier,
            next_id: Cell::new(0),
        }
    }

    fn start(&self, label: &'static str) -> Mutation {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        Mutation::new(MutationId(id), label)
    }

    fn fail(&self, mut mutation: Mutation, title: &str, err: &ApiError, origin: Origin) {
        mutation.settle(MutationState::Failed);
        report_failure(self.notifier.as_ref(), title, err, origin);
    }

    /// Settle a task write: on success every cached page goes stale.
    fn settle_task_write(
        &self,
        mut mutation: Mutation,
        result: ApiResult<()>,
        origin: Origin,
        success: Option<&str>,
    ) -> ApiResult<()> {
        match result {
            Ok(()) => {
                self.cache.invalidate(&QueryKey::all_tasks());
                mutation.settle(MutationState::Committed);
                if let Some(message) = success {
                    self.notifier.notify(Notice::success("Tasks", message));
                }
                Ok(())
            }
            Err(err) => {
                self.fail(mutation, "Tasks", &err, origin);
                Err(err)
            }
        }
    }

    // ========================
    // Task Writes
    // ========================

    pub async fn create_task(&self, description: &str) -> ApiResult<()> {
        let description = validate_description(description)?;
        let mutation = self.start("create task");
        let result = self.gateway.create_task(&description).await;
        self.settle_task_write(mutation, result, Origin::Form, Some("Task added!"))
    }

    pub async fn complete_task(&self, id: u32, completed: bool) -> ApiResult<()> {
        let mutation = self.start("complete task");
        let patch = TaskPatch {
            completed: Some(completed),
            description: None,
        };
        let result = self.gateway.update_task(id, &patch).await;
        self.settle_task_write(mutation, result, Origin::Action, None)
    }

    pub async fn edit_task(&self, id: u32, description: &str) -> ApiResult<()> {
        let description = validate_description(description)?;
        let mutation = self.start("edit task");
        let patch = TaskPatch {
            completed: None,
            description: Some(description),
        };
        let result = self.gateway.update_task(id, &patch).await;
        self.settle_task_write(mutation, result, Origin::Form, Some("Task updated."))
    }

    pub async fn delete_task(&self, id: u32) -> ApiResult<()> {
        let mutation = self.start("delete task");
        let result = self.gateway.delete_task(id).await;
        if result.is_ok() {
            self.cache.remove(&QueryKey::comments(id));
        }
        self.settle_task_write(mutation, result, Origin::Action, Some("Task deleted."))
    }

    // ========================
    // Comment Writes
    // ========================

    pub async fn register_comment(&self, task_id: u32, content: &str) -> ApiResult<()> {
        let content = validate_comment(content)?;
        let mut mutation = self.start("register comment");
        let comment = NewComment { content, task_id };
        if let Err(err) = self.gateway.create_comment(&comment).await {
            self.fail(mutation, "Comments", &err, Origin::Form);
            return Err(err);
        }
        mutation.settle(MutationState::Committed);
        self.notifier.notify(Notice::success("Comments", "Comment added!"));

        if let Err(err) = load_comments(&self.cache, &self.gateway, task_id, true).await {
            report_failure(self.notifier.as_ref(), "Comments", &err, Origin::Action);
        }
        Ok(())
    }

    pub async fn delete_comment(&self, task_id: u32, comment_id: u32) -> ApiResult<()> {
        let removal = OptimisticRemoval::begin(&self.cache, self.start("delete comment"), task_id, comment_id);
        match self.gateway.delete_comment(comment_id).await {
            Ok(()) => {
                removal.commit(&self.cache);
                Ok(())
            }
            Err(err) => {
                let state = removal.roll_back(&self.cache);
                report_failure(self.notifier.as_ref(), "Comments", &err, Origin::Action);
                if state == MutationState::RolledBack {
                    if let Err(refetch) = load_comments(&self.cache, &self.gateway, task_id, true).await {
                        warn!("refetch after rollback of comment {} failed: {}", comment_id, refetch);
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn comment(id: u32, content: &str) -> Comment {
        Comment {
            id,
            content: content.to_string(),
            task_id: 1,
            owner_id: 1,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    fn ids(comments: &[Comment]) -> Vec<u32> {
        comments.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_restore_single_removal_is_exact_snapshot() {
        let snapshot = vec![comment(1, "x"), comment(2, "y")];
        let current = vec![comment(1, "x")];
        assert_eq!(restore_removed(&snapshot, &current, 2), snapshot);
    }

    #[test]
    fn test_restore_keeps_other_removals() {
        let snapshot = vec![comment(1, "a"), comment(2, "b"), comment(3, "c")];
        // 1 is ours, 2 was deleted by another mutation meanwhile
        let current = vec![comment(3, "c")];
        assert_eq!(ids(&restore_removed(&snapshot, &current, 1)), vec![1, 3]);
    }

    #[test]
    fn test_restore_appends_new_arrivals() {
        let snapshot = vec![comment(1, "a"), comment(2, "b")];
        let current = vec![comment(1, "a"), comment(4, "d")];
        assert_eq!(ids(&restore_removed(&snapshot, &current, 2)), vec![1, 2, 4]);
    }

    #[test]
    fn test_removal_state_machine() {
        let cache = QueryCache::new();
        let key = QueryKey::comments(1);
        let original = vec![comment(1, "x"), comment(2, "y")];
        cache.put(key.clone(), QueryData::Comments(original.clone()));

        let removal = OptimisticRemoval::begin(&cache, Mutation::new(MutationId(1), "test"), 1, 2);
        assert_eq!(cache.value(&key), Some(QueryData::Comments(vec![comment(1, "x")])));
        assert_eq!(removal.roll_back(&cache), MutationState::RolledBack);
        assert_eq!(cache.value(&key), Some(QueryData::Comments(original)));

        let removal = OptimisticRemoval::begin(&cache, Mutation::new(MutationId(2), "test"), 1, 1);
        assert_eq!(removal.commit(&cache), MutationState::Committed);
        assert_eq!(cache.value(&key), Some(QueryData::Comments(vec![comment(2, "y")])));
    }

    #[test]
    fn test_rollback_after_clear_is_noop() {
        let cache = QueryCache::new();
        let key = QueryKey::comments(1);
        cache.put(key.clone(), QueryData::Comments(vec![comment(1, "x")]));

        let removal = OptimisticRemoval::begin(&cache, Mutation::new(MutationId(1), "test"), 1, 1);
        cache.clear();
        assert_eq!(removal.roll_back(&cache), MutationState::Failed);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_removal_without_cached_list() {
        let cache = QueryCache::new();
        let removal = OptimisticRemoval::begin(&cache, Mutation::new(MutationId(1), "test"), 9, 1);
        assert_eq!(removal.roll_back(&cache), MutationState::Failed);
        assert!(cache.is_empty());
    }
}
