//! Store Scenario Tests
//!
//! Drives `TaskStore` against an in-memory stub server with scripted
//! failures and call counters.

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::cache::{EntryState, QueryKey};
    use crate::error::{ApiError, ApiResult};
    use crate::gateway::TaskGateway;
    use crate::list_view::{paginate, ListSelection, ListViewModel};
    use crate::models::{
        Comment, Credentials, NewComment, PerPage, ProfileUpdate, Session, SignUpForm, SortMode, Task, TaskPage,
        TaskPatch, User,
    };
    use crate::notice::{Notice, NoticeLevel, Notifier};
    use crate::store::{QueryData, TaskStore};

    // ========================
    // Stub Server
    // ========================

    #[derive(Default)]
    struct Server {
        tasks: Vec<Task>,
        comments: Vec<Comment>,
        next_id: u32,
    }

    #[derive(Default)]
    struct StubGateway {
        server: RefCell<Server>,
        calls: RefCell<HashMap<&'static str, u32>>,
        fail_next: RefCell<HashMap<&'static str, ApiError>>,
        failing_comments: RefCell<HashSet<u32>>,
        token: RefCell<Option<String>>,
    }

    fn stamp() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    fn task(id: u32, description: &str, completed: bool) -> Task {
        Task {
            id,
            description: description.to_string(),
            completed,
            owner_id: 1,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn comment(id: u32, task_id: u32, content: &str) -> Comment {
        Comment {
            id,
            content: content.to_string(),
            task_id,
            owner_id: 1,
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "Internal error".into(),
        }
    }

    impl StubGateway {
        fn with(tasks: Vec<Task>, comments: Vec<Comment>) -> Self {
            let stub = Self::default();
            {
                let mut server = stub.server.borrow_mut();
                server.tasks = tasks;
                server.comments = comments;
                server.next_id = 100;
            }
            stub
        }

        fn fail_next(&self, op: &'static str, err: ApiError) {
            self.fail_next.borrow_mut().insert(op, err);
        }

        fn calls(&self, op: &str) -> u32 {
            self.calls.borrow().get(op).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> u32 {
            self.calls.borrow().values().sum()
        }

        fn comment_ids(&self, task_id: u32) -> Vec<u32> {
            self.server
                .borrow()
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .map(|c| c.id)
                .collect()
        }

        /// Count the call, let other futures run, then apply any scripted failure.
        async fn enter(&self, op: &'static str) -> ApiResult<()> {
            *self.calls.borrow_mut().entry(op).or_insert(0) += 1;
            tokio::task::yield_now().await;
            match self.fail_next.borrow_mut().remove(op) {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn next_id(&self) -> u32 {
            let mut server = self.server.borrow_mut();
            server.next_id += 1;
            server.next_id
        }
    }

    #[async_trait(?Send)]
    impl TaskGateway for StubGateway {
        async fn sign_in(&self, credentials: &Credentials) -> ApiResult<Session> {
            self.enter("sign_in").await?;
            if credentials.password != "Secret1" {
                return Err(ApiError::Auth {
                    message: "Invalid credentials".into(),
                });
            }
            *self.token.borrow_mut() = Some("token".into());
            Ok(Session { token: "token".into() })
        }

        async fn sign_up(&self, _form: &SignUpForm) -> ApiResult<()> {
            self.enter("sign_up").await
        }

        fn sign_out(&self) {
            self.token.borrow_mut().take();
        }

        async fn current_user(&self) -> ApiResult<User> {
            self.enter("current_user").await?;
            Ok(User {
                id: 1,
                name: "Ada Lovelace".into(),
                username: "ada".into(),
                created_at: stamp(),
                updated_at: stamp(),
            })
        }

        async fn update_profile(&self, _user_id: u32, _update: &ProfileUpdate) -> ApiResult<()> {
            self.enter("update_profile").await
        }

        async fn list_tasks(&self, selection: ListSelection) -> ApiResult<TaskPage> {
            self.enter("list_tasks").await?;
            Ok(paginate(&self.server.borrow().tasks, selection))
        }

        async fn create_task(&self, description: &str) -> ApiResult<()> {
            self.enter("create_task").await?;
            let id = self.next_id();
            self.server.borrow_mut().tasks.push(task(id, description, false));
            Ok(())
        }

        async fn update_task(&self, id: u32, patch: &TaskPatch) -> ApiResult<()> {
            self.enter("update_task").await?;
            let mut server = self.server.borrow_mut();
            let Some(task) = server.tasks.iter_mut().find(|t| t.id == id) else {
                return Err(ApiError::from_status(404, r#"{"message":"Task not found"}"#));
            };
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
            if let Some(description) = &patch.description {
                task.description = description.clone();
            }
            Ok(())
        }

        async fn delete_task(&self, id: u32) -> ApiResult<()> {
            self.enter("delete_task").await?;
            let mut server = self.server.borrow_mut();
            server.tasks.retain(|t| t.id != id);
            server.comments.retain(|c| c.task_id != id);
            Ok(())
        }

        async fn list_comments(&self, task_id: u32) -> ApiResult<Vec<Comment>> {
            self.enter("list_comments").await?;
            Ok(self
                .server
                .borrow()
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .cloned()
                .collect())
        }

        async fn create_comment(&self, new: &NewComment) -> ApiResult<()> {
            self.enter("create_comment").await?;
            let id = self.next_id();
            self.server
                .borrow_mut()
                .comments
                .push(comment(id, new.task_id, &new.content));
            Ok(())
        }

        async fn delete_comment(&self, comment_id: u32) -> ApiResult<()> {
            self.enter("delete_comment").await?;
            if self.failing_comments.borrow().contains(&comment_id) {
                return Err(server_error());
            }
            self.server.borrow_mut().comments.retain(|c| c.id != comment_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: RefCell<Vec<Notice>>,
        expired: Cell<u32>,
    }

    impl RecordingNotifier {
        fn errors(&self) -> Vec<Notice> {
            self.notices
                .borrow()
                .iter()
                .filter(|n| n.level == NoticeLevel::Error)
                .cloned()
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.borrow_mut().push(notice);
        }

        fn session_expired(&self) {
            self.expired.set(self.expired.get() + 1);
        }
    }

    fn setup(stub: StubGateway) -> (TaskStore<StubGateway>, Rc<RecordingNotifier>) {
        let notifier = Rc::new(RecordingNotifier::default());
        let store = TaskStore::new(stub, notifier.clone());
        (store, notifier)
    }

    fn cached_comment_ids(store: &TaskStore<StubGateway>, task_id: u32) -> Option<Vec<u32>> {
        store
            .cache()
            .value(&QueryKey::comments(task_id))
            .and_then(QueryData::into_comments_opt)
            .map(|list| list.iter().map(|c| c.id).collect())
    }

    // ========================
    // Comment Deletion
    // ========================

    #[tokio::test]
    async fn test_failed_delete_comment_restores_list() {
        let original = vec![comment(1, 7, "x"), comment(2, 7, "y")];
        let (store, notifier) = setup(StubGateway::with(vec![task(7, "Walk", false)], original.clone()));
        store.comments(7).await.expect("seed comments");
        store.gateway().fail_next("delete_comment", server_error());
        // The refetch after rollback fails, so the restored list comes from the snapshot alone
        store.gateway().fail_next("list_comments", ApiError::Network("offline".into()));

        let delete = store.mutations().delete_comment(7, 2);
        futures::pin_mut!(delete);
        assert!(futures::poll!(delete.as_mut()).is_pending());
        // Removed before the server answers
        assert_eq!(cached_comment_ids(&store, 7), Some(vec![1]));

        assert!(delete.await.is_err());
        assert_eq!(store.cache().value(&QueryKey::comments(7)), Some(QueryData::Comments(original)));
        assert_eq!(store.gateway().calls("list_comments"), 2);
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Internal error");
    }

    #[tokio::test]
    async fn test_rejected_delete_comment_with_field_errors_is_announced() {
        let (store, notifier) = setup(StubGateway::with(vec![task(7, "Walk", false)], vec![comment(1, 7, "x")]));
        store.comments(7).await.expect("seed comments");
        store.gateway().fail_next(
            "delete_comment",
            ApiError::from_status(422, r#"{"message":"Cannot delete","errors":{"commentId":["locked"]}}"#),
        );

        let err = store.mutations().delete_comment(7, 1).await.unwrap_err();

        assert!(err.is_inline());
        assert_eq!(cached_comment_ids(&store, 7), Some(vec![1]));
        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Cannot delete");
        assert_eq!(notifier.expired.get(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_comment_deletes_do_not_cross_talk() {
        let comments = vec![comment(1, 7, "a"), comment(2, 7, "b"), comment(3, 7, "c")];
        let (store, notifier) = setup(StubGateway::with(vec![task(7, "Walk", false)], comments));
        store.comments(7).await.expect("seed comments");
        store.gateway().failing_comments.borrow_mut().insert(1);
        // The refetch after rollback fails too, so only the splice logic decides
        store.gateway().fail_next("list_comments", ApiError::Network("offline".into()));

        let (first, second) = futures::join!(
            store.mutations().delete_comment(7, 1),
            store.mutations().delete_comment(7, 2),
        );

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(cached_comment_ids(&store, 7), Some(vec![1, 3]));
        assert_eq!(store.gateway().comment_ids(7), vec![1, 3]);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_delete_comment_stays_removed() {
        let comments = vec![comment(1, 7, "a"), comment(2, 7, "b")];
        let (store, notifier) = setup(StubGateway::with(vec![], comments));
        store.comments(7).await.expect("seed comments");

        store.mutations().delete_comment(7, 1).await.expect("delete");

        assert_eq!(cached_comment_ids(&store, 7), Some(vec![2]));
        assert_eq!(store.gateway().calls("list_comments"), 1);
        assert!(notifier.errors().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_after_sign_out_is_noop() {
        let (store, notifier) = setup(StubGateway::with(vec![], vec![comment(1, 7, "a")]));
        store.comments(7).await.expect("seed comments");
        store.gateway().fail_next("delete_comment", server_error());

        let (result, ()) = futures::join!(store.mutations().delete_comment(7, 1), async {
            store.sign_out();
        });

        assert!(result.is_err());
        assert!(store.cache().is_empty());
        // No refetch was issued for the old session
        assert_eq!(store.gateway().calls("list_comments"), 1);
        assert_eq!(notifier.errors().len(), 1);
    }

    // ========================
    // Comment Registration
    // ========================

    #[tokio::test]
    async fn test_register_comment_refetches_list() {
        let (store, notifier) = setup(StubGateway::with(vec![task(7, "Walk", false)], vec![comment(1, 7, "a")]));
        store.comments(7).await.expect("seed comments");

        store
            .mutations()
            .register_comment(7, "  Remember the leash  ")
            .await
            .expect("register");

        let cached = store
            .cache()
            .value(&QueryKey::comments(7))
            .and_then(QueryData::into_comments_opt)
            .expect("comments cached");
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[1].content, "Remember the leash");
        assert_eq!(store.gateway().calls("list_comments"), 2);
        assert_eq!(notifier.notices.borrow().last().map(|n| n.message.as_str()), Some("Comment added!"));
    }

    #[tokio::test]
    async fn test_invalid_comment_never_reaches_network() {
        let (store, notifier) = setup(StubGateway::default());

        let err = store.mutations().register_comment(7, "   ").await.unwrap_err();

        assert_eq!(err.field_message("content"), Some("This field is required."));
        assert_eq!(store.gateway().total_calls(), 0);
        assert!(notifier.notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_simultaneous_comment_reads_share_one_fetch() {
        let (store, _) = setup(StubGateway::with(vec![], vec![comment(1, 42, "a")]));

        let (a, b) = futures::join!(store.comments(42), store.comments(42));

        assert_eq!(a.expect("first"), b.expect("second"));
        assert_eq!(store.gateway().calls("list_comments"), 1);
    }

    // ========================
    // Task Writes
    // ========================

    #[tokio::test]
    async fn test_complete_task_invalidates_every_task_page() {
        let tasks = (1..=8).map(|id| task(id, "chore", false)).collect();
        let (store, _) = setup(StubGateway::with(tasks, vec![]));
        let first = ListSelection::default();
        let other = ListSelection::new(1, PerPage::Five, SortMode::CompletedFirst);
        store.tasks(first).await.expect("first page");
        store.tasks(other).await.expect("second page");

        store.mutations().complete_task(3, true).await.expect("complete");

        assert_eq!(store.cache().state(&QueryKey::tasks(first)), Some(EntryState::Stale));
        assert_eq!(store.cache().state(&QueryKey::tasks(other)), Some(EntryState::Stale));

        let page = store.tasks(other).await.expect("reload");
        assert_eq!(page.completed_total_count, 1);
        assert_eq!(store.gateway().calls("list_tasks"), 3);
    }

    #[tokio::test]
    async fn test_rejected_complete_task_with_field_errors_is_announced() {
        let (store, notifier) = setup(StubGateway::with(vec![task(3, "chore", false)], vec![]));
        store.tasks(ListSelection::default()).await.expect("seed");
        store.gateway().fail_next(
            "update_task",
            ApiError::from_status(400, r#"{"message":"Invalid","errors":{"completed":["must be boolean"]}}"#),
        );

        assert!(store.mutations().complete_task(3, true).await.is_err());

        let errors = notifier.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid");
        assert_eq!(notifier.expired.get(), 0);
        assert_eq!(
            store.cache().state(&QueryKey::tasks(ListSelection::default())),
            Some(EntryState::Fresh)
        );
    }

    #[tokio::test]
    async fn test_server_field_errors_on_edit_stay_on_form() {
        let (store, notifier) = setup(StubGateway::with(vec![task(3, "chore", false)], vec![]));
        store.gateway().fail_next(
            "update_task",
            ApiError::from_status(422, r#"{"message":"Invalid","errors":{"description":["taken"]}}"#),
        );

        let err = store.mutations().edit_task(3, "laundry").await.unwrap_err();

        assert_eq!(err.field_message("description"), Some("taken"));
        assert!(notifier.notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_validation_error_stays_inline() {
        let (store, notifier) = setup(StubGateway::default());

        let err = store.mutations().create_task(&"x".repeat(256)).await.unwrap_err();

        assert!(err.is_inline());
        assert!(err.field_message("description").is_some());
        assert_eq!(store.gateway().total_calls(), 0);
        assert!(notifier.notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_server_error_emits_one_notice() {
        let (store, notifier) = setup(StubGateway::default());
        store.tasks(ListSelection::default()).await.expect("seed");
        store.gateway().fail_next("create_task", server_error());

        assert!(store.mutations().create_task("Buy milk").await.is_err());

        assert_eq!(notifier.errors().len(), 1);
        // Nothing was invalidated
        assert_eq!(
            store.cache().state(&QueryKey::tasks(ListSelection::default())),
            Some(EntryState::Fresh)
        );
    }

    #[tokio::test]
    async fn test_create_task_success_notice() {
        let (store, notifier) = setup(StubGateway::default());

        store.mutations().create_task("  Buy milk ").await.expect("create");

        let page = store.tasks(ListSelection::default()).await.expect("page");
        assert_eq!(page.items[0].description, "Buy milk");
        assert_eq!(*notifier.notices.borrow(), vec![Notice::success("Tasks", "Task added!")]);
    }

    #[tokio::test]
    async fn test_delete_task_drops_its_comments() {
        let (store, _) = setup(StubGateway::with(vec![task(7, "Walk", false)], vec![comment(1, 7, "a")]));
        store.comments(7).await.expect("seed comments");

        store.mutations().delete_task(7).await.expect("delete");

        assert!(store.cache().get(&QueryKey::comments(7)).is_none());
        let page = store.tasks(ListSelection::default()).await.expect("page");
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_edit_missing_task_surfaces_server_message() {
        let (store, notifier) = setup(StubGateway::default());

        let err = store.mutations().edit_task(99, "Renamed").await.unwrap_err();

        // A 404 has no field messages, so it becomes a notice
        assert!(!err.is_inline());
        assert_eq!(notifier.errors()[0].message, "Task not found");
    }

    // ========================
    // List View
    // ========================

    #[tokio::test]
    async fn test_list_view_loads_through_store() {
        let tasks = vec![task(1, "a", true), task(2, "b", false), task(3, "c", true)];
        let (store, _) = setup(StubGateway::with(tasks, vec![]));
        let mut view = ListViewModel::default();

        let ticket = view.begin_load();
        let result = store.tasks(ticket.selection).await;
        assert!(view.finish_page(ticket, result));

        let ids: Vec<u32> = view.page().expect("ready").items.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(view.page_count(), 1);
        assert!(!view.has_next());
    }

    // ========================
    // Session
    // ========================

    #[tokio::test]
    async fn test_auth_error_on_read_expires_session() {
        let (store, notifier) = setup(StubGateway::default());
        store.gateway().fail_next(
            "list_tasks",
            ApiError::Auth {
                message: "Token expired".into(),
            },
        );

        assert!(store.tasks(ListSelection::default()).await.is_err());

        assert_eq!(notifier.expired.get(), 1);
        assert!(notifier.notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_is_a_notice_not_a_sign_out() {
        let (store, notifier) = setup(StubGateway::default());
        let credentials = Credentials {
            username: "ada".into(),
            password: "nope".into(),
        };

        let err = store.sign_in(&credentials).await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(notifier.expired.get(), 0);
        assert_eq!(notifier.errors()[0].message, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_sign_in_starts_with_empty_cache() {
        let (store, _) = setup(StubGateway::default());
        store.current_user().await.expect("user");
        assert!(!store.cache().is_empty());

        let session = store
            .sign_in(&Credentials {
                username: "ada".into(),
                password: "Secret1".into(),
            })
            .await
            .expect("sign in");

        assert_eq!(session.token, "token");
        assert!(store.cache().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache_and_token() {
        let (store, _) = setup(StubGateway::with(vec![task(1, "a", false)], vec![]));
        *store.gateway().token.borrow_mut() = Some("token".into());
        store.tasks(ListSelection::default()).await.expect("tasks");
        store.current_user().await.expect("user");

        store.sign_out();

        assert!(store.cache().is_empty());
        assert!(store.gateway().token.borrow().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_sending() {
        let (store, _) = setup(StubGateway::default());
        let form = SignUpForm {
            name: "Ada".into(),
            username: "ada1".into(),
            password: "weak".into(),
        };

        let err = store.sign_up(&form).await.unwrap_err();

        assert!(err.field_message("username").is_some());
        assert!(err.field_message("password").is_some());
        assert_eq!(store.gateway().calls("sign_up"), 0);
    }

    #[tokio::test]
    async fn test_update_profile_invalidates_user() {
        let (store, notifier) = setup(StubGateway::default());
        let user = store.current_user().await.expect("user");

        let update = ProfileUpdate {
            name: "Ada King".into(),
            ..Default::default()
        };
        store.update_profile(user.id, &update).await.expect("update");

        assert_eq!(store.cache().state(&QueryKey::user()), Some(EntryState::Stale));
        store.current_user().await.expect("reload");
        assert_eq!(store.gateway().calls("current_user"), 2);
        assert_eq!(notifier.notices.borrow().len(), 1);
    }
}
