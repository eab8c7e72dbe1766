//! Task Store
//!
//! Session object tying one gateway, one cache and one mutation coordinator
//! together. The UI creates it at start-up and keeps it for the lifetime of
//! the page; sign-out clears it rather than replacing it.

use std::rc::Rc;

use log::{info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::error::{ApiError, ApiResult};
use crate::gateway::TaskGateway;
use crate::list_view::ListSelection;
use crate::models::{Comment, Credentials, ProfileUpdate, Session, SignUpForm, TaskPage, User};
use crate::mutation::MutationCoordinator;
use crate::notice::{report_failure, Notice, Notifier, Origin};
use crate::validation::{validate_credentials, validate_profile, validate_sign_up};

// ========================
// Cached Values
// ========================

/// Everything the cache holds, one variant per key family.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Tasks(TaskPage),
    Comments(Vec<Comment>),
    User(User),
}

impl QueryData {
    pub fn into_tasks(self) -> ApiResult<TaskPage> {
        match self {
            QueryData::Tasks(page) => Ok(page),
            other => Err(mismatch("task page", &other)),
        }
    }

    pub fn into_comments(self) -> ApiResult<Vec<Comment>> {
        match self {
            QueryData::Comments(comments) => Ok(comments),
            other => Err(mismatch("comment list", &other)),
        }
    }

    pub fn into_comments_opt(self) -> Option<Vec<Comment>> {
        self.into_comments().ok()
    }

    pub fn into_user(self) -> ApiResult<User> {
        match self {
            QueryData::User(user) => Ok(user),
            other => Err(mismatch("user", &other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            QueryData::Tasks(_) => "task page",
            QueryData::Comments(_) => "comment list",
            QueryData::User(_) => "user",
        }
    }
}

fn mismatch(expected: &str, found: &QueryData) -> ApiError {
    ApiError::MalformedResponse(format!("expected {} in cache, found {}", expected, found.kind()))
}

/// Comments for one task through the cache. `force` skips a fresh entry.
pub(crate) async fn load_comments<G: TaskGateway + 'static>(
    cache: &QueryCache<QueryData>,
    gateway: &Rc<G>,
    task_id: u32,
    force: bool,
) -> ApiResult<Vec<Comment>> {
    let gateway = Rc::clone(gateway);
    let fetcher = move || async move { gateway.list_comments(task_id).await.map(QueryData::Comments) };
    let key = QueryKey::comments(task_id);
    let data = if force {
        cache.refetch(key, fetcher).await?
    } else {
        cache.fetch(key, fetcher).await?
    };
    data.into_comments()
}

// ========================
// Store
// ========================

pub struct TaskStore<G> {
    gateway: Rc<G>,
    cache: QueryCache<QueryData>,
    notifier: Rc<dyn Notifier>,
    mutations: MutationCoordinator<G>,
}

impl<G: TaskGateway + 'static> TaskStore<G> {
    pub fn new(gateway: G, notifier: Rc<dyn Notifier>) -> Self {
        let gateway = Rc::new(gateway);
        let cache = QueryCache::new();
        let mutations = MutationCoordinator::new(Rc::clone(&gateway), cache.clone(), Rc::clone(&notifier));
        Self {
            gateway,
            cache,
            notifier,
            mutations,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cache(&self) -> &QueryCache<QueryData> {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator<G> {
        &self.mutations
    }

    /// A read failed; only an expired session is escalated; the view
    /// renders every other error itself.
    fn read_failed<T>(&self, what: &str, err: ApiError) -> ApiResult<T> {
        warn!("loading {} failed: {}", what, err);
        if err.is_auth() {
            self.notifier.session_expired();
        }
        Err(err)
    }

    // ========================
    // Reads
    // ========================

    /// One page of the signed-in user's tasks.
    pub async fn tasks(&self, selection: ListSelection) -> ApiResult<TaskPage> {
        let gateway = Rc::clone(&self.gateway);
        let result = self
            .cache
            .fetch(QueryKey::tasks(selection), move || async move {
                gateway.list_tasks(selection).await.map(QueryData::Tasks)
            })
            .await
            .and_then(QueryData::into_tasks);
        result.or_else(|err| self.read_failed("tasks", err))
    }

    pub async fn comments(&self, task_id: u32) -> ApiResult<Vec<Comment>> {
        load_comments(&self.cache, &self.gateway, task_id, false)
            .await
            .or_else(|err| self.read_failed("comments", err))
    }

    pub async fn refresh_comments(&self, task_id: u32) -> ApiResult<Vec<Comment>> {
        load_comments(&self.cache, &self.gateway, task_id, true)
            .await
            .or_else(|err| self.read_failed("comments", err))
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        let gateway = Rc::clone(&self.gateway);
        let result = self
            .cache
            .fetch(QueryKey::user(), move || async move {
                gateway.current_user().await.map(QueryData::User)
            })
            .await
            .and_then(QueryData::into_user);
        result.or_else(|err| self.read_failed("profile", err))
    }

    // ========================
    // Session
    // ========================

    /// Start a new session. Whatever the previous session cached is dropped
    /// first. Wrong credentials come back as [`ApiError::Auth`] and are shown
    /// as a notice; they do not end any session.
    pub async fn sign_in(&self, credentials: &Credentials) -> ApiResult<Session> {
        validate_credentials(credentials)?;
        self.cache.clear();
        match self.gateway.sign_in(credentials).await {
            Ok(session) => {
                info!("signed in as {}", credentials.username);
                Ok(session)
            }
            Err(err) => {
                warn!("sign-in failed: {}", err);
                if !err.is_inline() {
                    self.notifier.notify(Notice::error("Sign in", err.user_message()));
                }
                Err(err)
            }
        }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> ApiResult<()> {
        validate_sign_up(form)?;
        match self.gateway.sign_up(form).await {
            Ok(()) => {
                self.notifier
                    .notify(Notice::success("Sign up", "Account created! You can sign in now."));
                Ok(())
            }
            Err(err) => {
                report_failure(self.notifier.as_ref(), "Sign up", &err, Origin::Form);
                Err(err)
            }
        }
    }

    pub async fn update_profile(&self, user_id: u32, update: &ProfileUpdate) -> ApiResult<()> {
        validate_profile(update)?;
        match self.gateway.update_profile(user_id, update).await {
            Ok(()) => {
                self.cache.invalidate(&QueryKey::user());
                self.notifier.notify(Notice::success("Profile", "Profile updated."));
                Ok(())
            }
            Err(err) => {
                report_failure(self.notifier.as_ref(), "Profile", &err, Origin::Form);
                Err(err)
            }
        }
    }

    pub fn sign_out(&self) {
        self.gateway.sign_out();
        self.cache.clear();
        info!("signed out");
    }
}
