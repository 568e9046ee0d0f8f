use std::{
    fmt::Debug as FmtDebug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use tokio::sync::watch;
use tracing::instrument;

use crate::{
    auth::{self, Session, User},
    error::{Error, Result},
    guard::{self, RouteDecision},
    session::store::SessionStore,
};

/// Point-in-time view of the session, the input to route guarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The current user, if any.
    pub user: Option<User>,
    /// True until the boot-time [`restore`](SessionContext::restore) has run.
    pub initializing: bool,
}

impl SessionSnapshot {
    /// Whether a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Holder of the current user for the whole process.
///
/// The context is created by [`Client`](crate::Client) with an explicit
/// lifecycle: it starts initializing, [`restore`](SessionContext::restore)
/// runs exactly once at boot, and [`teardown`](SessionContext::teardown) ends
/// it. Clones are cheap handles onto the same shared state, and every handle
/// fails with [`Error::ContextMisuse`] once the context is torn down.
///
/// Credential exchanges that are still in flight when a newer login,
/// registration or logout starts are discarded instead of committed, so the
/// current user always reflects the most recently issued operation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    auth: auth::Client,
    store: Arc<dyn SessionStore>,
    state: Mutex<State>,
    /// Sequence number of the most recently started mutation. An in-flight
    /// exchange only commits if no newer mutation claimed a higher number.
    latest_op: AtomicU64,
    tx: watch::Sender<SessionSnapshot>,
}

#[derive(Debug)]
struct State {
    user: Option<User>,
    initializing: bool,
    torn_down: bool,
}

impl SessionContext {
    pub(crate) fn new(auth: auth::Client, store: Arc<dyn SessionStore>) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot {
            user: None,
            initializing: true,
        });
        Self {
            shared: Arc::new(Shared {
                auth,
                store,
                state: Mutex::new(State {
                    user: None,
                    initializing: true,
                    torn_down: false,
                }),
                latest_op: AtomicU64::new(0),
                tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.lock().torn_down {
            return Err(Error::ContextMisuse);
        }
        Ok(())
    }

    fn claim(&self) -> u64 {
        self.shared.latest_op.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, state: &State) {
        self.shared.tx.send_replace(SessionSnapshot {
            user: state.user.clone(),
            initializing: state.initializing,
        });
    }

    fn commit(&self, op: u64, session: Session) -> Result<User> {
        let mut state = self.lock();
        if state.torn_down {
            return Err(Error::ContextMisuse);
        }
        if self.shared.latest_op.load(Ordering::SeqCst) != op {
            return Err(Error::Superseded);
        }
        // Persist first: a current user without a stored token would break
        // the pair invariant.
        self.shared.store.save(&session)?;
        state.user = Some(session.user.clone());
        state.initializing = false;
        self.publish(&state);
        Ok(session.user)
    }

    /// Runs the boot-time restore: reads the store once and, if a valid
    /// session is found, makes its user current. The initializing flag is
    /// cleared whether or not a session was found, and later calls return
    /// the current user without touching the store again.
    #[instrument(skip(self))]
    pub fn restore(&self) -> Result<Option<User>> {
        let mut state = self.lock();
        if state.torn_down {
            return Err(Error::ContextMisuse);
        }
        if !state.initializing {
            return Ok(state.user.clone());
        }
        if let Some(session) = self.shared.store.load() {
            state.user = Some(session.user);
        }
        state.initializing = false;
        self.publish(&state);
        Ok(state.user.clone())
    }

    /// Logs in and makes the resolved user current.
    ///
    /// On success the session pair is persisted before the call returns. On
    /// [`Error::AuthRejected`] neither the current user nor the persisted
    /// session changes. If a newer login, registration or logout starts while
    /// the exchange is in flight, the stale result is discarded and the call
    /// fails with [`Error::Superseded`].
    #[instrument(skip(self, password))]
    pub async fn login<E, P>(&self, email: E, password: P) -> Result<User>
    where
        E: Into<String> + FmtDebug,
        P: Into<String>,
    {
        self.ensure_active()?;
        let op = self.claim();
        let session = self.shared.auth.login(email, password).await?;
        self.commit(op, session)
    }

    /// Registers a new account and makes the resolved user current.
    ///
    /// Failure behavior matches [`SessionContext::login`].
    #[instrument(skip(self, password))]
    pub async fn register<N, E, P>(&self, name: N, email: E, password: P) -> Result<User>
    where
        N: Into<String> + FmtDebug,
        E: Into<String> + FmtDebug,
        P: Into<String>,
    {
        self.ensure_active()?;
        let op = self.claim();
        let session = self.shared.auth.register(name, email, password).await?;
        self.commit(op, session)
    }

    /// Ends the session: clears the persisted pair and the current user, and
    /// invalidates any credential exchange still in flight.
    ///
    /// Works the same whether or not a user is signed in.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        let mut state = self.lock();
        if state.torn_down {
            return Err(Error::ContextMisuse);
        }
        self.claim();
        self.shared.store.clear();
        state.user = None;
        state.initializing = false;
        self.publish(&state);
        Ok(())
    }

    /// The current user, if any.
    pub fn current_user(&self) -> Result<Option<User>> {
        let state = self.lock();
        if state.torn_down {
            return Err(Error::ContextMisuse);
        }
        Ok(state.user.clone())
    }

    /// A point-in-time snapshot for guard evaluation.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        let state = self.lock();
        if state.torn_down {
            return Err(Error::ContextMisuse);
        }
        Ok(SessionSnapshot {
            user: state.user.clone(),
            initializing: state.initializing,
        })
    }

    /// Evaluates the route guard against the current snapshot.
    pub fn guard<V>(&self, view: V) -> Result<RouteDecision<V>> {
        Ok(guard::evaluate(&self.snapshot()?, view))
    }

    /// Subscribes to session changes.
    ///
    /// The receiver yields a fresh [`SessionSnapshot`] whenever the current
    /// user or the initializing flag changes, so protected views can
    /// re-evaluate their guard the moment a logout happens elsewhere in the
    /// process instead of at the next full reload.
    pub fn subscribe(&self) -> Result<watch::Receiver<SessionSnapshot>> {
        self.ensure_active()?;
        Ok(self.shared.tx.subscribe())
    }

    /// Ends the context's lifecycle. Any later use of this handle or any
    /// clone of it fails with [`Error::ContextMisuse`].
    ///
    /// The persisted session is left alone. Ending the process is not a
    /// logout, the session greets the next boot's restore.
    pub fn teardown(&self) {
        let mut state = self.lock();
        state.torn_down = true;
        state.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http, session::store::MemoryStore};

    fn context() -> (SessionContext, Arc<MemoryStore>) {
        let http_client = http::Client::new("http://127.0.0.1:1").unwrap();
        let auth = auth::Client::new(http_client, false);
        let store = Arc::new(MemoryStore::new());
        (SessionContext::new(auth, store.clone()), store)
    }

    fn session() -> Session {
        Session {
            token: "xsct-42".to_string(),
            user: User {
                id: "u_1041".to_string(),
                email: "grace@example.com".to_string(),
                name: "Grace".to_string(),
                target_role: None,
                experience_level: None,
            },
        }
    }

    #[test]
    fn restore_without_a_stored_session() {
        let (ctx, _) = context();
        assert!(ctx.snapshot().unwrap().initializing);

        assert_eq!(ctx.restore().unwrap(), None);

        let snapshot = ctx.snapshot().unwrap();
        assert!(!snapshot.initializing);
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn restore_reads_the_store_once() {
        let (ctx, store) = context();
        store.save(&session()).unwrap();

        let restored = ctx.restore().unwrap().unwrap();
        assert_eq!(restored.email, "grace@example.com");

        ctx.logout().unwrap();
        store.save(&session()).unwrap();

        // The boot already happened, so the freshly written entries are not
        // picked up.
        assert_eq!(ctx.restore().unwrap(), None);
    }

    #[test]
    fn commit_persists_the_pair() {
        let (ctx, store) = context();
        ctx.restore().unwrap();

        let op = ctx.claim();
        let user = ctx.commit(op, session()).unwrap();
        assert_eq!(user.id, "u_1041");

        assert_eq!(store.load(), Some(session()));
        assert_eq!(ctx.current_user().unwrap().unwrap().id, "u_1041");
    }

    #[test]
    fn a_newer_claim_discards_the_stale_commit() {
        let (ctx, store) = context();
        ctx.restore().unwrap();

        let stale = ctx.claim();
        ctx.claim();

        match ctx.commit(stale, session()) {
            Err(Error::Superseded) => {}
            res => panic!("expected the stale commit to be discarded, got {:?}", res),
        }
        assert!(store.load().is_none());
        assert_eq!(ctx.current_user().unwrap(), None);
    }

    #[test]
    fn logout_invalidates_an_inflight_commit() {
        let (ctx, store) = context();
        ctx.restore().unwrap();

        let inflight = ctx.claim();
        ctx.logout().unwrap();

        match ctx.commit(inflight, session()) {
            Err(Error::Superseded) => {}
            res => panic!("expected the stale commit to be discarded, got {:?}", res),
        }
        assert!(store.load().is_none());
    }

    #[test]
    fn logout_clears_the_store_and_the_user() {
        let (ctx, store) = context();
        store.save(&session()).unwrap();
        ctx.restore().unwrap();
        assert!(ctx.current_user().unwrap().is_some());

        ctx.logout().unwrap();

        assert_eq!(ctx.current_user().unwrap(), None);
        assert!(store.load().is_none());

        // Logging out while logged out is fine.
        ctx.logout().unwrap();
    }

    #[test]
    fn subscribe_observes_changes() {
        let (ctx, _) = context();
        let mut changes = ctx.subscribe().unwrap();
        assert!(changes.borrow().initializing);

        ctx.restore().unwrap();
        assert!(changes.has_changed().unwrap());
        assert!(!changes.borrow_and_update().initializing);

        let op = ctx.claim();
        ctx.commit(op, session()).unwrap();
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_authenticated());

        ctx.logout().unwrap();
        assert!(changes.has_changed().unwrap());
        assert!(!changes.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn teardown_invalidates_every_handle() {
        let (ctx, _) = context();
        let other = ctx.clone();
        ctx.restore().unwrap();

        other.teardown();

        assert!(matches!(ctx.current_user(), Err(Error::ContextMisuse)));
        assert!(matches!(ctx.snapshot(), Err(Error::ContextMisuse)));
        assert!(matches!(ctx.restore(), Err(Error::ContextMisuse)));
        assert!(matches!(ctx.logout(), Err(Error::ContextMisuse)));
        assert!(matches!(ctx.subscribe(), Err(Error::ContextMisuse)));
        assert!(matches!(
            ctx.login("grace@example.com", "hunter2").await,
            Err(Error::ContextMisuse)
        ));
        assert!(matches!(
            ctx.register("Grace", "grace@example.com", "hunter2").await,
            Err(Error::ContextMisuse)
        ));

        // Tearing down twice is fine.
        other.teardown();
    }
}
