//! The top-level client for the SkillCircuit API.
use std::{env, sync::Arc};

use crate::{
    auth,
    error::Result,
    http,
    session::{MemoryStore, SessionContext, SessionStore},
};

/// App URL is the URL of the hosted SkillCircuit deployment.
static APP_URL: &str = "https://app.skillcircuit.dev";

/// The client is the entrypoint of the whole SDK. It wires the auth API
/// client, the session store and the session context together.
///
/// You can create it using [`Client::builder`] or [`Client::new`].
///
/// # Examples
/// ```
/// use skillcircuit_rs::{Client, Error};
///
/// fn main() -> Result<(), Error> {
///     // Create a new client against the hosted deployment, reading the
///     // URL and the demo flag from the environment variables
///     // SKILLCIRCUIT_URL and SKILLCIRCUIT_DEMO.
///     let client = Client::new()?;
///
///     // Set all available options. Unset options fall back to environment
///     // variables.
///     let client = Client::builder()
///         .with_url("https://circuit.example.com")
///         .with_demo_mode(true)
///         .build()?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    auth: auth::Client,
    session: SessionContext,
}

impl Client {
    /// Creates a new client. If you want to customize it, use
    /// [`Client::builder`].
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client using a builder.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Get the url (cloned).
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// The auth API client. It exchanges credentials without touching the
    /// session context or the store.
    pub fn auth(&self) -> &auth::Client {
        &self.auth
    }

    /// The session context. Clone it freely, all clones share one session.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}

/// This builder is used to create a new client.
pub struct Builder {
    env_fallback: bool,
    url: Option<String>,
    demo_mode: Option<bool>,
    store: Option<Arc<dyn SessionStore>>,
}

impl Builder {
    /// Create a new builder.
    fn new() -> Self {
        Self {
            env_fallback: true,
            url: None,
            demo_mode: None,
            store: None,
        }
    }

    /// Don't fall back to environment variables.
    pub fn no_env(mut self) -> Self {
        self.env_fallback = false;
        self
    }

    /// Add an URL to the client. If this is not set, the URL is read from
    /// the environment variable `SKILLCIRCUIT_URL` and falls back to the
    /// hosted deployment.
    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Allow session synthesis when the service is unreachable. If this is
    /// not set, demo mode is read from the environment variable
    /// `SKILLCIRCUIT_DEMO` (`1` or `true` enables it).
    ///
    /// Off by default: in production an unreachable service is an error,
    /// not an invitation to invent users.
    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = Some(demo_mode);
        self
    }

    /// Set the session store. Defaults to a fresh [`MemoryStore`], which
    /// means sessions do not survive the process; hand over a
    /// [`FileStore`](crate::session::FileStore) to change that.
    pub fn with_store<S>(mut self, store: S) -> Self
    where
        S: SessionStore + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a shared session store handle. Useful when the caller keeps its
    /// own reference, for example to inspect persisted state in tests.
    pub fn with_shared_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let env_fallback = self.env_fallback;

        let mut url = self.url.unwrap_or_default();
        if url.is_empty() && env_fallback {
            url = env::var("SKILLCIRCUIT_URL").unwrap_or_default();
        }
        if url.is_empty() {
            url = APP_URL.to_string();
        }

        let demo_mode = match self.demo_mode {
            Some(demo_mode) => demo_mode,
            None if env_fallback => env::var("SKILLCIRCUIT_DEMO")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            None => false,
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        let http_client = http::Client::new(&url)?;
        let auth = auth::Client::new(http_client, demo_mode);
        let session = SessionContext::new(auth.clone(), store);

        Ok(Client { url, auth, session })
    }
}
