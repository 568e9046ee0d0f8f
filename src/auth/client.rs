use std::fmt::Debug as FmtDebug;

use tracing::{debug, instrument};

use crate::{
    auth::model::{LoginRequest, RegisterRequest, Session},
    error::{Error, Result},
    http,
};

/// Provides methods to authenticate against the SkillCircuit API.
///
/// The exchange alone never persists anything; making the resolved user
/// current and writing the session through to the store is the
/// [`SessionContext`](crate::session::SessionContext)'s job.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: http::Client,
    demo_mode: bool,
}

impl Client {
    pub(crate) fn new(http_client: http::Client, demo_mode: bool) -> Self {
        Self {
            http_client,
            demo_mode,
        }
    }

    /// Whether fallback synthesis is allowed when the service is unreachable.
    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Exchange credentials for a session.
    ///
    /// A reachable service that refuses the credentials yields
    /// [`Error::AuthRejected`]. An unreachable service yields
    /// [`Error::ServiceUnreachable`], unless demo mode is enabled, in which
    /// case a deterministic local session is synthesized instead. A rejection
    /// is never rescued by demo mode.
    #[instrument(skip(self, password))]
    pub async fn login<E, P>(&self, email: E, password: P) -> Result<Session>
    where
        E: Into<String> + FmtDebug,
        P: Into<String>,
    {
        let email = email.into();
        let req = LoginRequest {
            email: email.clone(),
            password: password.into(),
        };
        match self.http_client.post("/api/auth/login", &req).await {
            Ok(res) => res.json().await,
            Err(Error::ServiceUnreachable(e)) if self.demo_mode => {
                debug!(error = %e, "service unreachable, synthesizing a demo login session");
                Ok(Session::demo_login(&email))
            }
            Err(e) => Err(e),
        }
    }

    /// Create an account and exchange the fresh credentials for a session.
    ///
    /// Failure behavior matches [`Client::login`]; the demo fallback marks
    /// the new account as "Entry Level".
    #[instrument(skip(self, password))]
    pub async fn register<N, E, P>(&self, name: N, email: E, password: P) -> Result<Session>
    where
        N: Into<String> + FmtDebug,
        E: Into<String> + FmtDebug,
        P: Into<String>,
    {
        let name = name.into();
        let email = email.into();
        let req = RegisterRequest {
            name: name.clone(),
            email: email.clone(),
            password: password.into(),
        };
        match self.http_client.post("/api/auth/register", &req).await {
            Ok(res) => res.json().await,
            Err(Error::ServiceUnreachable(e)) if self.demo_mode => {
                debug!(error = %e, "service unreachable, synthesizing a demo registration session");
                Ok(Session::demo_register(&name, &email))
            }
            Err(e) => Err(e),
        }
    }
}
