//! Route guarding for protected views.
//!
//! The guard is a pure decision over a [`SessionSnapshot`]: it either lets
//! the view render, redirects to the login entry point, or asks the caller
//! to hold while the boot-time restore is still running. It never performs
//! the redirect itself and it never consults the session directly, so the
//! same snapshot always produces the same decision.
//!
//! Re-evaluate the guard whenever the session changes;
//! [`SessionContext::subscribe`](crate::session::SessionContext::subscribe)
//! exists for exactly that.

use crate::session::SessionSnapshot;

/// The verdict for a visitor entering a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum RouteDecision<V> {
    /// The boot-time restore has not finished, hold the view back. Without
    /// this state a freshly started process would bounce a returning user to
    /// the login screen before their stored session is read.
    Pending,
    /// No user is present, send the visitor to the login entry point.
    RedirectToLogin,
    /// A user is present, render the view.
    Render(V),
}

/// Decides whether `view` may render for the session in `snapshot`.
pub fn evaluate<V>(snapshot: &SessionSnapshot, view: V) -> RouteDecision<V> {
    if snapshot.initializing {
        RouteDecision::Pending
    } else if snapshot.is_authenticated() {
        RouteDecision::Render(view)
    } else {
        RouteDecision::RedirectToLogin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;

    fn user() -> User {
        User {
            id: "u_1041".to_string(),
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            target_role: None,
            experience_level: None,
        }
    }

    #[test]
    fn holds_while_initializing() {
        let snapshot = SessionSnapshot {
            user: None,
            initializing: true,
        };
        assert_eq!(evaluate(&snapshot, "dashboard"), RouteDecision::Pending);

        // Even a present user does not render before the restore settles.
        let snapshot = SessionSnapshot {
            user: Some(user()),
            initializing: true,
        };
        assert_eq!(evaluate(&snapshot, "dashboard"), RouteDecision::Pending);
    }

    #[test]
    fn redirects_without_a_user() {
        let snapshot = SessionSnapshot {
            user: None,
            initializing: false,
        };
        assert_eq!(
            evaluate(&snapshot, "dashboard"),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn renders_with_a_user() {
        let snapshot = SessionSnapshot {
            user: Some(user()),
            initializing: false,
        };
        assert_eq!(
            evaluate(&snapshot, "dashboard"),
            RouteDecision::Render("dashboard")
        );
    }
}
