use serde::{Deserialize, Serialize};

/// The token a synthesized demo session carries instead of a real credential.
pub static DEMO_TOKEN: &str = "demo-token";

/// Placeholder account id used by demo sessions.
static DEMO_USER_ID: &str = "1";

/// Career goal a demo session starts out with.
static DEMO_TARGET_ROLE: &str = "Software Engineer";

/// An authenticated SkillCircuit user.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's unique identifier.
    pub id: String,
    /// The user's email address, used as the login key.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// Free-text career goal, e.g. "Software Engineer".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    /// Experience label, e.g. "Entry Level", "Mid-Level" or "Senior".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
}

/// A credential token paired with the user it belongs to.
///
/// This is both the success payload of the login and register endpoints and
/// the pair the session store persists. The two fields only ever travel
/// together: a token without a user record (or the other way around) is not
/// a session.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Session {
    /// Opaque credential token.
    pub token: String,
    /// The user the token belongs to.
    pub user: User,
}

impl Session {
    /// Session synthesized by the login fallback when the service is
    /// unreachable and demo mode is on. The display name is the email's
    /// local part.
    pub(crate) fn demo_login(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email);
        Self {
            token: DEMO_TOKEN.to_string(),
            user: User {
                id: DEMO_USER_ID.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                target_role: Some(DEMO_TARGET_ROLE.to_string()),
                experience_level: Some("Mid-Level".to_string()),
            },
        }
    }

    /// Session synthesized by the registration fallback. Fresh accounts
    /// default to "Entry Level".
    pub(crate) fn demo_register(name: &str, email: &str) -> Self {
        Self {
            token: DEMO_TOKEN.to_string(),
            user: User {
                id: DEMO_USER_ID.to_string(),
                email: email.to_string(),
                name: name.to_string(),
                target_role: Some(DEMO_TARGET_ROLE.to_string()),
                experience_level: Some("Entry Level".to_string()),
            },
        }
    }
}

/// Payload of the login endpoint.
#[derive(Serialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

/// Payload of the register endpoint.
#[derive(Serialize)]
pub(crate) struct RegisterRequest {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password: String,
}
