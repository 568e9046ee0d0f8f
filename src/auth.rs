//! Exchange credentials for SkillCircuit sessions.
//!
//! You're probably looking for the [`Client`]. The usual way to get one is
//! through the top-level [`Client::auth`](crate::Client::auth) accessor.
//!
//! # Examples
//!
//! ```no_run
//! use skillcircuit_rs::{Client, Error};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::new()?;
//!
//!     let session = client.auth().login("ada@example.com", "hunter2").await?;
//!     println!("signed in as {}", session.user.name);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod model;

pub use self::{
    client::Client,
    model::{Session, User, DEMO_TOKEN},
};
