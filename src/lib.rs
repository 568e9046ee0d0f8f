//! The Rust SDK for SkillCircuit sessions.
//!
//! If you're just getting started, take a look at the [`Client`]. It wires
//! the auth API client, the session store and the session context together.
//!
//! # Examples
//! ```no_run
//! use skillcircuit_rs::{guard::RouteDecision, Client, Error};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::new()?;
//!     let session = client.session();
//!
//!     // Restore whatever session survived the last run.
//!     session.restore()?;
//!
//!     // Sign in and read the current user back.
//!     session.login("ada@example.com", "hunter2").await?;
//!     if let Some(user) = session.current_user()? {
//!         println!("signed in as {} <{}>", user.name, user.email);
//!     }
//!
//!     // Gate a protected view on the session.
//!     match session.guard("dashboard")? {
//!         RouteDecision::Render(view) => println!("rendering {}", view),
//!         RouteDecision::RedirectToLogin => println!("redirecting to login"),
//!         RouteDecision::Pending => println!("still restoring"),
//!     }
//!
//!     session.logout()?;
//!     Ok(())
//! }
//! ```
pub mod client;
pub mod error;
mod http;

pub mod auth;
pub mod guard;
pub mod session;

pub use client::Client;
pub use error::Error;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

#[cfg(all(feature = "default-tls", feature = "native-tls"))]
compile_error!("Feature \"default-tls\" and \"native-tls\" cannot be enabled at the same time");

#[cfg(all(feature = "native-tls", feature = "rustls-tls"))]
compile_error!("Feature \"native-tls\" and \"rustls-tls\" cannot be enabled at the same time");

#[cfg(all(feature = "rustls-tls", feature = "default-tls"))]
compile_error!("Feature \"rustls-tls\" and \"default-tls\" cannot be enabled at the same time");
