//! Authentication types for the Passaporte Web client.
//!
//! # Overview
//!
//! - [`Credentials`]: application, end-user or identity-token credentials,
//!   resolved into HTTP Basic auth parameters
//! - [`Session`]: the host plus the credentials used for requests
//! - [`AuthRequest`]: end-user credentials handed to the authenticate flow
//!
//! Application credentials are the only ones a long-lived object keeps.
//! End-user credentials are used for a single exchange request and then
//! discarded (see [`Collection::authenticate`](crate::rest::Collection::authenticate)).

mod credentials;
pub mod session;

pub use credentials::{AuthRequest, Credentials};
pub use session::Session;
