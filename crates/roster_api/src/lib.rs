//! Request boundary for the roster backend.
//!
//! Turns transport-neutral requests into calls on `roster_core` and answers
//! every request with a uniform [`ResponseEnvelope`].

pub mod config;
pub mod envelope;
pub mod request;
pub mod route;
pub mod router;

pub use config::RosterConfig;
pub use envelope::{Record, ResponseEnvelope};
pub use request::{ParamError, Params, Request};
pub use route::{Method, Route, RouteError};
pub use router::{service_status, Router};
