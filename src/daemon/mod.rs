//! Service host - brings up configured services and serves requests
//!
//! The host is what the `startstop run` command drives:
//! - Builds simulated motors and every configured service
//! - Parses line requests and forwards them to services
//! - Stops everything on shutdown

pub mod context;
pub mod request;

pub use context::{ServiceHost, ServiceSummary};
pub use request::{Request, handle_request};
