//! Blocking client for OCS user and group provisioning.
//!
//! # Overview
//! Turns typed calls (`list_users`, `add_user`, `disable_user`, ...) into
//! authenticated HTTP requests against an OCS v1 endpoint and decodes the
//! XML answer into an [`Ocs`] envelope.
//!
//! # Design
//! - `OcsClient` holds only an immutable `ClientConfig` and a `Transport`;
//!   calls share no mutable state and may run concurrently.
//! - `Transport` is the single I/O seam. `UreqTransport` (10 s timeout) is
//!   the default; tests swap in a recording transport.
//! - Errors cover local failures only (transport, XML decode, input
//!   validation). The remote's own success or failure is reported in
//!   `Ocs::meta` and left to the caller.
//! - One request per call: no retries, no caching.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{OcsClient, API_ROOT, GROUPS_ROUTE, USERS_ROUTE};
pub use config::ClientConfig;
pub use envelope::{Data, Meta, Ocs, Quota};
pub use error::{OcsError, OcsResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{BoxError, Transport, UreqTransport, DEFAULT_TIMEOUT};
pub use types::{NewUser, Operation};
