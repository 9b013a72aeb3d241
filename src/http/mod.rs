//! Outbound side of the client: every backend call goes through [`ApiClient`],
//! which attaches the JSON content type and the bearer token held in
//! [`AuthState`], hands the request to a [`Transport`], and maps non-2xx
//! answers onto [`crate::errors::ClientError`].

pub mod auth_state;
pub mod client;
pub mod transport;

pub use auth_state::AuthState;
pub use client::{ApiClient, PassThrough, ResponseHook};
pub use transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};
