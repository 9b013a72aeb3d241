//! Client library for the payroll administration backend: session handling,
//! authorized REST access with a query cache, and the grouping / sorting /
//! paging pipeline behind the payroll tables.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod http;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod route;
pub mod utils;

pub use config::Config;
pub use errors::{ClientError, Result};
