//! Terminal front end: parses commands, feeds intents into the query layer
//! and the table pipeline, and renders the result.

pub mod app;
pub mod commands;
pub mod console;
pub mod handlers;
pub mod render;
pub mod shell;

pub use app::{App, Workspace};
pub use commands::{build_cli, shell_cli};
pub use console::Console;
pub use handlers::{Flow, describe, dispatch};
