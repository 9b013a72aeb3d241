use tracing::debug;

use crate::cli::app::{App, Workspace};
use crate::cli::commands::shell_cli;
use crate::cli::handlers::{Flow, describe, dispatch};
use crate::errors::Result;
use crate::route::Route;

/// Reads commands until `exit` or end of input. Failures are printed inline
/// and the loop carries on.
pub async fn run(app: &mut App) -> Result<()> {
    let mut ws = Workspace::default();
    app.console.print_header("Payroll Console");

    if app.sessions.is_authenticated() {
        if let Some(user) = app.sessions.user() {
            app.console
                .print_info(&format!("Signed in as {}", user.username));
        }
    } else {
        ws.focus = Route::ENTRY;
        app.console.print_info("Not signed in. Use `login` to start.");
    }
    app.console.print_info("Type `help` for commands, `exit` to leave.");

    loop {
        let Some(line) = app.console.read_line(&format!("{}>", ws.focus))? else {
            println!();
            break;
        };
        if line.is_empty() {
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let matches = match shell_cli().try_get_matches_from(words) {
            Ok(m) => m,
            Err(e) => {
                // clap renders help and usage errors itself
                let _ = e.print();
                continue;
            }
        };

        debug!(command = matches.subcommand_name().unwrap_or_default(), "shell command");
        match dispatch(app, &mut ws, &matches).await {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => app.console.print_error(&describe(&e)),
        }
    }

    app.console.print_info("Bye");
    Ok(())
}
