use anyhow::Context;
use tracing::{error, info};
use tracing_appender::rolling;

use payroll_console::cli::{self, App, Workspace};
use payroll_console::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "payroll-console.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.tracing_level())
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!("Console starting...");

    let matches = cli::build_cli().get_matches();
    let mut app = App::bootstrap(config).context("failed to open client state")?;

    match matches.subcommand() {
        None | Some(("shell", _)) => cli::shell::run(&mut app).await?,
        Some(_) => {
            let mut ws = Workspace::default();
            if let Err(e) = cli::dispatch(&mut app, &mut ws, &matches).await {
                error!(error = %e, "command failed");
                app.console.print_error(&cli::describe(&e));
                // flush the log writer; exit skips destructors
                drop(guard);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
