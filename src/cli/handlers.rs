use chrono::{Local, NaiveDate};
use clap::ArgMatches;
use tracing::{info, warn};

use crate::api::{PayrollSelector, SearchOutcome, SummarySelector};
use crate::auth::jwt;
use crate::cli::app::{App, Workspace};
use crate::cli::commands::filter_form;
use crate::cli::render;
use crate::errors::{ClientError, Result};
use crate::model::{CreatePayroll, EmployeePayload, EntityId};
use crate::models::LoginReqDto;
use crate::pipeline::{EmployeeColumn, SortDirection, SortKey, SortState, TableView, Totals};
use crate::route::Route;
use crate::utils::export;
use crate::utils::theme::Theme;

/// Whether the shell keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Inline text for a failed command.
pub fn describe(err: &ClientError) -> String {
    err.user_message(&err.to_string())
}

pub async fn dispatch(app: &mut App, ws: &mut Workspace, matches: &ArgMatches) -> Result<Flow> {
    match matches.subcommand() {
        Some(("login", args)) => login(app, ws, args).await?,
        Some(("logout", _)) => logout(app, ws).await,
        Some(("whoami", _)) => whoami(app)?,
        Some(("employees", args)) => {
            app.require_session()?;
            ws.focus = Route::Employees;
            employees(app, ws, args).await?
        }
        Some(("payrolls", args)) => {
            app.require_session()?;
            ws.focus = Route::Payrolls;
            payrolls(app, ws, args).await?
        }
        Some(("summary", args)) => {
            app.require_session()?;
            ws.focus = Route::Summary;
            summary(app, ws, args).await?
        }
        Some(("theme", args)) => theme(app, args)?,
        Some(("exit", _)) => return Ok(Flow::Exit),
        Some((nav, args)) => navigate(app, ws, nav, args).await?,
        None => {}
    }
    Ok(Flow::Continue)
}

async fn login(app: &mut App, ws: &mut Workspace, args: &ArgMatches) -> Result<()> {
    let username = match args.get_one::<String>("username") {
        Some(u) => u.clone(),
        None => app.console.get_input("Username:")?,
    };
    let password = match args.get_one::<String>("password") {
        Some(p) => p.clone(),
        None => app.console.get_password("Password:")?,
    };
    if username.is_empty() || password.is_empty() {
        return Err(ClientError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    let session = app
        .sessions
        .login(&LoginReqDto { username, password })
        .await?;

    // Data cached for a previous user must not leak into this session.
    app.cache.clear();
    *ws = Workspace::default();
    ws.focus = Route::HOME;
    app.console
        .print_success(&format!("Welcome, {}", session.user.username));
    Ok(())
}

async fn logout(app: &mut App, ws: &mut Workspace) {
    let outcome = app.sessions.logout().await;
    app.cache.clear();
    *ws = Workspace::default();
    ws.focus = outcome.redirect;

    if !outcome.backend_acknowledged {
        app.console
            .print_info("Backend did not confirm the logout; local session cleared anyway.");
    }
    app.console.print_success("Logged out");
}

fn whoami(app: &App) -> Result<()> {
    let session = app.require_session()?;
    app.console.print_header(&session.user.username);
    for (key, value) in &session.user.extra {
        println!("  {:<12} {}", key, value);
    }

    match app.sessions.claims() {
        Some(claims) => {
            if let Some(sub) = &claims.sub {
                println!("  {:<12} {}", "subject", sub);
            }
            if let Some(role) = &claims.role {
                println!("  {:<12} {}", "role", role);
            }
            match jwt::expires_at(&claims) {
                Some(at) => println!("  {:<12} {}", "expires", at.with_timezone(&Local)),
                None => println!("  {:<12} {}", "expires", "never"),
            }
        }
        None => println!("  {}", app.console.muted("Token is opaque; no claims to show.")),
    }
    Ok(())
}

async fn employees(app: &mut App, ws: &mut Workspace, args: &ArgMatches) -> Result<()> {
    let precision = app.config.display_precision;
    match args.subcommand() {
        Some(("list", args)) => {
            let list = app.employees.list().await?;
            let view = &mut ws.employee_list;
            view.load(list);

            if let Some(term) = args.get_one::<String>("search") {
                view.set_search(term.clone());
            }
            if let Some(raw) = args.get_one::<String>("sort") {
                let column: EmployeeColumn = raw
                    .parse()
                    .map_err(|_| ClientError::InvalidInput(format!("Unknown column '{}'", raw)))?;
                view.set_sort(column, direction(args));
            }
            if let Some(size) = args.get_one::<usize>("page-size") {
                view.set_page_size(*size)?;
            }
            if let Some(page) = args.get_one::<usize>("page") {
                view.go_to_page(*page)?;
            }

            let (rows, footer) = view.page();
            app.console.print_header("Employees");
            render::employee_table(&app.console, &rows, &view.selected(), precision);
            render::footer(
                &app.console,
                footer,
                footer.page > 1,
                footer.page < footer.total_pages,
            );

            if args.get_flag("export") {
                let written =
                    export::export_employees(&view.visible(), &app.config.export_dir, today());
                report_export(app, written)?;
            }
        }
        Some(("show", args)) => {
            let id = id_of(args);
            let by_employee = PayrollSelector::Employee(id.clone());
            let (employee, payrolls) = futures::try_join!(
                app.employees.get(&id),
                app.payrolls.list(&by_employee)
            )?;
            render::employee_detail(&app.console, &employee, precision);
            render::totals_cards(&app.console, &Totals::of(&payrolls), precision);
        }
        Some(("create", args)) => {
            let payload = EmployeePayload {
                name: required(args, "name")?,
                age: args.get_one::<u32>("age").copied().unwrap_or_default(),
                gender: required(args, "gender")?,
                designation: required(args, "designation")?,
                rating: args.get_one::<u32>("rating").copied().unwrap_or_default(),
                salary: args.get_one::<f64>("salary").copied(),
            };
            let created = app.employees.create(&payload).await?;
            app.console
                .print_success(&format!("Employee created: {}", created));
        }
        Some(("update", args)) => {
            let id = id_of(args);
            let current = app.employees.get(&id).await?;
            let mut payload = EmployeePayload::from_employee(&current);
            if let Some(name) = args.get_one::<String>("name") {
                payload.name = name.clone();
            }
            if let Some(age) = args.get_one::<u32>("age") {
                payload.age = *age;
            }
            if let Some(gender) = args.get_one::<String>("gender") {
                payload.gender = gender.clone();
            }
            if let Some(designation) = args.get_one::<String>("designation") {
                payload.designation = designation.clone();
            }
            if let Some(rating) = args.get_one::<u32>("rating") {
                payload.rating = *rating;
            }
            if let Some(salary) = args.get_one::<f64>("salary") {
                payload.salary = Some(*salary);
            }

            let updated = app.employees.update(&id, &payload).await?;
            app.console
                .print_success(&format!("Employee updated: {}", updated));
        }
        Some(("delete", args)) => {
            let ids: Vec<EntityId> = args
                .get_many::<String>("ids")
                .into_iter()
                .flatten()
                .map(|s| EntityId::from(s.as_str()))
                .collect();

            let prompt = format!("Delete {} employee(s)?", ids.len());
            if !args.get_flag("yes") && !app.console.confirm_action(&prompt)? {
                app.console.print_info("Nothing deleted.");
                return Ok(());
            }

            let report = app.employees.remove_many(&ids).await;
            if !report.deleted.is_empty() {
                app.console
                    .print_success(&format!("Deleted {} employee(s)", report.deleted.len()));
            }
            if let Some((id, err)) = report.failed {
                warn!(employee_id = %id, error = %err, "bulk delete stopped");
                return Err(ClientError::InvalidInput(format!(
                    "Failed to delete employee {}: {}",
                    id,
                    err.user_message("Delete failed")
                )));
            }
            ws.employee_list.clear_selection();
        }
        _ => {}
    }
    Ok(())
}

async fn payrolls(app: &mut App, ws: &mut Workspace, args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("list", args)) => {
            let selector = filter_form(args).payroll_selector()?;
            load_payrolls(app, ws, &selector).await?;
            apply_table_args(&mut ws.payroll_table, args)?;
            show_payrolls(app, ws);

            if args.get_flag("export") {
                let written = export::export_payrolls(
                    ws.payroll_table.groups(),
                    &app.config.export_dir,
                    today(),
                );
                report_export(app, written)?;
            }
        }
        Some(("create", args)) => {
            let payload = CreatePayroll {
                employee_id: EntityId::from(required(args, "employee")?.as_str()),
                pay_date: args
                    .get_one::<NaiveDate>("date")
                    .copied()
                    .ok_or_else(|| ClientError::InvalidInput("Pay date is required".to_string()))?,
            };
            let created = app.payrolls.create(&payload).await?;
            app.console.print_success(&format!(
                "Payroll {} created for employee {}",
                created.id, payload.employee_id
            ));
        }
        _ => {}
    }
    Ok(())
}

/// Unfiltered reads go through the cache; filtered ones through the search
/// runner so an older response never replaces a newer one.
async fn load_payrolls(app: &App, ws: &mut Workspace, selector: &PayrollSelector) -> Result<()> {
    let records = if *selector == PayrollSelector::All {
        ws.payroll_search.reset();
        app.payrolls.all().await?
    } else {
        let outcome = ws
            .payroll_search
            .run(selector.label(), app.payrolls.list(selector), Vec::len)
            .await;
        match outcome {
            SearchOutcome::Completed { count } => {
                info!(filter = selector.label(), count, "payroll search completed");
                ws.payroll_search.results().unwrap_or_default()
            }
            SearchOutcome::Failed(e) => return Err(e),
            SearchOutcome::Superseded => return Ok(()),
        }
    };
    ws.payroll_table.load(records);
    Ok(())
}

fn show_payrolls(app: &App, ws: &Workspace) {
    let precision = app.config.display_precision;
    let frame = ws.payroll_table.current_page();
    app.console.print_header("Payrolls");
    render::totals_cards(&app.console, &frame.totals, precision);
    render::grouped_table(&app.console, &frame, precision);
}

async fn summary(app: &mut App, ws: &mut Workspace, args: &ArgMatches) -> Result<()> {
    let selector = filter_form(args).summary_selector()?;
    load_summary(app, ws, &selector).await?;
    apply_table_args(&mut ws.summary_table, args)?;
    show_summary(app, ws);

    if args.get_flag("export") {
        let records = ws.summary_table.records().to_vec();
        report_export(app, export::export_summary(&records, &app.config.export_dir, today()))?;
    }
    Ok(())
}

async fn load_summary(app: &App, ws: &mut Workspace, selector: &SummarySelector) -> Result<()> {
    let outcome = ws
        .summary_search
        .run(selector.label(), app.summaries.fetch(selector), |s| s.payrolls.len())
        .await;
    match outcome {
        SearchOutcome::Completed { .. } => {
            if let Some(snapshot) = ws.summary_search.results() {
                ws.summary_table.load(snapshot.payrolls.clone());
                ws.summary = Some(snapshot);
            }
            Ok(())
        }
        SearchOutcome::Failed(e) => Err(e),
        SearchOutcome::Superseded => Ok(()),
    }
}

fn show_summary(app: &App, ws: &Workspace) {
    let precision = app.config.display_precision;
    app.console.print_header("Summary");
    if let Some(snapshot) = &ws.summary {
        render::summary_cards(&app.console, snapshot, precision);
    }
    render::grouped_table(&app.console, &ws.summary_table.current_page(), precision);
}

fn theme(app: &mut App, args: &ArgMatches) -> Result<()> {
    let theme = match args.subcommand() {
        Some(("toggle", _)) => {
            let next = Theme::toggle(app.storage.as_ref())?;
            app.set_theme(next);
            next
        }
        _ => app.console.theme(),
    };
    app.console.print_info(&format!("Theme: {}", theme));
    Ok(())
}

/// Shell-only commands acting on the focused grouped table.
async fn navigate(app: &mut App, ws: &mut Workspace, nav: &str, args: &ArgMatches) -> Result<()> {
    app.require_session()?;
    if nav == "reset" {
        match ws.focus {
            Route::Payrolls => load_payrolls(app, ws, &PayrollSelector::All).await?,
            Route::Summary => load_summary(app, ws, &SummarySelector::All).await?,
            _ => {}
        }
    } else {
        let table = ws.focused_table().ok_or_else(|| {
            ClientError::InvalidInput("Open payrolls or summary first".to_string())
        })?;

        match nav {
            "sort" => {
                let raw = required(args, "key")?;
                table.click_sort(parse_sort_key(&raw)?);
            }
            "next" => {
                if !table.next_page() {
                    app.console.print_info("Already on the last page");
                }
            }
            "prev" => {
                if !table.prev_page() {
                    app.console.print_info("Already on the first page");
                }
            }
            "page" => {
                let page = args.get_one::<usize>("number").copied().unwrap_or(1);
                table.go_to_page(page)?;
            }
            "size" => {
                let rows = args.get_one::<usize>("rows").copied().unwrap_or_default();
                table.set_page_size(rows)?;
            }
            "expand" => {
                table.toggle_expanded(&EntityId::from(required(args, "id")?.as_str()));
            }
            _ => {}
        }
    }

    match ws.focus {
        Route::Payrolls => show_payrolls(app, ws),
        Route::Summary => show_summary(app, ws),
        _ => {}
    }
    Ok(())
}

fn apply_table_args(table: &mut TableView, args: &ArgMatches) -> Result<()> {
    if let Some(raw) = args.get_one::<String>("sort") {
        table.set_sort(SortState::by(parse_sort_key(raw)?, direction(args)));
    }
    if let Some(size) = args.get_one::<usize>("page-size") {
        table.set_page_size(*size)?;
    }
    if let Some(page) = args.get_one::<usize>("page") {
        table.go_to_page(*page)?;
    }
    for id in args.get_many::<String>("expand").into_iter().flatten() {
        table.set_expanded(&EntityId::from(id.as_str()), true);
    }
    Ok(())
}

fn parse_sort_key(raw: &str) -> Result<SortKey> {
    raw.parse()
        .map_err(|_| ClientError::InvalidInput(format!("Unknown sort column '{}'", raw)))
}

fn direction(args: &ArgMatches) -> SortDirection {
    if args.get_flag("desc") {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

fn report_export(app: &App, written: Result<Option<std::path::PathBuf>>) -> Result<()> {
    match written? {
        Some(path) => app
            .console
            .print_success(&format!("Exported to {}", path.display())),
        None => app.console.print_info("Nothing to export."),
    }
    Ok(())
}

fn required(args: &ArgMatches, name: &str) -> Result<String> {
    args.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| ClientError::InvalidInput(format!("--{} is required", name)))
}

fn id_of(args: &ArgMatches) -> EntityId {
    args.get_one::<String>("id")
        .map(|s| EntityId::from(s.as_str()))
        .unwrap_or_default()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
