//! Command tree shared by one-shot invocations and the interactive shell.

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use strum::IntoEnumIterator;

use crate::api::FilterForm;
use crate::model::EmployeePayload;
use crate::pipeline::EmployeeColumn;

pub fn build_cli() -> Command {
    Command::new("payroll-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Payroll administration console")
        .subcommands(resource_commands())
        .subcommand(Command::new("shell").about("Start the interactive console (default)"))
}

/// Line parser used inside the shell: same resource commands plus table
/// navigation, without the binary name.
pub fn shell_cli() -> Command {
    Command::new("payroll")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_version_flag(true)
        .subcommands(resource_commands())
        .subcommands(navigation_commands())
}

fn resource_commands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in and remember the session")
            .arg(
                Arg::new("username")
                    .short('u')
                    .long("username")
                    .help("Username (prompted when omitted)"),
            )
            .arg(
                Arg::new("password")
                    .short('p')
                    .long("password")
                    .help("Password (prompted without echo when omitted)"),
            ),
        Command::new("logout").about("End the session"),
        Command::new("whoami").about("Show the signed-in user and token expiry"),
        employees_command(),
        payrolls_command(),
        summary_command(),
        Command::new("theme")
            .about("Show or toggle the colour theme")
            .subcommand(Command::new("toggle").about("Switch between dark and light")),
    ]
}

fn employees_command() -> Command {
    Command::new("employees")
        .about("Manage employee records")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List employees")
                .arg(Arg::new("search").long("search").short('s').help("Filter by name or designation"))
                .arg(Arg::new("sort").long("sort").help(format!(
                    "Column: {}",
                    EmployeeColumn::iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )))
                .arg(desc_flag())
                .args(page_args())
                .arg(export_flag()),
        )
        .subcommand(Command::new("show").about("Show one employee").arg(id_arg()))
        .subcommand(employee_form(Command::new("create").about("Add an employee"), true))
        .subcommand(employee_form(
            Command::new("update")
                .about("Edit an employee; omitted fields keep their value")
                .arg(id_arg()),
            false,
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete one or more employees")
                .arg(Arg::new("ids").required(true).num_args(1..).help("Employee ids"))
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
}

fn employee_form(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(
            Arg::new("age")
                .long("age")
                .required(required)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("gender")
                .long("gender")
                .required(required)
                .value_parser(EmployeePayload::GENDERS),
        )
        .arg(
            Arg::new("designation")
                .long("designation")
                .required(required)
                .value_parser(EmployeePayload::DESIGNATIONS),
        )
        .arg(
            Arg::new("rating")
                .long("rating")
                .required(required)
                .value_parser(value_parser!(u32).range(1..=5)),
        )
        .arg(
            Arg::new("salary")
                .long("salary")
                .value_parser(value_parser!(f64)),
        )
}

fn payrolls_command() -> Command {
    Command::new("payrolls")
        .about("Browse and create payroll entries")
        .subcommand_required(true)
        .subcommand(
            table_args(
                Command::new("list")
                    .about("Grouped payroll table; filters need --employee")
                    .arg(Arg::new("employee").long("employee").short('e').help("Employee id")),
            ),
        )
        .subcommand(
            Command::new("create")
                .about("Create a payroll; amounts are computed by the backend")
                .arg(Arg::new("employee").long("employee").short('e').required(true))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .required(true)
                        .value_parser(value_parser!(chrono::NaiveDate))
                        .help("Pay date, YYYY-MM-DD"),
                ),
        )
}

fn summary_command() -> Command {
    table_args(Command::new("summary").about("Payroll summary with totals"))
}

/// Filter, table and export flags of the grouped tables.
fn table_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("year").long("year").help("Year, e.g. 2024"))
        .arg(Arg::new("month").long("month").help("Year-month, YYYY-MM"))
        .arg(Arg::new("from").long("from").help("Range start, YYYY-MM"))
        .arg(Arg::new("to").long("to").help("Range end, YYYY-MM"))
        .arg(
            Arg::new("sort")
                .long("sort")
                .help("Column: name, id, gross, tax, net, count, payDate"),
        )
        .arg(desc_flag())
        .args(page_args())
        .arg(
            Arg::new("expand")
                .long("expand")
                .num_args(1..)
                .help("Employee ids whose rows to show"),
        )
        .arg(export_flag())
}

fn navigation_commands() -> Vec<Command> {
    vec![
        Command::new("sort")
            .about("Click a column header of the focused table (asc, desc, off)")
            .arg(Arg::new("key").required(true)),
        Command::new("next").about("Next page"),
        Command::new("prev").about("Previous page"),
        Command::new("page")
            .about("Go to page")
            .arg(Arg::new("number").required(true).value_parser(value_parser!(usize))),
        Command::new("size")
            .about("Rows per page: 5, 10, 20 or 50")
            .arg(Arg::new("rows").required(true).value_parser(value_parser!(usize))),
        Command::new("expand")
            .about("Toggle one employee group")
            .arg(Arg::new("id").required(true)),
        Command::new("show").about("Render the focused table again"),
        Command::new("reset").about("Drop the active filter of the focused table"),
        Command::new("exit").visible_alias("quit").about("Leave the console"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Employee id")
}

fn desc_flag() -> Arg {
    Arg::new("desc")
        .long("desc")
        .action(ArgAction::SetTrue)
        .help("Sort descending")
}

fn export_flag() -> Arg {
    Arg::new("export")
        .long("export")
        .action(ArgAction::SetTrue)
        .help("Write the full result set to an .xlsx file")
}

fn page_args() -> [Arg; 2] {
    [
        Arg::new("page")
            .long("page")
            .value_parser(value_parser!(usize))
            .help("Page number, starting at 1"),
        Arg::new("page-size")
            .long("page-size")
            .value_parser(value_parser!(usize))
            .help("Rows per page: 5, 10, 20 or 50"),
    ]
}

fn string_arg(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name).cloned().unwrap_or_default()
}

/// Filter-drawer inputs as typed on the command line.
pub fn filter_form(args: &ArgMatches) -> FilterForm {
    FilterForm {
        employee_id: args
            .try_get_one::<String>("employee")
            .ok()
            .flatten()
            .cloned()
            .unwrap_or_default(),
        year: string_arg(args, "year"),
        year_month: string_arg(args, "month"),
        range_from: string_arg(args, "from"),
        range_to: string_arg(args, "to"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
        shell_cli().debug_assert();
    }

    #[test]
    fn shell_parses_navigation_without_binary_name() {
        let matches = shell_cli().try_get_matches_from(["page", "3"]).unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "page");
        assert_eq!(args.get_one::<usize>("number"), Some(&3));
    }

    #[test]
    fn payroll_filters_become_a_form() {
        let matches = build_cli()
            .try_get_matches_from([
                "payroll-console",
                "payrolls",
                "list",
                "--employee",
                "4",
                "--from",
                "2024-01",
                "--to",
                "2024-03",
            ])
            .unwrap();
        let (_, payrolls) = matches.subcommand().unwrap();
        let (_, list) = payrolls.subcommand().unwrap();

        let form = filter_form(list);
        assert_eq!(form.employee_id, "4");
        assert_eq!(form.range_from, "2024-01");
        assert!(form.payroll_by_range().is_ok());
    }

    #[test]
    fn summary_form_has_no_employee() {
        let matches = build_cli()
            .try_get_matches_from(["payroll-console", "summary", "--year", "2024"])
            .unwrap();
        let (_, summary) = matches.subcommand().unwrap();
        let form = filter_form(summary);
        assert_eq!(form.employee_id, "");
        assert!(form.summary_by_year().is_ok());
    }

    #[test]
    fn create_rejects_unknown_designation() {
        let result = build_cli().try_get_matches_from([
            "payroll-console",
            "employees",
            "create",
            "--name",
            "A",
            "--age",
            "30",
            "--gender",
            "Male",
            "--designation",
            "Intern",
            "--rating",
            "3",
        ]);
        assert!(result.is_err());
    }
}
