//! Plain-text tables for the terminal.

use crate::cli::console::Console;
use crate::model::{Employee, EntityId, SummarySnapshot};
use crate::pipeline::{PageFooter, PageView, SortDirection, SortKey, Totals};
use crate::utils::format::{money, opt_money, truncate};

fn header_label(title: &str, key: SortKey, view: &PageView<'_>) -> String {
    match (view.sort.key(), view.sort.direction()) {
        (Some(k), Some(SortDirection::Asc)) if k == key => format!("{} ▲", title),
        (Some(k), Some(SortDirection::Desc)) if k == key => format!("{} ▼", title),
        _ => title.to_string(),
    }
}

/// Grouped payroll table: one line per employee, its rows under it when expanded.
pub fn grouped_table(console: &Console, view: &PageView<'_>, precision: usize) {
    println!(
        "{}",
        console.heading(&format!(
            "  {:<24} {:>8} {:>6} {:>14} {:>14} {:>14} {:>12}",
            header_label("Employee", SortKey::Name, view),
            header_label("ID", SortKey::Id, view),
            header_label("Rows", SortKey::Count, view),
            header_label("Gross", SortKey::Gross, view),
            header_label("Tax", SortKey::Tax, view),
            header_label("Net", SortKey::Net, view),
            header_label("Latest", SortKey::PayDate, view),
        ))
    );

    if view.page.items.is_empty() {
        println!("  {}", console.muted("No payrolls found."));
    }

    for (group, expanded) in view.page.items.iter().zip(&view.expanded) {
        let marker = if *expanded { "▾" } else { "▸" };
        let latest = group
            .latest_pay_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:<24} {:>8} {:>6} {:>14} {:>14} {:>14} {:>12}",
            marker,
            truncate(group.employee.name.as_deref().unwrap_or("Unknown"), 24),
            truncate(group.id().as_str(), 8),
            group.count(),
            money(group.total_gross, precision),
            money(group.total_tax, precision),
            money(group.total_net, precision),
            latest,
        );

        if *expanded {
            println!("    {}", console.muted(&group.employee.subtitle()));
            for row in &group.rows {
                println!(
                    "    {:<12} {:>14} {:>14} {:>14}",
                    row.pay_date.as_deref().unwrap_or("-"),
                    opt_money(row.gross_salary, precision),
                    opt_money(row.tax_amount, precision),
                    opt_money(row.net_salary, precision),
                );
            }
        }
    }

    footer(
        console,
        PageFooter {
            page: view.page.page,
            total_pages: view.page.total_pages,
            total: view.page.total,
        },
        view.page.has_prev,
        view.page.has_next,
    );
}

pub fn footer(console: &Console, footer: PageFooter, has_prev: bool, has_next: bool) {
    let prev = if has_prev { "‹ prev" } else { "" };
    let next = if has_next { "next ›" } else { "" };
    println!(
        "{}",
        console.muted(&format!(
            "Page {} of {} ({} total)  {} {}",
            footer.page, footer.total_pages, footer.total, prev, next
        ))
    );
}

/// Record count and sum cards over the displayed data set.
pub fn totals_cards(console: &Console, totals: &Totals, precision: usize) {
    println!(
        "{}  {}  {}  {}",
        console.accent(&format!("Records: {}", totals.records)),
        format!("Gross: {}", money(totals.gross, precision)),
        format!("Tax: {}", money(totals.tax, precision)),
        format!("Net: {}", money(totals.net, precision)),
    );
}

pub fn summary_cards(console: &Console, summary: &SummarySnapshot, precision: usize) {
    println!(
        "{}  {}  {}  {}",
        console.accent(&format!("Payrolls: {}", summary.payrolls.len())),
        format!("Total gross: {}", money(summary.total_gross_salary, precision)),
        format!("Total tax: {}", money(summary.total_tax_amount, precision)),
        format!("Total net: {}", money(summary.total_net_salary, precision)),
    );
}

pub fn employee_table(
    console: &Console,
    rows: &[Employee],
    selected: &[EntityId],
    precision: usize,
) {
    println!(
        "{}",
        console.heading(&format!(
            "  {:>6} {:<22} {:>4} {:<8} {:<20} {:>6} {:>12}",
            "ID", "Name", "Age", "Gender", "Designation", "Rating", "Salary"
        ))
    );
    if rows.is_empty() {
        println!("  {}", console.muted("No employees found."));
    }
    for e in rows {
        let mark = if selected.contains(&e.id) { "*" } else { " " };
        println!(
            "{} {:>6} {:<22} {:>4} {:<8} {:<20} {:>6} {:>12}",
            mark,
            truncate(e.id.as_str(), 6),
            truncate(&e.name, 22),
            e.age.map(|a| a.to_string()).unwrap_or_default(),
            e.gender.as_deref().unwrap_or_default(),
            truncate(e.designation.as_deref().unwrap_or_default(), 20),
            e.rating.map(|r| r.to_string()).unwrap_or_default(),
            e.salary.map(|s| money(s, precision)).unwrap_or_default(),
        );
    }
}

pub fn employee_detail(console: &Console, e: &Employee, precision: usize) {
    console.print_header(&e.to_string());
    let line = |label: &str, value: String| println!("  {:<12} {}", console.muted(label), value);
    line("Age", e.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()));
    line("Gender", e.gender.clone().unwrap_or_else(|| "-".into()));
    line("Designation", e.designation.clone().unwrap_or_else(|| "-".into()));
    line("Rating", e.rating.map(|r| r.to_string()).unwrap_or_else(|| "-".into()));
    line("Salary", e.salary.map(|s| money(s, precision)).unwrap_or_else(|| "-".into()));
}
