//! Which backend read is active. Exactly one selector is live at a time; a
//! new one replaces the previous result set instead of merging with it.

use std::fmt;
use std::str::FromStr;

use crate::errors::{ClientError, Result};
use crate::model::EntityId;

/// A `YYYY-MM` month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ClientError::InvalidInput(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }
}

impl FromStr for YearMonth {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ClientError::InvalidInput(format!("expected YYYY-MM, got '{}'", s));
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }
        let year = y.parse().map_err(|_| invalid())?;
        let month = m.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PayrollSelector {
    All,
    Employee(EntityId),
    EmployeeYear(EntityId, i32),
    EmployeeYearMonth(EntityId, YearMonth),
    EmployeeRange {
        employee: EntityId,
        start: YearMonth,
        end: YearMonth,
    },
}

impl PayrollSelector {
    pub fn path(&self) -> String {
        match self {
            PayrollSelector::All => "/api/payrolls".to_string(),
            PayrollSelector::Employee(id) => format!("/api/payrolls/employee/{}", id),
            PayrollSelector::EmployeeYear(id, year) => {
                format!("/api/payrolls/employee/{}/year/{}", id, year)
            }
            PayrollSelector::EmployeeYearMonth(id, ym) => format!(
                "/api/payrolls/employee/{}/year-month/{}-{:02}",
                id, ym.year, ym.month
            ),
            PayrollSelector::EmployeeRange { employee, .. } => {
                format!("/api/payrolls/employee/{}/dates-range", employee)
            }
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            PayrollSelector::EmployeeRange { start, end, .. } => {
                vec![("startDate", start.to_string()), ("endDate", end.to_string())]
            }
            _ => Vec::new(),
        }
    }

    pub fn cache_parts(&self) -> Vec<String> {
        match self {
            PayrollSelector::All => vec!["list".into()],
            PayrollSelector::Employee(id) => vec!["employee".into(), id.to_string()],
            PayrollSelector::EmployeeYear(id, y) => {
                vec!["employee".into(), id.to_string(), "year".into(), y.to_string()]
            }
            PayrollSelector::EmployeeYearMonth(id, ym) => {
                vec!["employee".into(), id.to_string(), "ym".into(), ym.to_string()]
            }
            PayrollSelector::EmployeeRange { employee, start, end } => vec![
                "employee".into(),
                employee.to_string(),
                "range".into(),
                start.to_string(),
                end.to_string(),
            ],
        }
    }

    /// Short label of the selector shape, used for loading indicators.
    pub fn label(&self) -> &'static str {
        match self {
            PayrollSelector::All => "all",
            PayrollSelector::Employee(_) => "employee",
            PayrollSelector::EmployeeYear(..) => "year",
            PayrollSelector::EmployeeYearMonth(..) => "ym",
            PayrollSelector::EmployeeRange { .. } => "range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SummarySelector {
    All,
    Year(i32),
    YearMonth(YearMonth),
    Range { start: YearMonth, end: YearMonth },
}

impl SummarySelector {
    pub fn path(&self) -> String {
        match self {
            SummarySelector::All => "/api/summary".to_string(),
            SummarySelector::Year(y) => format!("/api/summary/year/{}", y),
            SummarySelector::YearMonth(ym) => format!("/api/summary/year-month/{}", ym),
            SummarySelector::Range { .. } => "/api/summary/date-ranges".to_string(),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            SummarySelector::Range { start, end } => {
                vec![("startYM", start.to_string()), ("endYM", end.to_string())]
            }
            _ => Vec::new(),
        }
    }

    pub fn cache_parts(&self) -> Vec<String> {
        match self {
            SummarySelector::All => vec!["all".into()],
            SummarySelector::Year(y) => vec!["year".into(), y.to_string()],
            SummarySelector::YearMonth(ym) => vec!["ym".into(), ym.to_string()],
            SummarySelector::Range { start, end } => {
                vec!["range".into(), start.to_string(), end.to_string()]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummarySelector::All => "all",
            SummarySelector::Year(_) => "year",
            SummarySelector::YearMonth(_) => "ym",
            SummarySelector::Range { .. } => "range",
        }
    }
}

/// Raw filter-drawer inputs. Building a selector checks that the fields the
/// chosen filter needs are filled in, so no request goes out half-specified.
#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    pub employee_id: String,
    pub year: String,
    pub year_month: String,
    pub range_from: String,
    pub range_to: String,
}

impl FilterForm {
    fn employee(&self) -> Option<EntityId> {
        let id = self.employee_id.trim();
        (!id.is_empty()).then(|| EntityId::from(id))
    }

    fn year(&self) -> Result<Option<i32>> {
        let raw = self.year.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|_| ClientError::InvalidInput(format!("'{}' is not a year", raw)))
    }

    fn month(raw: &str) -> Result<Option<YearMonth>> {
        let raw = raw.trim();
        if raw.is_empty() {
            Ok(None)
        } else {
            raw.parse().map(Some)
        }
    }

    pub fn payroll_by_employee(&self) -> Result<PayrollSelector> {
        self.employee()
            .map(PayrollSelector::Employee)
            .ok_or_else(|| ClientError::InvalidInput("Enter employee ID".to_string()))
    }

    pub fn payroll_by_year(&self) -> Result<PayrollSelector> {
        match (self.employee(), self.year()?) {
            (Some(id), Some(year)) => Ok(PayrollSelector::EmployeeYear(id, year)),
            _ => Err(ClientError::InvalidInput("Enter Employee ID & Year".to_string())),
        }
    }

    pub fn payroll_by_year_month(&self) -> Result<PayrollSelector> {
        match (self.employee(), Self::month(&self.year_month)?) {
            (Some(id), Some(ym)) => Ok(PayrollSelector::EmployeeYearMonth(id, ym)),
            _ => Err(ClientError::InvalidInput("Select year-month".to_string())),
        }
    }

    pub fn payroll_by_range(&self) -> Result<PayrollSelector> {
        match (
            self.employee(),
            Self::month(&self.range_from)?,
            Self::month(&self.range_to)?,
        ) {
            (Some(employee), Some(start), Some(end)) => Ok(PayrollSelector::EmployeeRange {
                employee,
                start,
                end,
            }),
            _ => Err(ClientError::InvalidInput(
                "Enter employee ID + both range months".to_string(),
            )),
        }
    }

    pub fn summary_by_year(&self) -> Result<SummarySelector> {
        self.year()?
            .map(SummarySelector::Year)
            .ok_or_else(|| ClientError::InvalidInput("Enter year".to_string()))
    }

    pub fn summary_by_year_month(&self) -> Result<SummarySelector> {
        Self::month(&self.year_month)?
            .map(SummarySelector::YearMonth)
            .ok_or_else(|| ClientError::InvalidInput("Select month".to_string()))
    }

    pub fn summary_by_range(&self) -> Result<SummarySelector> {
        match (Self::month(&self.range_from)?, Self::month(&self.range_to)?) {
            (Some(start), Some(end)) => Ok(SummarySelector::Range { start, end }),
            _ => Err(ClientError::InvalidInput(
                "Select both range months".to_string(),
            )),
        }
    }

    fn filled(field: &str) -> bool {
        !field.trim().is_empty()
    }

    /// Picks the most specific payroll filter the filled fields ask for:
    /// range, then year-month, then year, then employee; nothing means all.
    pub fn payroll_selector(&self) -> Result<PayrollSelector> {
        if Self::filled(&self.range_from) || Self::filled(&self.range_to) {
            self.payroll_by_range()
        } else if Self::filled(&self.year_month) {
            self.payroll_by_year_month()
        } else if Self::filled(&self.year) {
            self.payroll_by_year()
        } else if Self::filled(&self.employee_id) {
            self.payroll_by_employee()
        } else {
            Ok(PayrollSelector::All)
        }
    }

    pub fn summary_selector(&self) -> Result<SummarySelector> {
        if Self::filled(&self.range_from) || Self::filled(&self.range_to) {
            self.summary_by_range()
        } else if Self::filled(&self.year_month) {
            self.summary_by_year_month()
        } else if Self::filled(&self.year) {
            self.summary_by_year()
        } else {
            Ok(SummarySelector::All)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_parsing() {
        let ym: YearMonth = "2024-3".parse().unwrap();
        assert_eq!(ym.to_string(), "2024-03");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("24-01".parse::<YearMonth>().is_err());
        assert!("2024/01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn payroll_paths() {
        let id = EntityId::from(7u64);
        let ym = YearMonth::new(2024, 2).unwrap();

        assert_eq!(PayrollSelector::All.path(), "/api/payrolls");
        assert_eq!(
            PayrollSelector::EmployeeYear(id.clone(), 2024).path(),
            "/api/payrolls/employee/7/year/2024"
        );
        assert_eq!(
            PayrollSelector::EmployeeYearMonth(id.clone(), ym).path(),
            "/api/payrolls/employee/7/year-month/2024-02"
        );

        let range = PayrollSelector::EmployeeRange {
            employee: id,
            start: ym,
            end: YearMonth::new(2024, 6).unwrap(),
        };
        assert_eq!(range.path(), "/api/payrolls/employee/7/dates-range");
        assert_eq!(
            range.query(),
            vec![("startDate", "2024-02".to_string()), ("endDate", "2024-06".to_string())]
        );
    }

    #[test]
    fn summary_paths() {
        let ym = YearMonth::new(2023, 11).unwrap();
        assert_eq!(SummarySelector::YearMonth(ym).path(), "/api/summary/year-month/2023-11");
        assert_eq!(
            SummarySelector::Range { start: ym, end: ym }.query(),
            vec![("startYM", "2023-11".to_string()), ("endYM", "2023-11".to_string())]
        );
    }

    #[test]
    fn form_requires_inputs_for_each_filter() {
        let mut form = FilterForm::default();
        assert!(matches!(form.payroll_by_employee(), Err(ClientError::InvalidInput(_))));

        form.employee_id = " 12 ".to_string();
        assert_eq!(
            form.payroll_by_employee().unwrap(),
            PayrollSelector::Employee(EntityId::from("12"))
        );
        assert!(form.payroll_by_year().is_err());

        form.year = "2024".to_string();
        assert_eq!(
            form.payroll_by_year().unwrap(),
            PayrollSelector::EmployeeYear(EntityId::from("12"), 2024)
        );

        form.range_from = "2024-01".to_string();
        assert!(form.payroll_by_range().is_err());
        form.range_to = "2024-04".to_string();
        assert_eq!(form.payroll_by_range().unwrap().label(), "range");
        assert!(form.summary_by_range().is_ok());
    }

    #[test]
    fn most_specific_filter_wins() {
        let mut form = FilterForm::default();
        assert_eq!(form.payroll_selector().unwrap(), PayrollSelector::All);
        assert_eq!(form.summary_selector().unwrap(), SummarySelector::All);

        form.year = "2024".to_string();
        // year without employee id is a payroll pre-flight failure
        assert!(matches!(form.payroll_selector(), Err(ClientError::InvalidInput(_))));
        assert_eq!(form.summary_selector().unwrap(), SummarySelector::Year(2024));

        form.employee_id = "3".to_string();
        form.year_month = "2024-05".to_string();
        assert_eq!(form.payroll_selector().unwrap().label(), "ym");

        form.range_to = "2024-06".to_string();
        assert!(form.summary_selector().is_err());
    }
}
