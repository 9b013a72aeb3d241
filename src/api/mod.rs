//! Resource query layer: typed reads and mutations per backend resource,
//! sharing one [`QueryCache`].

pub mod cache;
pub mod employee;
pub mod payroll;
pub mod search;
pub mod selector;
pub mod summary;

pub use cache::{QueryCache, QueryKey, Resource};
pub use employee::{BulkDeleteReport, EmployeeQueries};
pub use payroll::PayrollQueries;
pub use search::{SearchOutcome, SearchRunner};
pub use selector::{FilterForm, PayrollSelector, SummarySelector, YearMonth};
pub use summary::SummaryQueries;
