//! Derived-data pipeline: flat payroll rows are grouped per employee, sorted
//! by the active column and cut into pages for display.

pub mod employees;
pub mod expand;
pub mod group;
pub mod paginate;
pub mod sort;
pub mod view;

pub use employees::{EmployeeColumn, EmployeeListView, PageFooter};
pub use expand::ExpansionState;
pub use group::{GroupedRow, Totals, group_by_employee};
pub use paginate::{PAGE_SIZE_OPTIONS, PageSlice, Pagination, paginate};
pub use sort::{SortDirection, SortKey, SortState, sort_groups};
pub use view::{PageView, TableView};
