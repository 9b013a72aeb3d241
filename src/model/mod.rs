pub mod de;
pub mod employee;
pub mod payroll;
pub mod summary;
pub mod user;

pub use employee::{Employee, EmployeePayload, EmployeeRef, EntityId};
pub use payroll::{CreatePayroll, PayrollRecord};
pub use summary::SummarySnapshot;
pub use user::UserProfile;
