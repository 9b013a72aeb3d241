use strum_macros::{Display, EnumString};

/// Where the presentation layer should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Route {
    Login,
    Employees,
    Payrolls,
    Summary,
}

impl Route {
    /// The unauthenticated entry point.
    pub const ENTRY: Route = Route::Login;
    /// Landing page after a successful login.
    pub const HOME: Route = Route::Employees;
}
