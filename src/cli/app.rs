use std::sync::Arc;

use tracing::info;

use crate::api::{EmployeeQueries, PayrollQueries, QueryCache, SearchRunner, SummaryQueries};
use crate::auth::{FileStorage, Session, SessionStorage, SessionStore};
use crate::cli::console::Console;
use crate::config::Config;
use crate::errors::{ClientError, Result};
use crate::http::{ApiClient, AuthState, ReqwestTransport, Transport};
use crate::model::{PayrollRecord, SummarySnapshot};
use crate::pipeline::{EmployeeListView, SortDirection, SortKey, SortState, TableView};
use crate::route::Route;
use crate::utils::theme::Theme;

/// Rows per page of the grouped payroll and summary tables.
pub const TABLE_PAGE_SIZE: usize = 10;

/// Long-lived services for one run of the console.
pub struct App {
    pub config: Config,
    pub storage: Arc<dyn SessionStorage>,
    pub sessions: SessionStore,
    pub cache: QueryCache,
    pub employees: EmployeeQueries,
    pub payrolls: PayrollQueries,
    pub summaries: SummaryQueries,
    pub console: Console,
}

impl App {
    pub fn bootstrap(config: Config) -> Result<Self> {
        let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::open(&config.state_dir)?);
        Ok(Self::with_parts(config, Arc::new(ReqwestTransport::new()), storage))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let client = ApiClient::new(config.api_base.clone(), transport, AuthState::new());
        let cache = QueryCache::new(config.cache_capacity, config.stale_time, config.cache_ttl);
        let sessions = SessionStore::restore(client.clone(), storage.clone());
        let console = Console::new(Theme::load(storage.as_ref()));

        info!(api_base = %config.api_base, authenticated = sessions.is_authenticated(), "console ready");

        Self {
            employees: EmployeeQueries::new(client.clone(), cache.clone()),
            payrolls: PayrollQueries::new(client.clone(), cache.clone()),
            summaries: SummaryQueries::new(client, cache.clone()),
            cache,
            sessions,
            storage,
            console,
            config,
        }
    }

    /// Gate for every page but the login screen.
    pub fn require_session(&self) -> Result<Session> {
        self.sessions.current().ok_or_else(|| ClientError::Auth {
            message: format!("Not logged in. Run `{}` first.", Route::ENTRY),
            payload: None,
        })
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.console = Console::new(theme);
    }
}

/// Table and search state that outlives a single command in the shell.
pub struct Workspace {
    pub payroll_table: TableView,
    pub payroll_search: SearchRunner<Vec<PayrollRecord>>,
    pub summary_table: TableView,
    pub summary_search: SearchRunner<SummarySnapshot>,
    pub summary: Option<SummarySnapshot>,
    pub employee_list: EmployeeListView,
    /// Table the navigation commands (sort, next, expand...) act on.
    pub focus: Route,
}

impl Default for Workspace {
    fn default() -> Self {
        let mut payroll_table = TableView::new(TABLE_PAGE_SIZE);
        payroll_table.set_sort(SortState::by(SortKey::Name, SortDirection::Asc));

        Self {
            payroll_table,
            payroll_search: SearchRunner::new("Search failed"),
            summary_table: TableView::new(TABLE_PAGE_SIZE),
            summary_search: SearchRunner::new("Failed to fetch summary"),
            summary: None,
            employee_list: EmployeeListView::new(),
            focus: Route::HOME,
        }
    }
}

impl Workspace {
    /// Grouped table currently in focus, if the focused page has one.
    pub fn focused_table(&mut self) -> Option<&mut TableView> {
        match self.focus {
            Route::Payrolls => Some(&mut self.payroll_table),
            Route::Summary => Some(&mut self.summary_table),
            _ => None,
        }
    }
}
