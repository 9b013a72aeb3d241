use crate::errors::Result;
use crate::model::{EntityId, PayrollRecord};
use crate::pipeline::expand::ExpansionState;
use crate::pipeline::group::{GroupedRow, Totals, group_by_employee};
use crate::pipeline::paginate::{PageSlice, Pagination, paginate};
use crate::pipeline::sort::{SortKey, SortState, sort_groups};

/// State behind the grouped payroll table: current data set plus the sort,
/// page and expansion intents coming back from the table.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    records: Vec<PayrollRecord>,
    groups: Vec<GroupedRow>,
    sort: SortState,
    pagination: Pagination,
    expansion: ExpansionState,
}

/// What a renderer needs for one frame of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub page: PageSlice<'a, GroupedRow>,
    pub sort: SortState,
    /// Expanded flags for `page.items`, index aligned.
    pub expanded: Vec<bool>,
    pub totals: Totals,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: Pagination::new(page_size),
            ..Self::default()
        }
    }

    /// Replaces the data set. Sort and expansion survive; the page goes back to 1.
    pub fn load(&mut self, records: Vec<PayrollRecord>) {
        self.records = records;
        self.regroup();
        self.pagination.reset();
    }

    /// Groups are always rebuilt from the records so ties keep source order
    /// whatever was sorted before.
    fn regroup(&mut self) {
        self.groups = group_by_employee(&self.records);
        sort_groups(&mut self.groups, self.sort);
    }

    pub fn records(&self) -> &[PayrollRecord] {
        &self.records
    }

    pub fn groups(&self) -> &[GroupedRow] {
        &self.groups
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn click_sort(&mut self, key: SortKey) {
        self.sort.click(key);
        self.apply_sort();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        self.regroup();
        self.pagination.reset();
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next(self.groups.len())
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<()> {
        self.pagination.go_to(page, self.groups.len())
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.pagination.set_page_size(size)
    }

    pub fn toggle_expanded(&mut self, id: &EntityId) -> bool {
        self.expansion.toggle(id)
    }

    pub fn set_expanded(&mut self, id: &EntityId, expanded: bool) {
        self.expansion.set(id, expanded);
    }

    pub fn is_expanded(&self, id: &EntityId) -> bool {
        self.expansion.is_expanded(id)
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.records)
    }

    pub fn current_page(&self) -> PageView<'_> {
        let page = paginate(&self.groups, &self.pagination);
        let expanded = page
            .items
            .iter()
            .map(|g| self.expansion.is_expanded(g.id()))
            .collect();
        PageView {
            page,
            sort: self.sort,
            expanded,
            totals: self.totals(),
        }
    }
}
