use std::cmp::Ordering;
use std::collections::BTreeSet;

use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::Result;
use crate::model::{Employee, EntityId};
use crate::pipeline::paginate::{PAGE_SIZE_OPTIONS, PageSlice, Pagination, paginate};
use crate::pipeline::sort::{SortDirection, compare_ids, compare_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeColumn {
    Id,
    Name,
    Age,
    Gender,
    Designation,
    Rating,
    Salary,
}

impl EmployeeColumn {
    fn compare(self, a: &Employee, b: &Employee) -> Ordering {
        fn text(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or_default()
        }

        match self {
            EmployeeColumn::Id => compare_ids(&a.id, &b.id),
            EmployeeColumn::Name => compare_text(&a.name, &b.name),
            EmployeeColumn::Age => a.age.unwrap_or(0).cmp(&b.age.unwrap_or(0)),
            EmployeeColumn::Gender => compare_text(text(&a.gender), text(&b.gender)),
            EmployeeColumn::Designation => {
                compare_text(text(&a.designation), text(&b.designation))
            }
            EmployeeColumn::Rating => a.rating.unwrap_or(0).cmp(&b.rating.unwrap_or(0)),
            EmployeeColumn::Salary => a
                .salary
                .unwrap_or(0.0)
                .total_cmp(&b.salary.unwrap_or(0.0)),
        }
    }
}

/// Employee table: search box, column sort, paging and row selection.
/// Starts sorted by name, five rows per page.
#[derive(Debug, Clone)]
pub struct EmployeeListView {
    employees: Vec<Employee>,
    search: String,
    sort: Option<(EmployeeColumn, SortDirection)>,
    pagination: Pagination,
    selected: BTreeSet<EntityId>,
}

impl Default for EmployeeListView {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeListView {
    pub fn new() -> Self {
        Self {
            employees: Vec::new(),
            search: String::new(),
            sort: Some((EmployeeColumn::Name, SortDirection::Asc)),
            pagination: Pagination::new(PAGE_SIZE_OPTIONS[0]),
            selected: BTreeSet::new(),
        }
    }

    /// Replaces the data set; selections of rows that disappeared are dropped.
    pub fn load(&mut self, employees: Vec<Employee>) {
        self.selected.retain(|id| employees.iter().any(|e| &e.id == id));
        self.employees = employees;
        self.pagination.reset();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.pagination.reset();
    }

    pub fn sort(&self) -> Option<(EmployeeColumn, SortDirection)> {
        self.sort
    }

    pub fn set_sort(&mut self, column: EmployeeColumn, direction: SortDirection) {
        self.sort = Some((column, direction));
        self.pagination.reset();
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.pagination.reset();
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        self.pagination.set_page_size(size)
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<()> {
        let total = self.visible().len();
        self.pagination.go_to(page, total)
    }

    /// Rows matching the search term, in display order.
    pub fn visible(&self) -> Vec<Employee> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| {
                needle.is_empty()
                    || e.name.to_lowercase().contains(&needle)
                    || e.designation
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        if let Some((column, direction)) = self.sort {
            rows.sort_by(|a, b| direction.apply(column.compare(a, b)));
        }
        rows
    }

    /// Visible rows of the active page, owned by the caller.
    pub fn page(&self) -> (Vec<Employee>, PageFooter) {
        let rows = self.visible();
        let slice: PageSlice<'_, Employee> = paginate(&rows, &self.pagination);
        let footer = PageFooter {
            page: slice.page,
            total_pages: slice.total_pages,
            total: slice.total,
        };
        (slice.items.to_vec(), footer)
    }

    pub fn toggle_selected(&mut self, id: &EntityId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn selected(&self) -> Vec<EntityId> {
        self.selected.iter().cloned().collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFooter {
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn staff() -> Vec<Employee> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Ravi", "age": 41, "designation": "Manager", "salary": 90000},
            {"id": 2, "name": "anita", "age": 29, "designation": "Tech Lead", "salary": 120000},
            {"id": 3, "name": "Kiran", "age": 35, "designation": "Senior Developer"},
            {"id": 4, "name": "Deepa", "age": 24, "designation": "Software Developer", "salary": 60000},
            {"id": 5, "name": "Omar", "age": 50, "designation": "Delivery Head", "salary": 200000},
            {"id": 6, "name": "Zoe", "age": 33, "designation": "Architect", "salary": 150000}
        ]))
        .unwrap()
    }

    fn names(rows: &[Employee]) -> Vec<&str> {
        rows.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn search_matches_name_or_designation() {
        let mut view = EmployeeListView::new();
        view.load(staff());

        view.set_search("DEVELOPER");
        assert_eq!(names(&view.visible()), ["Deepa", "Kiran"]);

        view.clear_sort();
        assert_eq!(names(&view.visible()), ["Kiran", "Deepa"]);

        view.set_search("ani");
        assert_eq!(names(&view.visible()), ["anita"]);
    }

    #[test]
    fn default_page_size_is_five() {
        let mut view = EmployeeListView::new();
        view.load(staff());
        let (rows, footer) = view.page();
        assert_eq!(rows.len(), 5);
        assert_eq!(footer, PageFooter { page: 1, total_pages: 2, total: 6 });

        view.go_to_page(2).unwrap();
        assert_eq!(names(&view.page().0), ["Zoe"]);
    }

    #[test]
    fn sorts_by_any_column() {
        let mut view = EmployeeListView::new();
        view.load(staff());

        view.set_sort(EmployeeColumn::Name, SortDirection::Asc);
        assert_eq!(view.visible()[0].name, "anita");

        view.set_sort(EmployeeColumn::Salary, SortDirection::Desc);
        assert_eq!(view.visible()[0].name, "Omar");
        // missing salary counts as zero
        assert_eq!(view.visible()[5].name, "Kiran");

        view.set_sort(EmployeeColumn::from_str("age").unwrap(), SortDirection::Asc);
        assert_eq!(view.visible()[0].name, "Deepa");
    }

    #[test]
    fn reload_drops_vanished_selection() {
        let mut view = EmployeeListView::new();
        view.load(staff());
        view.toggle_selected(&EntityId::from(2u64));
        view.toggle_selected(&EntityId::from(6u64));

        let remaining: Vec<Employee> = staff()
            .into_iter()
            .filter(|e| e.id != EntityId::from(6u64))
            .collect();
        view.load(remaining);
        assert_eq!(view.selected(), vec![EntityId::from(2u64)]);
    }
}
