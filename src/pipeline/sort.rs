use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::model::EntityId;
use crate::pipeline::group::GroupedRow;

/// Sortable columns of the grouped payroll table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Id,
    Gross,
    Tax,
    Net,
    Count,
    PayDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Active sort. `None` keeps the source order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState(Option<(SortKey, SortDirection)>);

impl SortState {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        Self(Some((key, direction)))
    }

    pub fn key(&self) -> Option<SortKey> {
        self.0.map(|(k, _)| k)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.0.map(|(_, d)| d)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Header click: the same column cycles none, asc, desc, none; another
    /// column starts over at asc.
    pub fn click(&mut self, key: SortKey) {
        self.0 = match self.0 {
            Some((current, SortDirection::Asc)) if current == key => {
                Some((key, SortDirection::Desc))
            }
            Some((current, SortDirection::Desc)) if current == key => None,
            _ => Some((key, SortDirection::Asc)),
        };
    }
}

/// Orders two ids numerically when both parse, lexically otherwise.
pub fn compare_ids(a: &EntityId, b: &EntityId) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.as_str().cmp(b.as_str()),
    }
}

pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_groups(a: &GroupedRow, b: &GroupedRow, key: SortKey, dir: SortDirection) -> Ordering {
    match key {
        SortKey::Name => dir.apply(compare_text(
            a.employee.name.as_deref().unwrap_or_default(),
            b.employee.name.as_deref().unwrap_or_default(),
        )),
        SortKey::Id => dir.apply(compare_ids(a.id(), b.id())),
        SortKey::Gross => dir.apply(a.total_gross.total_cmp(&b.total_gross)),
        SortKey::Tax => dir.apply(a.total_tax.total_cmp(&b.total_tax)),
        SortKey::Net => dir.apply(a.total_net.total_cmp(&b.total_net)),
        SortKey::Count => dir.apply(a.count().cmp(&b.count())),
        // Groups without any valid date go last in both directions.
        SortKey::PayDate => match (a.latest_pay_date(), b.latest_pay_date()) {
            (Some(x), Some(y)) => dir.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Stable sort of `groups` by the active state; no-op when unsorted.
pub fn sort_groups(groups: &mut [GroupedRow], state: SortState) {
    if let Some((key, dir)) = state.0 {
        groups.sort_by(|a, b| compare_groups(a, b, key, dir));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PayrollRecord;
    use crate::pipeline::group::group_by_employee;
    use serde_json::json;
    use std::str::FromStr;

    fn row(emp: &str, name: &str, gross: f64, pay_date: Option<&str>) -> PayrollRecord {
        serde_json::from_value(json!({
            "id": 0,
            "employee": {"id": emp, "name": name},
            "grossSalary": gross,
            "payDate": pay_date,
        }))
        .unwrap()
    }

    fn ids(groups: &[GroupedRow]) -> Vec<String> {
        groups.iter().map(|g| g.id().to_string()).collect()
    }

    #[test]
    fn click_cycles_through_three_states() {
        let mut state = SortState::none();
        state.click(SortKey::Gross);
        assert_eq!(state, SortState::by(SortKey::Gross, SortDirection::Asc));
        state.click(SortKey::Gross);
        assert_eq!(state, SortState::by(SortKey::Gross, SortDirection::Desc));
        state.click(SortKey::Gross);
        assert!(state.is_none());
    }

    #[test]
    fn other_column_resets_to_asc() {
        let mut state = SortState::by(SortKey::Gross, SortDirection::Desc);
        state.click(SortKey::Name);
        assert_eq!(state, SortState::by(SortKey::Name, SortDirection::Asc));
    }

    #[test]
    fn gross_desc_puts_bigger_group_first() {
        let records = vec![
            row("1", "a", 100.0, None),
            row("1", "a", 50.0, None),
            row("2", "b", 200.0, None),
        ];
        let mut groups = group_by_employee(&records);
        sort_groups(&mut groups, SortState::by(SortKey::Gross, SortDirection::Desc));
        assert_eq!(ids(&groups), ["2", "1"]);
    }

    #[test]
    fn name_is_case_insensitive() {
        let records = vec![
            row("1", "bob", 0.0, None),
            row("2", "Alice", 0.0, None),
            row("3", "carol", 0.0, None),
        ];
        let mut groups = group_by_employee(&records);
        sort_groups(&mut groups, SortState::by(SortKey::Name, SortDirection::Asc));
        assert_eq!(ids(&groups), ["2", "1", "3"]);
    }

    #[test]
    fn ids_compare_numerically_then_lexically() {
        let records = vec![row("10", "", 0.0, None), row("9", "", 0.0, None)];
        let mut groups = group_by_employee(&records);
        sort_groups(&mut groups, SortState::by(SortKey::Id, SortDirection::Asc));
        assert_eq!(ids(&groups), ["9", "10"]);

        assert_eq!(
            compare_ids(&EntityId::from("b7"), &EntityId::from("a9")),
            Ordering::Greater
        );
    }

    #[test]
    fn missing_pay_dates_sort_last_in_both_directions() {
        let records = vec![
            row("1", "", 0.0, Some("garbage")),
            row("2", "", 0.0, Some("2024-01-31")),
            row("3", "", 0.0, Some("2024-03-31T00:00:00Z")),
        ];
        let mut groups = group_by_employee(&records);

        sort_groups(&mut groups, SortState::by(SortKey::PayDate, SortDirection::Asc));
        assert_eq!(ids(&groups), ["2", "3", "1"]);

        sort_groups(&mut groups, SortState::by(SortKey::PayDate, SortDirection::Desc));
        assert_eq!(ids(&groups), ["3", "2", "1"]);
    }

    #[test]
    fn equal_keys_keep_source_order() {
        let records = vec![
            row("1", "", 5.0, None),
            row("2", "", 5.0, None),
            row("3", "", 1.0, None),
        ];
        let mut groups = group_by_employee(&records);
        sort_groups(&mut groups, SortState::by(SortKey::Gross, SortDirection::Desc));
        assert_eq!(ids(&groups), ["1", "2", "3"]);
    }

    #[test]
    fn keys_parse_from_column_names() {
        assert_eq!(SortKey::from_str("payDate").unwrap(), SortKey::PayDate);
        assert_eq!(SortKey::Count.to_string(), "count");
        assert_eq!(SortDirection::from_str("desc").unwrap(), SortDirection::Desc);
    }
}
