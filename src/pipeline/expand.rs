use std::collections::HashSet;

use crate::model::EntityId;

/// Per-employee expanded flags. Everything starts collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<EntityId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &EntityId) -> bool {
        self.expanded.contains(id)
    }

    /// Flips one group and returns its new state.
    pub fn toggle(&mut self, id: &EntityId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    pub fn set(&mut self, id: &EntityId, expanded: bool) {
        if expanded {
            self.expanded.insert(id.clone());
        } else {
            self.expanded.remove(id);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_are_independent() {
        let mut state = ExpansionState::new();
        let (a, b) = (EntityId::from(1u64), EntityId::from(2u64));

        assert!(!state.is_expanded(&a));
        assert!(state.toggle(&a));
        assert!(state.is_expanded(&a));
        assert!(!state.is_expanded(&b));

        assert!(state.toggle(&b));
        assert!(!state.toggle(&a));
        assert!(state.is_expanded(&b));
        assert_eq!(state.len(), 1);
    }
}
