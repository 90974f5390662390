use super::poll::{normalize_category, Poll};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub polls: Vec<Poll>,
}

/// Groups polls by category, groups sorted alphabetically, newest poll first inside a group.
pub fn group_by_category(polls: Vec<Poll>) -> Vec<CategoryGroup> {
    let mut groups: BTreeMap<String, Vec<Poll>> = BTreeMap::new();
    for poll in polls {
        let category = normalize_category(Some(&poll.category));
        groups.entry(category).or_default().push(poll);
    }

    let mut groups: Vec<CategoryGroup> = groups
        .into_iter()
        .map(|(category, mut polls)| {
            polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            CategoryGroup { category, polls }
        })
        .collect();

    groups.sort_by(|a, b| {
        a.category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.category.cmp(&b.category))
    });
    groups
}

/// Which category groups are open; each toggles independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryExpansion {
    expanded: BTreeSet<String>,
}

impl CategoryExpansion {
    pub fn toggle(&mut self, category: &str) {
        if !self.expanded.remove(category) {
            self.expanded.insert(category.to_string());
        }
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded.contains(category)
    }
}
