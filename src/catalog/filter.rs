//! Menu category filter

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::{Catalog, MenuItem};

/// Which part of the menu is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every item, no filtering.
    #[default]
    All,

    /// Only items whose category matches exactly.
    Only(String),
}

impl CategoryFilter {
    /// Whether `item` passes the filter.
    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }
}

impl Catalog {
    /// Category labels for the filter bar: the "all" label first, then each
    /// distinct category in order of first appearance on the menu.
    pub fn categories(&self) -> SmallVec<[&str; 8]> {
        let mut seen = FxHashSet::default();
        let mut labels: SmallVec<[&str; 8]> = SmallVec::new();

        labels.push(self.all_label());

        for item in &self.items {
            if seen.insert(item.category.as_str()) {
                labels.push(item.category.as_str());
            }
        }

        labels
    }

    /// Translate a filter-bar label into a filter. The catalog's "all" label
    /// selects everything; any other label is an exact category match.
    pub fn category_filter(&self, label: &str) -> CategoryFilter {
        if label == self.all_label() {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(label.to_string())
        }
    }

    /// Items passing `filter`, in menu order.
    pub fn filtered<'c>(
        &'c self,
        filter: &'c CategoryFilter,
    ) -> impl Iterator<Item = &'c Arc<MenuItem>> + 'c {
        self.items.iter().filter(move |item| filter.matches(item))
    }
}
