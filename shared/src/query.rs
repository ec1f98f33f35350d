use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Product;

/// Category filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(rename = "none")]
    Unsorted,
    Asc,
    Desc,
}

impl From<&str> for SortOrder {
    /// Select values other than `asc`/`desc` leave the order alone.
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => SortOrder::Unsorted,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub name_query: String,
    /// Empty or [`ALL_CATEGORIES`] disables the category filter.
    pub category: String,
    pub sort_order: SortOrder,
}

impl FilterState {
    pub fn new(
        name_query: impl Into<String>,
        category: impl Into<String>,
        sort_order: impl Into<SortOrder>,
    ) -> Self {
        Self {
            name_query: name_query.into(),
            category: category.into(),
            sort_order: sort_order.into(),
        }
    }

    fn category_filter(&self) -> Option<&str> {
        match self.category.as_str() {
            "" | ALL_CATEGORIES => None,
            c => Some(c),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Stable sort on the numeric price. Each price is parsed once.
fn sort_by_price(items: Vec<&Product>, descending: bool) -> Vec<&Product> {
    let mut keyed: Vec<(f64, &Product)> = items
        .into_iter()
        .map(|p| (p.price.numeric_value(), p))
        .collect();
    if descending {
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Products matching `filter`, in display order.
///
/// Category matching is by substring, so "Book" also selects "Notebooks".
/// Sorting is stable: equal prices keep their catalog order.
pub fn derive<'a>(products: &'a [Product], filter: &FilterState) -> Vec<&'a Product> {
    let mut result: Vec<&Product> = products.iter().collect();

    if !filter.name_query.is_empty() {
        let needle = filter.name_query.to_lowercase();
        result.retain(|p| contains_ignore_case(&p.name, &needle));
    }

    if let Some(category) = filter.category_filter() {
        let needle = category.to_lowercase();
        result.retain(|p| contains_ignore_case(&p.category, &needle));
    }

    match filter.sort_order {
        SortOrder::Asc => result = sort_by_price(result, false),
        SortOrder::Desc => result = sort_by_price(result, true),
        SortOrder::Unsorted => {}
    }

    debug!(
        total = products.len(),
        matched = result.len(),
        sort = ?filter.sort_order,
        "catalog filtered"
    );
    result
}
