use serde::{Deserialize, Serialize};

use crate::model::{ProductDraft, ProductId};
use crate::query::FilterState;

/// Commands from the shell. Indices refer to rows of the dashboard table as
/// last rendered.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Navigated { path: String },

    // Dashboard
    FormChanged(ProductDraft),
    ProductSubmitted(ProductDraft),
    EditRequested { index: usize },
    EditCancelled,
    DeleteRequested { index: usize },
    CategorySubmitted { name: String },

    // Storefront
    FilterChanged(FilterState),
    PaginationAdvanced,
    PaginationRetreated,
    ViewportResized { window_size: usize },
    FavoriteToggled { id: ProductId },

    StorageReloaded,
    ErrorDismissed,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Navigated { .. } => "navigated",
            Event::FormChanged(_) => "form_changed",
            Event::ProductSubmitted(_) => "product_submitted",
            Event::EditRequested { .. } => "edit_requested",
            Event::EditCancelled => "edit_cancelled",
            Event::DeleteRequested { .. } => "delete_requested",
            Event::CategorySubmitted { .. } => "category_submitted",
            Event::FilterChanged(_) => "filter_changed",
            Event::PaginationAdvanced => "pagination_advanced",
            Event::PaginationRetreated => "pagination_retreated",
            Event::ViewportResized { .. } => "viewport_resized",
            Event::FavoriteToggled { .. } => "favorite_toggled",
            Event::StorageReloaded => "storage_reloaded",
            Event::ErrorDismissed => "error_dismissed",
        }
    }
}
