use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{Page, ProductDraft, ProductId};

pub const ADD_PRODUCT_LABEL: &str = "Add Product";
pub const UPDATE_PRODUCT_LABEL: &str = "Update Product";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.user_facing_message(),
        }
    }
}

/// A dashboard table row. `number` is 1-based; the row's index is `number - 1`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRow {
    pub number: usize,
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub category: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
    pub is_favorite: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub page: Page,
    pub page_title: String,
    pub nav_label: String,

    // Dashboard
    pub product_count: usize,
    pub rows: Vec<ProductRow>,
    pub categories: Vec<String>,
    pub form: ProductDraft,
    pub is_editing: bool,
    pub submit_label: String,

    // Storefront
    pub cards: Vec<ProductCard>,
    pub total_matches: usize,
    pub offset: usize,
    pub can_advance: bool,
    pub can_retreat: bool,

    pub error: Option<UserFacingError>,
    pub warning: Option<UserFacingError>,
}
