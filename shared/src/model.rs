use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::config::{CatalogConfig, ConfigError};
use crate::error::AppError;
use crate::pagination::PaginationWindow;
use crate::query::FilterState;
use crate::repository::Repository;

/// Stable identity for a product, assigned once at creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price exactly as entered. Form input arrives as text, older records may
/// hold JSON numbers; neither is coerced on write.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
}

impl Price {
    /// Numeric value used for ordering. Anything unparseable orders as zero.
    pub fn numeric_value(&self) -> f64 {
        let value = match self {
            Price::Number(n) => n.as_f64().unwrap_or(0.0),
            Price::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                }
            }
        };
        // -0.0 folds into 0.0 so the two tie.
        if value.is_finite() && value != 0.0 {
            value
        } else {
            0.0
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(String::new())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{n}"),
            Price::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Price {
    fn from(s: &str) -> Self {
        Price::Text(s.to_string())
    }
}

impl From<String> for Price {
    fn from(s: String) -> Self {
        Price::Text(s)
    }
}

impl From<i64> for Price {
    fn from(n: i64) -> Self {
        Price::Number(n.into())
    }
}

impl From<f64> for Price {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or_else(|| Price::Text(n.to_string()), Price::Number)
    }
}

/// Form fields for creating or updating a product.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub image_url: String,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<Price>,
        category: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            category: category.into(),
            image_url: image_url.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    // Records written before ids existed get one on load.
    #[serde(default = "ProductId::generate")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "url")]
    pub image_url: String,
}

impl Product {
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            category: draft.category,
            image_url: draft.image_url,
        }
    }

    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            price: self.price.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
        }
    }

    /// Overwrite every field except the id.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.price = draft.price;
        self.category = draft.category;
        self.image_url = draft.image_url;
    }
}

/// Whether the next form submission creates a product or updates one.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<ProductId>,
}

impl EditSession {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn editing(target: ProductId) -> Self {
        Self {
            target: Some(target),
        }
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&ProductId> {
        self.target.as_ref()
    }

    /// Current position of the target, if it still exists.
    pub fn target_index(&self, products: &[Product]) -> Option<usize> {
        let target = self.target.as_ref()?;
        products.iter().position(|p| &p.id == target)
    }
}

#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    #[default]
    Home,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        if path.to_lowercase().contains("dashboard") {
            Page::Dashboard
        } else {
            Page::Home
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Home => "Home Page",
        }
    }

    /// Label of the link to the other page.
    pub fn nav_label(self) -> &'static str {
        match self {
            Page::Dashboard => "Back to Home",
            Page::Home => "Go to Dashboard",
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub config: CatalogConfig,
    pub repository: Repository,

    // Dashboard
    pub edit_session: EditSession,
    pub form: ProductDraft,

    // Storefront
    pub filter: FilterState,
    pub pagination: PaginationWindow,
    pub favorites: HashSet<ProductId>,

    pub page: Page,
    pub active_error: Option<AppError>,
    pub active_warning: Option<AppError>,
}

impl Default for Model {
    fn default() -> Self {
        Self::with_repository(Repository::in_memory(), CatalogConfig::default())
    }
}

impl Model {
    pub fn with_repository(repository: Repository, config: CatalogConfig) -> Self {
        let mut pagination = PaginationWindow::new(config.window_size);
        pagination.on_filter_changed(repository.list_products().len());
        Self {
            config,
            repository,
            edit_session: EditSession::inactive(),
            form: ProductDraft::default(),
            filter: FilterState::default(),
            pagination,
            favorites: HashSet::new(),
            page: Page::default(),
            active_error: None,
            active_warning: None,
        }
    }

    pub fn open(
        backend: impl crate::capabilities::KvBackend + 'static,
        config: CatalogConfig,
    ) -> Result<Self, ConfigError> {
        let repository = Repository::open(backend, &config)?;
        Ok(Self::with_repository(repository, config))
    }
}
