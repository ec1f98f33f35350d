//! Shared core for the product catalog: an admin dashboard that creates,
//! edits and deletes products, and a storefront that filters, sorts and
//! pages through them. State persists in a local key-value store.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod store;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{CatalogConfig, ConfigError};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, CatalogError, ErrorKind, PersistenceError, ValidationError};
pub use event::Event;
pub use model::{EditSession, Model, Page, Price, Product, ProductDraft, ProductId};
pub use pagination::PaginationWindow;
pub use query::{derive, FilterState, SortOrder, ALL_CATEGORIES};
pub use repository::{Persisted, Repository};
pub use store::{Store, StoreKeys};
pub use view::{ProductCard, ProductRow, UserFacingError, ViewModel};

pub const DEFAULT_WINDOW_SIZE: usize = 3;
pub const MAX_WINDOW_SIZE: usize = 50;
pub const DEFAULT_PRODUCTS_KEY: &str = "products";
pub const DEFAULT_CATEGORIES_KEY: &str = "categories";
/// Key older builds wrote categories under. Read only.
pub const LEGACY_CATEGORIES_KEY: &str = "categorys";
