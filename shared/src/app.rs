use tracing::{debug, info};

use crate::capabilities::Capabilities;
use crate::error::{AppError, PersistenceError};
use crate::event::Event;
use crate::model::{EditSession, Model, Page, ProductDraft};
use crate::query;
use crate::view::{
    ProductCard, ProductRow, UserFacingError, ViewModel, ADD_PRODUCT_LABEL, UPDATE_PRODUCT_LABEL,
};

#[derive(Default)]
pub struct App;

impl App {
    fn record_warning(model: &mut Model, warning: Option<PersistenceError>) {
        model.active_warning = warning.map(AppError::from);
    }

    fn fail(model: &mut Model, error: impl Into<AppError>) {
        let error = error.into();
        info!(code = error.code(), message = %error.message, "command rejected");
        model.active_error = Some(error);
    }

    /// Recompute the storefront selection and return the carousel to the start.
    fn refresh_listing(model: &mut Model) {
        let matches = query::derive(model.repository.list_products(), &model.filter).len();
        model.pagination.on_filter_changed(matches);
    }

    fn clear_edit(model: &mut Model) {
        if model.edit_session.is_active() {
            model.form = ProductDraft::default();
        }
        model.edit_session = EditSession::inactive();
    }

    fn submit_product(model: &mut Model, draft: ProductDraft) {
        let session = std::mem::take(&mut model.edit_session);
        match model.repository.upsert_product(draft, session) {
            Ok(persisted) => {
                model.edit_session = persisted.value;
                model.form = ProductDraft::default();
                Self::record_warning(model, persisted.warning);
                Self::refresh_listing(model);
            }
            Err(e) => Self::fail(model, e),
        }
    }

    fn request_edit(model: &mut Model, index: usize) {
        match model.repository.begin_edit(index) {
            Ok((session, prefill)) => {
                model.edit_session = session;
                model.form = prefill;
            }
            Err(e) => Self::fail(model, e),
        }
    }

    fn request_delete(model: &mut Model, index: usize) {
        match model.repository.delete_product(index) {
            Ok(persisted) => {
                model.favorites.remove(&persisted.value.id);
                Self::clear_edit(model);
                Self::record_warning(model, persisted.warning);
                Self::refresh_listing(model);
            }
            Err(e) => Self::fail(model, e),
        }
    }

    fn submit_category(model: &mut Model, name: &str) {
        match model.repository.add_category(name) {
            Ok(persisted) => Self::record_warning(model, persisted.warning),
            Err(e) => Self::fail(model, e),
        }
    }

    fn reload(model: &mut Model) {
        model.repository.reload();
        let repository = &model.repository;
        model.favorites.retain(|id| repository.product(id).is_some());
        Self::clear_edit(model);
        Self::refresh_listing(model);
    }

    fn build_rows(model: &Model) -> Vec<ProductRow> {
        model
            .repository
            .list_products()
            .iter()
            .enumerate()
            .map(|(index, p)| ProductRow {
                number: index + 1,
                id: p.id.clone(),
                name: p.name.clone(),
                price: p.price.to_string(),
                category: p.category.clone(),
            })
            .collect()
    }

    fn build_cards(model: &Model) -> Vec<ProductCard> {
        let filtered = query::derive(model.repository.list_products(), &model.filter);
        model
            .pagination
            .slice(&filtered)
            .iter()
            .map(|p| ProductCard {
                id: p.id.clone(),
                name: p.name.clone(),
                price: p.price.to_string(),
                category: p.category.clone(),
                image_url: p.image_url.clone(),
                is_favorite: model.favorites.contains(&p.id),
            })
            .collect()
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "handling event");

        if !matches!(event, Event::FormChanged(_)) {
            model.active_error = None;
        }

        match event {
            Event::Navigated { path } => {
                model.page = Page::from_path(&path);
            }

            Event::FormChanged(draft) => {
                model.form = draft;
            }

            Event::ProductSubmitted(draft) => Self::submit_product(model, draft),

            Event::EditRequested { index } => Self::request_edit(model, index),

            Event::EditCancelled => Self::clear_edit(model),

            Event::DeleteRequested { index } => Self::request_delete(model, index),

            Event::CategorySubmitted { name } => Self::submit_category(model, &name),

            Event::FilterChanged(filter) => {
                model.filter = filter;
                Self::clear_edit(model);
                Self::refresh_listing(model);
            }

            Event::PaginationAdvanced => {
                model.pagination.advance();
            }

            Event::PaginationRetreated => {
                model.pagination.retreat();
            }

            Event::ViewportResized { window_size } => {
                model.pagination.on_resize(window_size);
            }

            Event::FavoriteToggled { id } => {
                if model.repository.product(&id).is_some() && !model.favorites.remove(&id) {
                    model.favorites.insert(id);
                }
            }

            Event::StorageReloaded => Self::reload(model),

            Event::ErrorDismissed => {
                model.active_warning = None;
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let is_editing = model.edit_session.is_active();
        ViewModel {
            page: model.page,
            page_title: model.page.title().to_string(),
            nav_label: model.page.nav_label().to_string(),

            product_count: model.repository.list_products().len(),
            rows: Self::build_rows(model),
            categories: model.repository.list_categories().to_vec(),
            form: model.form.clone(),
            is_editing,
            submit_label: if is_editing {
                UPDATE_PRODUCT_LABEL
            } else {
                ADD_PRODUCT_LABEL
            }
            .to_string(),

            cards: Self::build_cards(model),
            total_matches: model.pagination.len(),
            offset: model.pagination.offset(),
            can_advance: model.pagination.can_advance(),
            can_retreat: model.pagination.can_retreat(),

            error: model.active_error.as_ref().map(UserFacingError::from),
            warning: model.active_warning.as_ref().map(UserFacingError::from),
        }
    }
}
