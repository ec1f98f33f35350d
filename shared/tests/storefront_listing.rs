use crux_core::testing::AppTester;
use shared::{App, Effect, Event, FilterState, Model, Page, ProductDraft};

fn add(app: &AppTester<App, Effect>, model: &mut Model, name: &str, price: &str, category: &str) {
    let _ = app.update(
        Event::ProductSubmitted(ProductDraft::new(name, price, category, "")),
        model,
    );
}

fn card_names(app: &AppTester<App, Effect>, model: &Model) -> Vec<String> {
    app.view(model).cards.into_iter().map(|c| c.name).collect()
}

#[test]
fn filter_then_sort_scenario() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    add(&app, &mut model, "A", "20", "X");
    add(&app, &mut model, "B", "5", "Y");

    let _ = app.update(Event::FilterChanged(FilterState::new("", "X", "none")), &mut model);
    assert_eq!(card_names(&app, &model), vec!["A"]);

    let _ = app.update(Event::FilterChanged(FilterState::new("", "", "desc")), &mut model);
    assert_eq!(card_names(&app, &model), vec!["A", "B"]);

    let _ = app.update(Event::FilterChanged(FilterState::new("", "all", "asc")), &mut model);
    assert_eq!(card_names(&app, &model), vec!["B", "A"]);
}

#[test]
fn carousel_pages_one_card_at_a_time() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        add(&app, &mut model, name, &i.to_string(), "X");
    }

    let view = app.view(&model);
    assert_eq!(view.total_matches, 5);
    assert_eq!(view.cards.len(), 3);
    assert!(!view.can_retreat);
    assert!(view.can_advance);

    let mut offsets = vec![view.offset];
    for _ in 0..3 {
        let _ = app.update(Event::PaginationAdvanced, &mut model);
        offsets.push(app.view(&model).offset);
    }
    assert_eq!(offsets, vec![0, 1, 2, 2]);
    assert_eq!(card_names(&app, &model), vec!["c", "d", "e"]);
    assert!(!app.view(&model).can_advance);

    let _ = app.update(Event::PaginationRetreated, &mut model);
    assert_eq!(card_names(&app, &model), vec!["b", "c", "d"]);

    // Any refilter returns to the first card.
    let _ = app.update(Event::FilterChanged(FilterState::new("", "", "desc")), &mut model);
    let view = app.view(&model);
    assert_eq!(view.offset, 0);
    assert_eq!(card_names(&app, &model), vec!["e", "d", "c"]);
}

#[test]
fn resize_clamps_the_window() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    for name in ["a", "b", "c", "d"] {
        add(&app, &mut model, name, "1", "X");
    }
    let _ = app.update(Event::PaginationAdvanced, &mut model);
    assert_eq!(app.view(&model).offset, 1);

    let _ = app.update(Event::ViewportResized { window_size: 4 }, &mut model);
    let view = app.view(&model);
    assert_eq!(view.offset, 0);
    assert_eq!(view.cards.len(), 4);
    assert!(!view.can_advance);
}

#[test]
fn favorites_toggle_and_drop_with_product() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    add(&app, &mut model, "Lamp", "20", "Home");

    let id = app.view(&model).cards[0].id.clone();
    let _ = app.update(Event::FavoriteToggled { id: id.clone() }, &mut model);
    assert!(app.view(&model).cards[0].is_favorite);

    let _ = app.update(Event::FavoriteToggled { id: id.clone() }, &mut model);
    assert!(!app.view(&model).cards[0].is_favorite);

    let _ = app.update(Event::FavoriteToggled { id: id.clone() }, &mut model);
    let _ = app.update(Event::DeleteRequested { index: 0 }, &mut model);
    assert!(!model.favorites.contains(&id));
    assert!(app.view(&model).cards.is_empty());
}

#[test]
fn navigation_sets_page_chrome() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let _ = app.update(Event::Navigated { path: "/dashboard.html".into() }, &mut model);
    let view = app.view(&model);
    assert_eq!(view.page, Page::Dashboard);
    assert_eq!(view.page_title, "Dashboard");
    assert_eq!(view.nav_label, "Back to Home");

    let _ = app.update(Event::Navigated { path: "/index.html".into() }, &mut model);
    let view = app.view(&model);
    assert_eq!(view.page, Page::Home);
    assert_eq!(view.nav_label, "Go to Dashboard");
}
