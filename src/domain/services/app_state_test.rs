use anyhow::Result;
use ratatui::prelude::Rect;
use test_utils::catalog_fixture;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::list_offset;
use super::AppState;
use super::Focus;
use super::LayoutRects;
use crate::domain::models::Action;
use crate::domain::models::Catalog;
use crate::domain::models::CategoryFilter;
use crate::domain::models::CompletionResponse;
use crate::domain::models::Event;
use crate::domain::models::Product;
use crate::domain::models::RoutineError;
use crate::domain::models::SelectionSet;
use crate::domain::services::ConversationEngine;
use crate::domain::services::SELECTION_KEY;
use crate::infrastructure::storage::memory::MemoryStore;

fn catalog() -> Catalog {
    return Catalog::parse(catalog_fixture()).unwrap();
}

fn key(key: Key) -> Event {
    return Event::KeyboardCharInput(Input {
        key,
        ctrl: false,
        alt: false,
        shift: false,
    });
}

fn type_text(app_state: &mut AppState, tx: &mpsc::UnboundedSender<Action>, text: &str) {
    for char in text.chars() {
        app_state.handle_event(key(Key::Char(char)), tx).unwrap();
    }
}

fn app_state(storage: &MemoryStore) -> AppState<'static> {
    let mut app_state = AppState::new(Box::new(storage.clone()), ConversationEngine::default());
    app_state.handle_catalog_loaded(CategoryFilter::None, Ok(catalog()));

    return app_state;
}

/// Loads the cleanser category, which shows products 1 and 9.
fn with_cleansers(app_state: &mut AppState) {
    app_state.requested_filter = CategoryFilter::Category("cleanser".to_string());
    app_state.handle_catalog_loaded(
        CategoryFilter::Category("cleanser".to_string()),
        Ok(catalog()),
    );
}

fn rects() -> LayoutRects {
    return LayoutRects {
        categories: Rect::new(1, 1, 18, 20),
        products: Rect::new(21, 1, 38, 20),
        selected: Rect::new(61, 1, 38, 8),
        chat: Rect::new(61, 11, 38, 10),
        input: Rect::new(60, 22, 40, 3),
        overlay: Rect::default(),
        overlay_content: Rect::default(),
    };
}

fn sent_action(rx: &mut mpsc::UnboundedReceiver<Action>) -> Option<Action> {
    return rx.try_recv().ok();
}

#[test]
fn it_keeps_cursor_on_screen() {
    assert_eq!(list_offset(0, 5), 0);
    assert_eq!(list_offset(4, 5), 0);
    assert_eq!(list_offset(7, 5), 3);
    assert_eq!(list_offset(3, 0), 3);
}

mod catalog {
    use super::*;

    #[test]
    fn it_requests_full_catalog_on_start() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::new(Box::<MemoryStore>::default(), ConversationEngine::default());
        app_state.start(&tx)?;

        assert!(matches!(
            sent_action(&mut rx),
            Some(Action::LoadCatalog(CategoryFilter::None))
        ));

        return Ok(());
    }

    #[test]
    fn it_fills_categories_without_showing_products() {
        let app_state = app_state(&MemoryStore::default());

        assert_eq!(app_state.categories, vec!["cleanser", "moisturizer", "suncare"]);
        assert!(app_state.visible.is_empty());
        assert_eq!(app_state.filter, CategoryFilter::None);
    }

    #[test]
    fn it_loads_category_on_enter() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());

        app_state.handle_event(key(Key::Down), &tx)?;
        app_state.handle_event(key(Key::Enter), &tx)?;

        let Some(Action::LoadCatalog(filter)) = sent_action(&mut rx) else {
            panic!("expected a catalog load");
        };
        assert_eq!(filter, CategoryFilter::Category("moisturizer".to_string()));

        app_state.handle_event(Event::CatalogLoaded(filter, Ok(catalog())), &tx)?;
        let ids = app_state.visible.iter().map(|e| return e.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 7]);

        return Ok(());
    }

    #[test]
    fn it_ignores_superseded_category_loads() {
        let mut app_state = app_state(&MemoryStore::default());
        app_state.requested_filter = CategoryFilter::Category("suncare".to_string());

        app_state.handle_catalog_loaded(
            CategoryFilter::Category("cleanser".to_string()),
            Ok(catalog()),
        );

        assert!(app_state.visible.is_empty());
        assert_eq!(app_state.filter, CategoryFilter::None);
    }

    #[test]
    fn it_keeps_grid_when_load_fails() {
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);

        let err = RoutineError::CatalogLoadFailed("connection refused".to_string());
        app_state.handle_catalog_loaded(
            CategoryFilter::Category("suncare".to_string()),
            Err(err.clone()),
        );

        assert_eq!(app_state.visible.len(), 2);
        assert_eq!(app_state.notice, Some(err.to_string()));
    }

    #[test]
    fn it_revalidates_restored_selection_once() -> Result<()> {
        let mut missing = catalog().get(1).unwrap().clone();
        missing.id = 99;
        let kept: Product = catalog().get(3).unwrap().clone();
        let payload = SelectionSet::from_products(vec![missing, kept]).to_json()?;
        let storage = MemoryStore::with_slot(SELECTION_KEY, &payload);

        let mut app_state = app_state(&storage);
        assert_eq!(app_state.selection.selection().ids(), vec![3]);
        assert_eq!(storage.writes(), 1);

        app_state.handle_catalog_loaded(CategoryFilter::None, Ok(Catalog::default()));
        assert_eq!(app_state.selection.selection().ids(), vec![3]);
        assert_eq!(storage.writes(), 1);

        return Ok(());
    }
}

mod selection {
    use super::*;

    #[test]
    fn it_toggles_product_under_cursor() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let storage = MemoryStore::default();
        let mut app_state = app_state(&storage);
        with_cleansers(&mut app_state);

        app_state.handle_event(key(Key::Tab), &tx)?;
        assert_eq!(app_state.focus, Focus::Products);

        app_state.handle_event(key(Key::Down), &tx)?;
        app_state.handle_event(key(Key::Enter), &tx)?;
        assert_eq!(app_state.selection.selection().ids(), vec![9]);
        assert_eq!(storage.writes(), 1);

        app_state.handle_event(key(Key::Char(' ')), &tx)?;
        assert!(app_state.selection.selection().is_empty());
        assert_eq!(storage.writes(), 2);

        return Ok(());
    }

    #[test]
    fn it_removes_and_clears_selected_items() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.toggle_product(0);
        app_state.toggle_product(1);

        app_state.focus = Focus::Selected;
        app_state.handle_event(key(Key::Down), &tx)?;
        app_state.handle_event(key(Key::Char('x')), &tx)?;
        assert_eq!(app_state.selection.selection().ids(), vec![1]);
        assert_eq!(app_state.selected_cursor, 0);

        app_state.toggle_product(1);
        app_state.handle_event(key(Key::Char('c')), &tx)?;
        assert!(app_state.selection.selection().is_empty());

        return Ok(());
    }
}

mod description {
    use super::*;

    #[test]
    fn it_opens_and_closes_with_keys() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.focus = Focus::Products;

        app_state.handle_event(key(Key::Char('d')), &tx)?;
        assert_eq!(app_state.description.current().map(|e| return e.id), Some(1));

        // Selection keys are ignored while the overlay is open.
        app_state.handle_event(key(Key::Char(' ')), &tx)?;
        assert!(app_state.selection.selection().is_empty());

        app_state.handle_event(key(Key::Esc), &tx)?;
        assert!(!app_state.description.is_open());

        return Ok(());
    }

    #[test]
    fn it_opens_from_card_affordance_without_toggling() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.rects = rects();

        // Second row, right-most column of the products pane.
        app_state.handle_event(Event::MouseClick(58, 2), &tx)?;

        assert_eq!(app_state.description.current().map(|e| return e.id), Some(9));
        assert!(app_state.selection.selection().is_empty());

        return Ok(());
    }

    #[test]
    fn it_closes_on_background_click_only() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.rects = rects();
        app_state.show_description(catalog().get(1).cloned());
        app_state.rects.overlay = Rect::new(0, 0, 100, 25);
        app_state.rects.overlay_content = Rect::new(20, 6, 60, 12);

        app_state.handle_event(Event::MouseClick(30, 8), &tx)?;
        assert!(app_state.description.is_open());

        // Lands on a product card behind the overlay, which must not toggle.
        app_state.handle_event(Event::MouseClick(22, 1), &tx)?;
        assert!(!app_state.description.is_open());
        assert!(app_state.selection.selection().is_empty());

        return Ok(());
    }
}

mod clicks {
    use super::*;

    #[test]
    fn it_toggles_card_on_click() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.rects = rects();

        app_state.handle_event(Event::MouseClick(22, 1), &tx)?;

        assert_eq!(app_state.focus, Focus::Products);
        assert_eq!(app_state.selection.selection().ids(), vec![1]);

        // Below the last card.
        app_state.handle_event(Event::MouseClick(22, 10), &tx)?;
        assert_eq!(app_state.selection.selection().ids(), vec![1]);

        return Ok(());
    }

    #[test]
    fn it_removes_selected_item_on_remove_click() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_cleansers(&mut app_state);
        app_state.rects = rects();
        app_state.toggle_product(0);

        app_state.handle_event(Event::MouseClick(62, 1), &tx)?;
        assert_eq!(app_state.selection.selection().len(), 1);
        assert_eq!(app_state.focus, Focus::Selected);

        app_state.handle_event(Event::MouseClick(97, 1), &tx)?;
        assert!(app_state.selection.selection().is_empty());

        return Ok(());
    }

    #[test]
    fn it_selects_category_on_click() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        app_state.rects = rects();

        app_state.handle_event(Event::MouseClick(2, 3), &tx)?;

        let Some(Action::LoadCatalog(filter)) = sent_action(&mut rx) else {
            panic!("expected a catalog load");
        };
        assert_eq!(filter, CategoryFilter::Category("suncare".to_string()));
        assert_eq!(app_state.category_cursor, 2);

        return Ok(());
    }
}

mod conversation {
    use super::*;

    fn with_routine(app_state: &mut AppState, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        with_cleansers(app_state);
        app_state.toggle_product(0);
        app_state.handle_event(key(Key::Char('g')), tx)?;

        return Ok(());
    }

    #[test]
    fn it_shows_notice_for_empty_selection() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());

        app_state.handle_event(key(Key::Char('g')), &tx)?;

        assert!(sent_action(&mut rx).is_none());
        assert_eq!(
            app_state.notice,
            Some(RoutineError::EmptySelection.to_string())
        );

        return Ok(());
    }

    #[test]
    fn it_generates_and_applies_routine() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;

        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        assert_eq!(req.turns.len(), 2);
        assert!(app_state.conversation.is_pending());

        app_state.handle_event(
            Event::CompletionResponse(CompletionResponse {
                id: req.id,
                result: Ok("Cleanse twice a day.".to_string()),
            }),
            &tx,
        )?;

        assert_eq!(app_state.conversation.transcript().len(), 3);
        assert!(app_state.notice.is_none());

        return Ok(());
    }

    #[test]
    fn it_shows_generation_failure() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;
        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };

        let err = RoutineError::GenerationFailed("status 500".to_string());
        app_state.handle_completion_response(CompletionResponse {
            id: req.id,
            result: Err(err.clone()),
        });

        assert_eq!(app_state.notice, Some(err.to_string()));
        assert!(app_state.conversation.transcript().is_empty());

        return Ok(());
    }

    #[test]
    fn it_submits_follow_up_from_chat_input() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;
        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        app_state.handle_completion_response(CompletionResponse {
            id: req.id,
            result: Ok("Cleanse twice a day.".to_string()),
        });

        app_state.handle_event(key(Key::Char('i')), &tx)?;
        assert_eq!(app_state.focus, Focus::Chat);

        type_text(&mut app_state, &tx, "Can I use it at night?");
        app_state.handle_event(key(Key::Enter), &tx)?;

        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        assert_eq!(req.turns.len(), 4);
        assert_eq!(req.turns[3].content, "Can I use it at night?");
        assert_eq!(app_state.textarea.lines().join(""), "");

        return Ok(());
    }

    #[test]
    fn it_rejects_off_topic_follow_up() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;
        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        app_state.handle_completion_response(CompletionResponse {
            id: req.id,
            result: Ok("Cleanse twice a day.".to_string()),
        });

        app_state.handle_event(key(Key::Char('i')), &tx)?;
        type_text(&mut app_state, &tx, "Who won the game?");
        app_state.handle_event(key(Key::Enter), &tx)?;

        assert!(sent_action(&mut rx).is_none());
        assert_eq!(app_state.notice, Some(RoutineError::OffTopic.to_string()));
        assert_eq!(app_state.textarea.lines().join(""), "Who won the game?");

        return Ok(());
    }

    #[test]
    fn it_holds_follow_up_until_routine_arrives() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;
        let Some(Action::CompletionRequest(gen)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };

        app_state.handle_event(key(Key::Char('i')), &tx)?;
        type_text(&mut app_state, &tx, "Can I use it on my skin at night?");
        app_state.handle_event(key(Key::Enter), &tx)?;

        assert!(sent_action(&mut rx).is_none());
        assert_eq!(
            app_state.notice,
            Some(RoutineError::RequestInFlight.to_string())
        );
        assert_eq!(
            app_state.textarea.lines().join(""),
            "Can I use it on my skin at night?"
        );

        app_state.handle_completion_response(CompletionResponse {
            id: gen.id,
            result: Ok("Cleanse twice a day.".to_string()),
        });
        assert_eq!(app_state.conversation.transcript().len(), 3);
        assert!(app_state.notice.is_none());

        app_state.handle_event(key(Key::Enter), &tx)?;
        let Some(Action::CompletionRequest(req)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        assert_eq!(req.turns.len(), 4);

        return Ok(());
    }

    #[test]
    fn it_applies_only_latest_routine_on_repeated_generate() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(&MemoryStore::default());
        with_routine(&mut app_state, &tx)?;
        let Some(Action::CompletionRequest(first)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };

        app_state.handle_event(key(Key::Char('g')), &tx)?;
        let Some(Action::CompletionRequest(second)) = sent_action(&mut rx) else {
            panic!("expected a completion request");
        };
        assert!(second.id > first.id);

        app_state.handle_completion_response(CompletionResponse {
            id: second.id,
            result: Ok("Second routine.".to_string()),
        });
        app_state.handle_completion_response(CompletionResponse {
            id: first.id,
            result: Ok("First routine.".to_string()),
        });

        let turns = app_state.conversation.transcript().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].content, "Second routine.");
        assert!(!app_state.conversation.is_pending());

        return Ok(());
    }
}

#[test]
fn it_quits_on_ctrl_c() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel::<Action>();
    let mut app_state = app_state(&MemoryStore::default());

    assert!(!app_state.handle_event(Event::UITick(), &tx)?);
    assert!(app_state.handle_event(Event::KeyboardCTRLC(), &tx)?);

    return Ok(());
}
