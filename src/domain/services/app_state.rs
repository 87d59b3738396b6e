#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::CardClick;
use super::ConversationEngine;
use super::DescriptionViewer;
use super::Renderer;
use super::Scroll;
use super::SelectionChange;
use super::SelectionStore;
use super::INFO_AFFORDANCE_WIDTH;
use crate::domain::models::Action;
use crate::domain::models::Catalog;
use crate::domain::models::CategoryFilter;
use crate::domain::models::CompletionResponse;
use crate::domain::models::Event;
use crate::domain::models::KeyValueStoreBox;
use crate::domain::models::Product;
use crate::domain::models::RoutineError;
use crate::domain::models::TextArea;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Products,
    Selected,
    Chat,
}

impl Focus {
    fn next(&self) -> Focus {
        match self {
            Focus::Categories => return Focus::Products,
            Focus::Products => return Focus::Selected,
            Focus::Selected => return Focus::Chat,
            Focus::Chat => return Focus::Categories,
        }
    }
}

/// Screen areas from the last draw, used to resolve mouse clicks. List areas
/// are the inner areas without borders.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutRects {
    pub categories: Rect,
    pub products: Rect,
    pub selected: Rect,
    pub chat: Rect,
    pub input: Rect,
    pub overlay: Rect,
    pub overlay_content: Rect,
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    return column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height);
}

/// First visible row of a list so the cursor stays on screen.
pub fn list_offset(cursor: usize, height: u16) -> usize {
    let height = usize::from(height.max(1));
    return cursor.saturating_sub(height - 1);
}

pub struct AppState<'a> {
    pub catalog: Catalog,
    pub categories: Vec<String>,
    pub category_cursor: usize,
    pub filter: CategoryFilter,
    pub requested_filter: CategoryFilter,
    pub visible: Vec<Product>,
    pub product_cursor: usize,
    pub selected_cursor: usize,
    pub selection: SelectionStore,
    pub description: DescriptionViewer,
    pub conversation: ConversationEngine,
    pub notice: Option<String>,
    pub focus: Focus,
    pub textarea: tui_textarea::TextArea<'a>,
    pub scroll: Scroll,
    pub rects: LayoutRects,
    pub needs_render: bool,
    catalog_loaded: bool,
    selection_changes: mpsc::UnboundedReceiver<SelectionChange>,
}

impl<'a> AppState<'a> {
    pub fn new(storage: KeyValueStoreBox, conversation: ConversationEngine) -> AppState<'a> {
        let mut selection = SelectionStore::load(storage);
        let selection_changes = selection.subscribe();

        return AppState {
            catalog: Catalog::default(),
            categories: vec![],
            category_cursor: 0,
            filter: CategoryFilter::None,
            requested_filter: CategoryFilter::None,
            visible: vec![],
            product_cursor: 0,
            selected_cursor: 0,
            selection,
            description: DescriptionViewer::default(),
            conversation,
            notice: None,
            focus: Focus::Categories,
            textarea: TextArea::default(),
            scroll: Scroll::default(),
            rects: LayoutRects::default(),
            needs_render: true,
            catalog_loaded: false,
            selection_changes,
        };
    }

    /// Requests the first catalog load, which fills the category selector and
    /// revalidates the restored selection.
    pub fn start(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        tx.send(Action::LoadCatalog(CategoryFilter::None))?;
        return Ok(());
    }

    /// Returns true when the app should exit.
    pub fn handle_event(&mut self, event: Event, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if !matches!(event, Event::UITick()) {
            self.needs_render = true;
        }

        match event {
            Event::KeyboardCTRLC() => {
                return Ok(true);
            }
            Event::CatalogLoaded(filter, res) => {
                self.handle_catalog_loaded(filter, res);
            }
            Event::CompletionResponse(res) => {
                self.handle_completion_response(res);
            }
            Event::KeyboardCharInput(input) => {
                self.handle_input(input, tx)?;
            }
            Event::KeyboardPaste(text) => {
                if self.focus == Focus::Chat {
                    for char in text.replace('\n', " ").chars() {
                        self.textarea.input(Input {
                            key: Key::Char(char),
                            ctrl: false,
                            alt: false,
                            shift: false,
                        });
                    }
                }
            }
            Event::MouseClick(column, row) => {
                self.handle_click(column, row, tx)?;
            }
            Event::UIScrollUp() => {
                self.scroll.up();
            }
            Event::UIScrollDown() => {
                self.scroll.down();
            }
            Event::UIResize() | Event::UITick() => (),
        }

        self.drain_selection_changes();
        return Ok(false);
    }

    fn drain_selection_changes(&mut self) {
        while let Ok(change) = self.selection_changes.try_recv() {
            tracing::debug!(change = ?change, "Selection changed");
            self.needs_render = true;
        }

        let len = self.selection.selection().len();
        if self.selected_cursor >= len {
            self.selected_cursor = len.saturating_sub(1);
        }
    }

    pub fn handle_catalog_loaded(&mut self, filter: CategoryFilter, res: Result<Catalog, RoutineError>) {
        let catalog = match res {
            Ok(catalog) => catalog,
            Err(err) => {
                // Leave the previous grid in place.
                self.set_notice(err);
                return;
            }
        };

        if !self.catalog_loaded {
            self.catalog_loaded = true;
            if let Err(err) = self.selection.revalidate(&catalog) {
                self.notice = Some(format!("Unable to save your selection: {err}"));
            }
        }

        tracing::debug!(products = catalog.len(), filter = %filter, "Catalog loaded");
        self.categories = catalog.categories();
        if filter == self.requested_filter {
            self.visible = catalog.filter(&filter);
            self.filter = filter;
            self.product_cursor = 0;
        }
        self.catalog = catalog;
        self.needs_render = true;
    }

    pub fn handle_completion_response(&mut self, res: CompletionResponse) {
        match self.conversation.handle_completion(res.id, res.result) {
            Ok(true) => {
                self.notice = None;
                self.scroll.last();
            }
            Ok(false) => (),
            Err(err) => {
                self.set_notice(err);
            }
        }

        self.needs_render = true;
    }

    fn set_notice(&mut self, err: RoutineError) {
        tracing::debug!(error = %err, "Showing notice");
        self.notice = Some(err.to_string());
        self.needs_render = true;
    }

    pub fn select_category(&mut self, idx: usize, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        let Some(category) = self.categories.get(idx) else {
            return Ok(());
        };

        self.category_cursor = idx;
        self.requested_filter = CategoryFilter::Category(category.to_string());
        tx.send(Action::LoadCatalog(self.requested_filter.clone()))?;

        return Ok(());
    }

    pub fn toggle_product(&mut self, idx: usize) {
        let Some(product) = self.visible.get(idx) else {
            return;
        };

        self.product_cursor = idx;
        let id = product.id;
        let res = self.selection.toggle(id, &self.catalog);
        tracing::debug!(id = id, selected = self.selection.is_selected(id), "Toggled product");
        if let Err(err) = res {
            match err.downcast::<RoutineError>() {
                Ok(routine_err) => self.set_notice(routine_err),
                Err(err) => self.notice = Some(format!("Unable to save your selection: {err}")),
            }
        }
    }

    pub fn remove_selected(&mut self, idx: usize) {
        let Some(id) = self.selection.selection().ids().get(idx).copied() else {
            return;
        };

        if let Err(err) = self.selection.remove(id) {
            self.notice = Some(format!("Unable to save your selection: {err}"));
        }
    }

    pub fn clear_selection(&mut self) {
        if let Err(err) = self.selection.clear() {
            self.notice = Some(format!("Unable to save your selection: {err}"));
        }
        self.selected_cursor = 0;
    }

    pub fn show_description(&mut self, product: Option<Product>) {
        if let Some(product) = product {
            self.description.show(product);
            self.needs_render = true;
        }
    }

    pub fn generate_routine(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        match self.conversation.generate_routine(&self.selection.snapshot()) {
            Ok(req) => {
                self.notice = None;
                self.scroll.last();
                tx.send(Action::CompletionRequest(req))?;
            }
            Err(err) => self.set_notice(err),
        }

        return Ok(());
    }

    pub fn submit_follow_up(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        let text = self.textarea.lines().join(" ");
        if text.trim().is_empty() {
            return Ok(());
        }

        match self.conversation.submit_follow_up(&text) {
            Ok(req) => {
                self.notice = None;
                self.textarea = TextArea::default();
                self.textarea.set_block(TextArea::block(true));
                self.scroll.last();
                tx.send(Action::CompletionRequest(req))?;
            }
            Err(err) => self.set_notice(err),
        }

        return Ok(());
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.textarea.set_block(TextArea::block(focus == Focus::Chat));
    }

    fn move_cursor(&mut self, down: bool) {
        let (cursor, len) = match self.focus {
            Focus::Categories => (&mut self.category_cursor, self.categories.len()),
            Focus::Products => (&mut self.product_cursor, self.visible.len()),
            Focus::Selected => (&mut self.selected_cursor, self.selection.selection().len()),
            Focus::Chat => {
                if down {
                    self.scroll.down();
                } else {
                    self.scroll.up();
                }
                return;
            }
        };

        if len == 0 {
            *cursor = 0;
        } else if down {
            *cursor = (*cursor + 1).min(len - 1);
        } else {
            *cursor = cursor.saturating_sub(1);
        }
    }

    fn handle_input(&mut self, input: Input, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.description.is_open() {
            if let Input {
                key: Key::Esc | Key::Enter | Key::Char('q') | Key::Char('d'),
                ..
            } = input
            {
                self.description.hide();
            }
            return Ok(());
        }

        match input {
            Input { key: Key::Tab, .. } => {
                self.set_focus(self.focus.next());
                return Ok(());
            }
            Input { key: Key::Up, .. } => {
                self.move_cursor(false);
                return Ok(());
            }
            Input { key: Key::Down, .. } => {
                self.move_cursor(true);
                return Ok(());
            }
            _ => (),
        }

        if self.focus == Focus::Chat {
            match input {
                Input {
                    key: Key::Char('u'),
                    ctrl: true,
                    ..
                } => {
                    self.scroll.up_page();
                }
                Input {
                    key: Key::Char('d'),
                    ctrl: true,
                    ..
                } => {
                    self.scroll.down_page();
                }
                Input { key: Key::Esc, .. } => {
                    if self.notice.is_some() {
                        self.notice = None;
                    } else {
                        self.set_focus(Focus::Products);
                    }
                }
                Input {
                    key: Key::Enter, ..
                } => {
                    self.submit_follow_up(tx)?;
                }
                input => {
                    self.textarea.input(input);
                }
            }
            return Ok(());
        }

        match input {
            Input { key: Key::Esc, .. } => {
                self.notice = None;
            }
            Input {
                key: Key::Char('g'),
                ..
            } => {
                self.generate_routine(tx)?;
            }
            Input {
                key: Key::Char('c'),
                ..
            } => {
                self.clear_selection();
            }
            Input {
                key: Key::Char('/') | Key::Char('i'),
                ..
            } => {
                self.set_focus(Focus::Chat);
            }
            Input {
                key: Key::Char('k'),
                ..
            } => {
                self.move_cursor(false);
            }
            Input {
                key: Key::Char('j'),
                ..
            } => {
                self.move_cursor(true);
            }
            Input {
                key: Key::Enter | Key::Char(' '),
                ..
            } => match self.focus {
                Focus::Categories => self.select_category(self.category_cursor, tx)?,
                Focus::Products => self.toggle_product(self.product_cursor),
                Focus::Selected => self.remove_selected(self.selected_cursor),
                Focus::Chat => (),
            },
            Input {
                key: Key::Char('x') | Key::Delete | Key::Backspace,
                ..
            } => {
                if self.focus == Focus::Selected {
                    self.remove_selected(self.selected_cursor);
                }
            }
            Input {
                key: Key::Char('d'),
                ..
            } => match self.focus {
                Focus::Products => {
                    self.show_description(self.visible.get(self.product_cursor).cloned());
                }
                Focus::Selected => {
                    self.show_description(
                        self.selection
                            .selection()
                            .products()
                            .get(self.selected_cursor)
                            .cloned(),
                    );
                }
                _ => (),
            },
            _ => (),
        }

        return Ok(());
    }

    fn row_index(rect: Rect, row: u16, cursor: usize, len: usize) -> Option<usize> {
        let idx = list_offset(cursor, rect.height) + usize::from(row - rect.y);
        if idx >= len {
            return None;
        }

        return Some(idx);
    }

    pub fn handle_click(
        &mut self,
        column: u16,
        row: u16,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        if self
            .description
            .handle_click(column, row, self.rects.overlay, self.rects.overlay_content)
        {
            return Ok(());
        }

        let rects = self.rects;
        if contains(rects.categories, column, row) {
            self.set_focus(Focus::Categories);
            let len = self.categories.len();
            if let Some(idx) = AppState::row_index(rects.categories, row, self.category_cursor, len) {
                self.select_category(idx, tx)?;
            }
        } else if contains(rects.products, column, row) {
            self.set_focus(Focus::Products);
            let len = self.visible.len();
            if let Some(idx) = AppState::row_index(rects.products, row, self.product_cursor, len) {
                let id = self.visible[idx].id;
                match Renderer::card_click(id, column - rects.products.x, rects.products.width) {
                    CardClick::Toggle(_) => self.toggle_product(idx),
                    CardClick::ShowDescription(_) => {
                        self.product_cursor = idx;
                        self.show_description(self.visible.get(idx).cloned());
                    }
                }
            }
        } else if contains(rects.selected, column, row) {
            self.set_focus(Focus::Selected);
            let len = self.selection.selection().len();
            if let Some(idx) = AppState::row_index(rects.selected, row, self.selected_cursor, len) {
                self.selected_cursor = idx;
                let width = rects.selected.width;
                if width > INFO_AFFORDANCE_WIDTH && column - rects.selected.x >= width - INFO_AFFORDANCE_WIDTH {
                    self.remove_selected(idx);
                }
            }
        } else if contains(rects.chat, column, row) || contains(rects.input, column, row) {
            self.set_focus(Focus::Chat);
        }

        self.drain_selection_changes();
        return Ok(());
    }
}
