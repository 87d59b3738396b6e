use tui_textarea::Input;

use super::Catalog;
use super::CategoryFilter;
use super::CompletionResponse;
use super::RoutineError;

pub enum Event {
    CatalogLoaded(CategoryFilter, Result<Catalog, RoutineError>),
    CompletionResponse(CompletionResponse),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardPaste(String),
    MouseClick(u16, u16),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UITick(),
}
