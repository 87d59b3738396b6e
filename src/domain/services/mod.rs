pub mod actions;
mod app_state;
mod conversation;
mod description;
pub mod events;
mod renderer;
mod scroll;
mod selection_store;

pub use app_state::*;
pub use conversation::*;
pub use description::*;
pub use renderer::*;
pub use scroll::*;
pub use selection_store::*;
