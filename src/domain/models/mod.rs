mod action;
mod catalog_source;
mod completion;
mod error;
mod event;
mod product;
mod selection;
mod storage;
mod textarea;
mod turn;

pub use action::*;
pub use catalog_source::*;
pub use completion::*;
pub use error::*;
pub use event::*;
pub use product::*;
pub use selection::*;
pub use storage::*;
pub use textarea::*;
pub use turn::*;
