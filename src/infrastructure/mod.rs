pub mod catalogs;
pub mod completions;
pub mod storage;
