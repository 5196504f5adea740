pub mod cache;
pub mod classifier;
pub mod debounce;
pub mod feed;
pub mod parser;
pub mod query;
