pub mod completion;
pub mod config;
pub mod export;
pub mod list;
pub mod parse;
pub mod route;
