pub mod cli;
pub mod error;
pub mod position;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod types;
pub mod utils;
pub mod view;
