pub mod account;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod expense;
pub mod menu;
pub mod parser;
pub mod password;
pub mod snapshot;
pub mod tracker;

pub use error::{Error, Result, SnapshotError};
pub use tracker::{AccountHandle, ExpenseTracker};
