pub mod autosort;
pub mod cache;
pub mod compare;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod io;
pub mod observer;
pub mod paths;
pub mod resolver;
pub mod store;
pub mod types;
pub mod writer;

pub use error::{OrderError, Result};
