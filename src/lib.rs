pub mod cli;
pub mod config;
pub mod error;
pub mod games;
pub mod settings;
pub mod storage;

pub use error::{Error, Result};
