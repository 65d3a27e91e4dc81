pub mod auth;
pub mod bff;
pub mod consts;
pub mod error;
pub mod factory;
pub mod host;
pub mod storage;

pub use error::{Error, Result};
