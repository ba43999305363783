pub mod config;
pub mod error;
pub mod install;
pub mod io;
pub mod locator;
pub mod notify;
pub mod platform;
pub mod probe;
pub mod provision;
pub mod runner;
pub mod scaffold;

#[cfg(test)]
mod testing;

pub use error::{QdError, Result};
