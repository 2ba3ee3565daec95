//! Data and service layer of the FRONTCAT player roster: paginated live
//! roster loading, client-side filtering, media source resolution and the
//! player record editor.

pub mod backends;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use utils::errors::{Result, RosterError};
