//! Ambient helpers shared by the storage crates: tracing setup and
//! filesystem preparation for embedded stores.

pub mod env;
pub mod utils;
