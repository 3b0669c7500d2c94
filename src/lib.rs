//! Rolodex: a person-directory REST API over a search-indexed document store.

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod schema;
pub mod server;
pub mod startup;
pub mod store;
