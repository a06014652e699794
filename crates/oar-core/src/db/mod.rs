//! Database layer for Oar

mod connection;
mod migrations;

pub use connection::Database;
