//! Client core for the feedline social API, shared between the binary and tests.

pub mod config;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
