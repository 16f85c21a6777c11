//! Durable operations store (Neo4j): map version log, requests, cycles,
//! notifications, users

pub mod client;
mod impl_ops_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::OpsStore;

#[cfg(test)]
pub(crate) mod mock;
