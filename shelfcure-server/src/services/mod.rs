//! Business rules shared by the API handlers
//!
//! Repositories stay single-table; anything spanning tables, subscriptions
//! or the store timezone lives here.

pub mod access;
pub mod attendance;
pub mod dashboard;
pub mod staff;
pub mod stores;
pub mod subscription;
