//! Core module - framework-agnostic storefront logic.
//!
//! Everything here is synchronous and pure: operations take the current
//! catalog or page snapshot and return a new value. Persistence lives in
//! [`crate::db`].

pub mod block;
pub mod catalog;
pub mod page;
pub mod render;
pub mod slug;
pub mod templates;
pub mod variation;
