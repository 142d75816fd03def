//! Route handlers organized by functionality.

pub mod env;
pub mod health;
pub mod modules;
pub mod page;
