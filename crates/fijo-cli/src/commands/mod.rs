//! CLI command implementations.

pub mod common;
pub mod compare;
pub mod df2;
pub mod impulse;
pub mod info;
pub mod response;
pub mod status;
pub mod table;
