// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod core;
#[macro_use]
pub mod log;
pub mod params;

pub mod chartlist;
pub mod entry;
pub mod error;
pub mod revision;
pub mod store;
pub mod summary;
