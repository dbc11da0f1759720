// src/core/mod.rs
pub mod dates;
pub mod wikitext;
