// src/error.rs
// Error taxonomy for the extraction/reconciliation engine.
//
// Extraction and reference errors are absorbed at the per-entry boundary in
// `summary::reconcile` — one bad entry never aborts the pass. Store errors
// propagate verbatim to the caller.

use thiserror::Error;

/// Structural or field-level failure while extracting the latest row
/// from a country list. Fatal for that list's extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing section '{0}'")]
    MissingSection(String),

    #[error("missing wrapper '{0}'")]
    MissingWrapper(String),

    #[error("no '{0}' records in section")]
    NoRecords(String),

    #[error("record param '{0}' is missing")]
    MissingField(&'static str),

    #[error("no parenthesized year in list title '{0}'")]
    MissingYear(String),

    #[error("cannot resolve entered value '{0}' to a date")]
    BadDate(String),
}

/// Per-entry failure on the summary page. Fatal for that entry only;
/// the pass continues with the remaining entries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("param Liste does not contain exactly one wikilink")]
    BadReference,

    #[error("country list [[{0}]] does not exist")]
    ListMissing(String),

    #[error("extraction failed for [[{0}]]: {1}")]
    Extract(String, ExtractError),
}
