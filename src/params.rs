// src/params.rs
use std::path::PathBuf;

use chrono::{Datelike, Local};

use crate::core::dates::Locale;

// Local store
pub const STORE_DIR: &str = ".store";
pub const DEFAULT_SUMMARY: &str = "Aktuelle Nummer-eins-Hits";

// Summary page layout
pub const ENTRY_LABEL: &str = "/Eintrag";
pub const EDIT_SUMMARY: &str = "Bot: Aktualisiere Übersichtsseite Nummer-eins-Hits";

// Country list layout
pub const SECTION_LABEL: &str = "Singles";
pub const RECORD_LABEL: &str = "Nummer-eins-Hits Zeile";

// Template params of a summary entry, in canonical order
pub const FIELD_LIST: &str = "Liste";
pub const FIELD_REVISION: &str = "Liste_Revision";
pub const FIELD_PERFORMER: &str = "Interpret";
pub const FIELD_TITLE: &str = "Titel";
pub const FIELD_ENTERED: &str = "Chartein";
pub const FIELD_CORRECTION: &str = "Korrektur";
pub const FIELD_HIGHLIGHT: &str = "Hervor";

// Template params of a country list row
pub const FIELD_ENTERED_RAW: &str = "Chartein";
pub const FIELD_YEAR_CORRECTION: &str = "Jahr";

#[derive(Clone, Debug)]
pub struct Params {
    pub summary: String,        // title of the summary document in the store
    pub store_dir: PathBuf,     // where the document store lives
    pub force_reload: bool,     // reparse lists even when revids match
    pub locale: Locale,         // month names for the entered-display field
    pub current_year: i32,      // "now" for the year-rollover fallback
    pub dry_run: bool,          // reconcile but never save
    pub list_entries: bool,     // list summary entries then exit
}

impl Params {
    pub fn new() -> Self {
        Self {
            summary: s!(DEFAULT_SUMMARY),
            store_dir: PathBuf::from(STORE_DIR),
            force_reload: false,
            locale: Locale::De,
            current_year: Local::now().year(),
            dry_run: false,
            list_entries: false,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}
