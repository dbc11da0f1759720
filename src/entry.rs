// src/entry.rs
// Typed view over a summary entry template. Two deliberately distinct
// types: a candidate is always fully populated (freshly computed this
// pass), an existing entry is read from stored text and may lack any
// field. The diff is directional — candidate against existing — and the
// "compare two of the same kind" misuse is unrepresentable.

use crate::core::wikitext::Record;
use crate::params::{
    FIELD_CORRECTION, FIELD_ENTERED, FIELD_HIGHLIGHT, FIELD_LIST, FIELD_PERFORMER,
    FIELD_REVISION, FIELD_TITLE,
};

/// Canonical field order of the entry template.
pub const FIELDS: [&str; 7] = [
    FIELD_LIST,
    FIELD_REVISION,
    FIELD_PERFORMER,
    FIELD_TITLE,
    FIELD_ENTERED,
    FIELD_CORRECTION,
    FIELD_HIGHLIGHT,
];

/// Freshly computed replacement entry. Every field is populated; empty
/// strings are real values here (e.g. an absent highlight passes through
/// as empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateEntry {
    pub source_reference: String, // link markup, e.g. [[Liste …(2016)|Belgien]]
    pub last_synced_revision_id: u64,
    pub performer: String,
    pub title: String,
    pub entered_display: String, // "4. Januar"
    pub correction_days: String, // passthrough text, may be empty
    pub highlight: String,       // opaque passthrough
}

impl CandidateEntry {
    fn field(&self, name: &str) -> String {
        match name {
            FIELD_LIST => self.source_reference.clone(),
            FIELD_REVISION => self.last_synced_revision_id.to_string(),
            FIELD_PERFORMER => self.performer.clone(),
            FIELD_TITLE => self.title.clone(),
            FIELD_ENTERED => self.entered_display.clone(),
            FIELD_CORRECTION => self.correction_days.clone(),
            FIELD_HIGHLIGHT => self.highlight.clone(),
            other => unreachable!("unknown entry field {other}"),
        }
    }

    /// Render as a template invocation under the given label, fields in
    /// canonical order.
    pub fn render(&self, label: &str) -> String {
        let mut out = join!("{{", label);
        for name in FIELDS {
            out.push('|');
            out.push_str(name);
            out.push('=');
            out.push_str(&self.field(name));
        }
        out.push_str("}}");
        out
    }
}

/// Entry as it stands in the stored summary text. `None` means the
/// template simply does not carry the param — distinct from an empty
/// value, and a diff-relevant difference in its own right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExistingEntry {
    pub source_reference: Option<String>,
    pub last_synced_revision_id: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub entered_display: Option<String>,
    pub correction_days: Option<String>,
    pub highlight: Option<String>,
}

impl ExistingEntry {
    /// Read the raw param values off a parsed record. Values keep their
    /// original bytes (footnotes included); comparison trims but never
    /// rewrites.
    pub fn from_record(record: &Record, text: &str) -> Self {
        let raw = |name: &str| {
            record
                .get(name)
                .map(|p| p.value_span.slice(text).to_string())
        };
        ExistingEntry {
            source_reference: raw(FIELD_LIST),
            last_synced_revision_id: raw(FIELD_REVISION),
            performer: raw(FIELD_PERFORMER),
            title: raw(FIELD_TITLE),
            entered_display: raw(FIELD_ENTERED),
            correction_days: raw(FIELD_CORRECTION),
            highlight: raw(FIELD_HIGHLIGHT),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        let slot = match name {
            FIELD_LIST => &self.source_reference,
            FIELD_REVISION => &self.last_synced_revision_id,
            FIELD_PERFORMER => &self.performer,
            FIELD_TITLE => &self.title,
            FIELD_ENTERED => &self.entered_display,
            FIELD_CORRECTION => &self.correction_days,
            FIELD_HIGHLIGHT => &self.highlight,
            other => unreachable!("unknown entry field {other}"),
        };
        slot.as_deref()
    }

    /// Saved revision id, 0 when the param is missing or not a number.
    pub fn saved_revision_id(&self) -> u64 {
        self.last_synced_revision_id
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Correction offset in days; unparseable or missing counts as 0.
    pub fn correction_days_value(&self) -> i64 {
        self.correction_days
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Field-by-field change detection. A field the existing entry lacks
/// counts as changed, the revision marker included; when both sides carry
/// the revision marker its value is excluded from the comparison.
/// Otherwise values are compared after trimming. Short-circuits on the
/// first difference.
pub fn diff(candidate: &CandidateEntry, existing: &ExistingEntry) -> bool {
    for name in FIELDS {
        match existing.field(name) {
            None => return true,
            Some(_) if name == FIELD_REVISION => {}
            Some(value) => {
                if candidate.field(name).trim() != value.trim() {
                    return true;
                }
            }
        }
    }
    false
}
