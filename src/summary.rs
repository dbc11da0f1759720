// src/summary.rs
// One reconciliation pass over the summary page.
//
// Each /Eintrag record walks the same path: resolve its list reference
// (with the year-rollover fallback), ask the revision gate whether the
// list must be reparsed, extract the current number-one entry, build a
// candidate record and diff it against the stored one. A failed entry is
// logged and skipped; the pass always runs to completion. Store failures
// other than "document absent" abort the pass and surface verbatim.

use chrono::Duration;

use crate::chartlist::{self, ChartFact};
use crate::core::dates;
use crate::core::wikitext::{self, Link, Record, Span};
use crate::entry::{self, CandidateEntry, ExistingEntry};
use crate::error::EntryError;
use crate::params::{ENTRY_LABEL, FIELD_LIST, Params};
use crate::revision;
use crate::store::{Document, DocumentStore, StoreError};

/// Result of a full pass. `text` equals the input byte-for-byte unless
/// at least one entry changed.
#[derive(Clone, Debug)]
pub struct PassOutcome {
    pub text: String,
    pub write_needed: bool,
    pub refreshed: usize, // entries whose list was reparsed this pass
    pub skipped: usize,   // entries absorbed as per-entry failures
}

enum Treated {
    UpToDate,
    Unchanged,
    Replaced(Span, String),
}

enum TreatError {
    Entry(EntryError),
    Store(StoreError),
}

impl From<EntryError> for TreatError {
    fn from(e: EntryError) -> Self {
        TreatError::Entry(e)
    }
}

impl From<StoreError> for TreatError {
    fn from(e: StoreError) -> Self {
        TreatError::Store(e)
    }
}

/// Reconcile the summary text against the store. Loads only; persisting
/// the outcome is the caller's decision (and is all-or-nothing).
pub fn reconcile(
    text: &str,
    store: &dyn DocumentStore,
    params: &Params,
) -> Result<PassOutcome, StoreError> {
    let tree = wikitext::parse(text);

    let mut replacements: Vec<(Span, String)> = Vec::new();
    let mut refreshed = 0usize;
    let mut skipped = 0usize;

    for record in tree.records(ENTRY_LABEL) {
        match treat_entry(record, &tree, store, params) {
            Ok(Treated::UpToDate) => {}
            Ok(Treated::Unchanged) => refreshed += 1,
            Ok(Treated::Replaced(span, new_text)) => {
                refreshed += 1;
                replacements.push((span, new_text));
            }
            Err(TreatError::Entry(e)) => {
                loge!("entry skipped: {e}");
                skipped += 1;
            }
            Err(TreatError::Store(e)) => return Err(e),
        }
    }

    Ok(PassOutcome {
        write_needed: !replacements.is_empty(),
        text: splice(text, replacements),
        refreshed,
        skipped,
    })
}

fn treat_entry(
    record: &Record,
    tree: &wikitext::Tree,
    store: &dyn DocumentStore,
    params: &Params,
) -> Result<Treated, TreatError> {
    let existing = ExistingEntry::from_record(record, tree.text());
    let reference = reference_link(record)?;

    let (doc, working) = load_list(&reference, store, params)?;
    let sub_label = chartlist::regional_sublabel(&working);

    // Untouched lists are left byte-for-byte alone.
    if !revision::needs_reparse(
        existing.saved_revision_id(),
        doc.revision_id,
        params.force_reload,
    ) {
        logd!("[[{}]] unchanged at revision {}", doc.title, doc.revision_id);
        return Ok(Treated::UpToDate);
    }

    let fact = chartlist::extract(&doc, sub_label)
        .map_err(|e| EntryError::Extract(doc.title.clone(), e))?;

    // A substituted reference is rendered fresh; an untouched one keeps
    // its original markup so unchanged entries keep their exact bytes.
    let source_reference = if working.target == reference.target {
        s!(reference.span.slice(tree.text()))
    } else {
        working.to_markup()
    };

    let candidate = build_candidate(&existing, &fact, source_reference, params);

    // Bookkeeping happens even when the diff below says the stored entry
    // can stay as it is.
    logf!(
        "[[{}]] synced against revision {}",
        doc.title,
        doc.revision_id
    );

    if entry::diff(&candidate, &existing) {
        Ok(Treated::Replaced(
            record.span,
            candidate.render(&record.label),
        ))
    } else {
        Ok(Treated::Unchanged)
    }
}

/// The Liste param must hold exactly one wikilink.
fn reference_link(record: &Record) -> Result<Link, EntryError> {
    let param = record.get(FIELD_LIST).ok_or(EntryError::BadReference)?;
    let mut links = param.links();
    let first = links.next().ok_or(EntryError::BadReference)?.clone();
    if links.next().is_some() {
        return Err(EntryError::BadReference);
    }
    Ok(first)
}

/// Load the referenced country list. When the reference still points at
/// last year's list, try this year's first and fall back to the stored
/// reference if the new list does not exist yet. The substitution only
/// affects this pass's working reference; the stored field changes via
/// the normal field update, never here.
fn load_list(
    reference: &Link,
    store: &dyn DocumentStore,
    params: &Params,
) -> Result<(Document, Link), TreatError> {
    if let Some(new_title) =
        chartlist::substitute_year(&reference.target, params.current_year - 1, params.current_year)
    {
        logf!(
            "trying new year's list [[{new_title}]] for [[{}]]",
            reference.target
        );
        if let Some(doc) = store.load(&new_title)? {
            let working = Link {
                target: new_title,
                display: reference.display.clone(),
                span: reference.span,
            };
            return Ok((doc, working));
        }
        logf!(
            "[[{new_title}]] does not exist, falling back to [[{}]]",
            reference.target
        );
    }

    let doc = store
        .load(&reference.target)?
        .ok_or_else(|| EntryError::ListMissing(reference.target.clone()))?;
    Ok((doc, reference.clone()))
}

fn build_candidate(
    existing: &ExistingEntry,
    fact: &ChartFact,
    source_reference: String,
    params: &Params,
) -> CandidateEntry {
    let corrected = fact.entered + Duration::days(existing.correction_days_value());

    CandidateEntry {
        source_reference,
        last_synced_revision_id: fact.revision_id,
        performer: fact.performer.clone(),
        title: fact.title.clone(),
        entered_display: dates::format_display(corrected, params.locale),
        correction_days: existing.correction_days.clone().unwrap_or_default(),
        highlight: existing.highlight.clone().unwrap_or_default(),
    }
}

/// Splice replacements (document order, non-overlapping) into the
/// original text. Untouched bytes stay untouched.
fn splice(text: &str, replacements: Vec<(Span, String)>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for (span, new_text) in replacements {
        if span.start < cursor {
            continue; // nested inside an already replaced record
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(&new_text);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
