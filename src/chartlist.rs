// src/chartlist.rs
// Extraction of the current number-one entry from a country list page.
//
// A country list carries one "Nummer-eins-Hits Zeile" row per chart week
// inside its "Singles" section; the last row is the current one. The row's
// Chartein param is either a full ISO date or a bare week number that needs
// the list's reference year (and sometimes a manual +1/-1 correction from
// the Jahr param) to become a date.

use chrono::NaiveDate;

use crate::core::dates;
use crate::core::wikitext::{Link, Record, Tree};
use crate::error::ExtractError;
use crate::params::{
    FIELD_ENTERED_RAW, FIELD_PERFORMER, FIELD_TITLE, FIELD_YEAR_CORRECTION, RECORD_LABEL,
    SECTION_LABEL,
};
use crate::store::Document;

/// Sort-key construct occasionally wrapped around a performer name:
/// `{{SortKeyName|surname|given|target?|display?}}`.
const SORTKEY_LABEL: &str = "SortKeyName";

/// Performer name separators, kept verbatim when splitting.
const SEPARATORS: [&str; 2] = ["feat.", "&"];

/// Canonical result of one extraction: the date is always fully resolved,
/// never a raw week number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartFact {
    pub entered: NaiveDate,
    pub title: String,
    pub performer: String,
    pub revision_id: u64,
}

/// Extract the current entry from a loaded country list.
pub fn extract(doc: &Document, sub_label: Option<&str>) -> Result<ChartFact, ExtractError> {
    let tree = crate::core::wikitext::parse(&doc.text);
    let record = locate_latest_record(&tree, SECTION_LABEL, sub_label, RECORD_LABEL, None)?;
    let year = reference_year(&doc.title)?;

    Ok(ChartFact {
        entered: resolve_date(record, &tree, year)?,
        title: resolve_title(record, &tree)?,
        performer: resolve_performer(record, &tree)?,
        revision_id: doc.revision_id,
    })
}

/// Select the authoritative row: matched section (with regional sub-section
/// disambiguation for composite pages like the Belgian list), optionally
/// narrowed to the first wrapper record of `wrapper_label`, then the *last*
/// matching row in that scope.
pub fn locate_latest_record<'a>(
    tree: &'a Tree,
    section_label: &str,
    sub_label: Option<&str>,
    record_label: &str,
    wrapper_label: Option<&str>,
) -> Result<&'a Record, ExtractError> {
    let section = match sub_label {
        Some(sub) => {
            let regional = tree
                .find_section(sub)
                .ok_or_else(|| ExtractError::MissingSection(s!(sub)))?;
            regional
                .find_subsection(section_label)
                .ok_or_else(|| ExtractError::MissingSection(s!(section_label)))?
        }
        None => tree
            .find_section(section_label)
            .ok_or_else(|| ExtractError::MissingSection(s!(section_label)))?,
    };

    let rows = match wrapper_label {
        Some(wrapper) => {
            // Only the first wrapper counts; later ones are other
            // sub-categories of the same chart.
            let wrapped = section.records(wrapper);
            let first = wrapped
                .first()
                .ok_or_else(|| ExtractError::MissingWrapper(s!(wrapper)))?;
            first.records(record_label)
        }
        None => section.records(record_label),
    };

    rows.last()
        .copied()
        .ok_or_else(|| ExtractError::NoRecords(s!(record_label)))
}

/// Regional sub-label for composite country pages, read off the summary's
/// reference link (display text or target).
pub fn regional_sublabel(link: &Link) -> Option<&'static str> {
    let haystacks = [link.display_text(), link.target.as_str()];
    if haystacks.iter().any(|h| h.contains("Wallonien")) {
        Some("Wallonie")
    } else if haystacks.iter().any(|h| h.contains("Flandern")) {
        Some("Flandern")
    } else {
        None
    }
}

/// Reference year of a list: trailing parenthesized 4-digit year in the
/// title, e.g. "… in Belgien (2015)".
pub fn reference_year(title: &str) -> Result<i32, ExtractError> {
    parenthesized_year(title).ok_or_else(|| ExtractError::MissingYear(s!(title)))
}

/// Last `(YYYY)` occurrence in `s`, if any.
pub fn parenthesized_year(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    let mut found = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'('
            && i + 5 < bytes.len()
            && bytes[i + 1..i + 5].iter().all(u8::is_ascii_digit)
            && bytes[i + 5] == b')'
        {
            found = Some(i);
        }
    }
    let i = found?;
    s[i + 1..i + 5].parse().ok()
}

/// Replace the parenthesized year `from` with `to`. None when the title's
/// parenthesized year is not `from` — the same anchored rule as
/// `reference_year`, deliberately not a bare substring test.
pub fn substitute_year(title: &str, from: i32, to: i32) -> Option<String> {
    if parenthesized_year(title)? != from {
        return None;
    }
    let needle = format!("({from})");
    let i = title.rfind(&needle)?;
    let mut out = s!(&title[..i]);
    out.push_str(&format!("({to})"));
    out.push_str(&title[i + needle.len()..]);
    Some(out)
}

/* ---------------- Field resolution ---------------- */

/// Chartein → concrete date. Digits-only means ISO week number of the
/// reference year adjusted by the Jahr param; otherwise strict YYYY-MM-DD.
pub fn resolve_date(
    record: &Record,
    tree: &Tree,
    reference_year: i32,
) -> Result<NaiveDate, ExtractError> {
    let raw = field_text(record, tree, FIELD_ENTERED_RAW)?;

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let week: u32 = raw
            .parse()
            .map_err(|_| ExtractError::BadDate(raw.clone()))?;
        let effective_year = reference_year + year_correction(record, tree);
        dates::iso_week_monday(effective_year, week).ok_or(ExtractError::BadDate(raw))
    } else {
        dates::parse_iso_date(&raw).ok_or(ExtractError::BadDate(raw))
    }
}

/// Jahr param: "+1" or "-1" near a year change; anything else counts as 0.
fn year_correction(record: &Record, tree: &Tree) -> i32 {
    match record.get(FIELD_YEAR_CORRECTION) {
        Some(param) => match param.plain_text(tree.text()).as_str() {
            "+1" => 1,
            "-1" => -1,
            _ => 0,
        },
        None => 0,
    }
}

/// Titel, linked up against the rest of the document when the list author
/// did not link it already.
pub fn resolve_title(record: &Record, tree: &Tree) -> Result<String, ExtractError> {
    let param = record
        .get(FIELD_TITLE)
        .ok_or(ExtractError::MissingField(FIELD_TITLE))?;
    let raw = param.plain_text(tree.text());

    if param.has_link() {
        return Ok(raw);
    }
    let mut parts = vec![raw];
    let mut pending = vec![0usize];
    enrich_links(tree, &mut parts, &mut pending);
    Ok(parts.pop().unwrap_or_default())
}

/// Interpret: expand any sort-key construct, split the text into name
/// fragments on "&" / "feat.", link-enrich each fragment that is not
/// already linked, and glue everything back together.
pub fn resolve_performer(record: &Record, tree: &Tree) -> Result<String, ExtractError> {
    let param = record
        .get(FIELD_PERFORMER)
        .ok_or(ExtractError::MissingField(FIELD_PERFORMER))?;

    // Sort-key constructs and footnotes are handled node-wise; everything
    // else passes through as raw text.
    let mut expanded = String::new();
    for node in &param.value {
        use crate::core::wikitext::Node;
        match node {
            Node::Footnote(_) => {}
            Node::Record(r) if r.label.contains(SORTKEY_LABEL) => {
                expanded.push_str(&expand_sortkey(r, tree));
            }
            other => expanded.push_str(other.span().slice(tree.text())),
        }
    }

    // Fragment split, separators kept as their own parts.
    let mut parts: Vec<String> = vec![s!()];
    let mut pending: Vec<usize> = Vec::new();
    for word in expanded.split_whitespace() {
        if SEPARATORS.contains(&word) {
            parts.push(s!(word));
            parts.push(s!());
        } else {
            let index = parts.len() - 1;
            if !parts[index].is_empty() {
                parts[index].push(' ');
            }
            parts[index].push_str(word);
            if !parts[index].contains("[[") && !pending.contains(&index) {
                pending.push(index);
            }
        }
    }

    enrich_links(tree, &mut parts, &mut pending);

    Ok(parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" "))
}

/// `{{SortKeyName|surname|given|target?|display?}}` → plain display form.
fn expand_sortkey(record: &Record, tree: &Tree) -> String {
    let pos = |i| {
        record
            .nth(i)
            .map(|p| p.plain_text(tree.text()))
            .unwrap_or_default()
    };
    let surname = pos(1);
    let given = pos(2);
    let target = pos(3);
    let display = pos(4);

    let mut name = s!(&given);
    if !surname.is_empty() {
        if !name.is_empty() {
            name.push(' ');
        }
        name.push_str(&surname);
    }

    if !target.is_empty() {
        let shown = if !name.is_empty() { name } else { display };
        if shown.is_empty() {
            format!("[[{target}]]")
        } else {
            format!("[[{target}|{shown}]]")
        }
    } else if !name.is_empty() {
        name
    } else {
        // Display form only, or nothing at all; the visible name is
        // expected to follow the construct in the running text.
        display
    }
}

/// Best-effort link enrichment: one scan over the document's links per
/// call, early exit once every pending keyword has been resolved.
/// Unmatched keywords stay plain text.
fn enrich_links(tree: &Tree, parts: &mut [String], pending: &mut Vec<usize>) {
    if pending.is_empty() {
        return;
    }
    for link in tree.links() {
        let mut matched = None;
        for (slot, &index) in pending.iter().enumerate() {
            if parts[index] == link.display_text() || parts[index] == link.target {
                matched = Some(slot);
                break;
            }
        }
        if let Some(slot) = matched {
            let index = pending.remove(slot);
            parts[index] = s!(link.span.slice(tree.text()));
        }
        if pending.is_empty() {
            break;
        }
    }
}

/// Plain text of a named field with footnotes stripped; missing param is
/// the caller's error.
fn field_text(record: &Record, tree: &Tree, name: &'static str) -> Result<String, ExtractError> {
    record
        .get(name)
        .map(|p| p.plain_text(tree.text()))
        .ok_or(ExtractError::MissingField(name))
}
