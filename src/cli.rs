// src/cli.rs
use std::env;
use std::path::PathBuf;

use crate::core::dates::Locale;
use crate::core::wikitext;
use crate::params::{EDIT_SUMMARY, ENTRY_LABEL, FIELD_LIST, Params};
use crate::store::{DocumentStore, FsStore};
use crate::summary;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut params = Params::new();
    parse_cli(&mut params)?;

    let mut store = FsStore::new(params.store_dir.clone());
    let page = store
        .load(&params.summary)?
        .ok_or_else(|| format!("Summary document '{}' not found", params.summary))?;

    if params.list_entries {
        for target in list_entries(&page.text) {
            println!("{target}");
        }
        return Ok(());
    }

    let outcome = summary::reconcile(&page.text, &store, &params)?;
    println!(
        "{} entries refreshed, {} skipped",
        outcome.refreshed, outcome.skipped
    );

    if !outcome.write_needed {
        println!("Nothing to write.");
        return Ok(());
    }
    if params.dry_run {
        println!("Write needed (dry run, not saving).");
        return Ok(());
    }

    store.save(&params.summary, &outcome.text)?;
    println!("Saved '{}' ({})", params.summary, EDIT_SUMMARY);
    Ok(())
}

/// Reference targets of all summary entries, document order.
fn list_entries(text: &str) -> Vec<String> {
    let tree = wikitext::parse(text);
    let mut out = Vec::new();
    for record in tree.records(ENTRY_LABEL) {
        if let Some(param) = record.get(FIELD_LIST) {
            if let Some(link) = param.links().next() {
                out.push(link.target.clone());
            }
        }
    }
    out
}

fn parse_cli(params: &mut Params) -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-s" | "--summary" => {
                params.summary = args.next().ok_or("Missing value for --summary")?;
            }
            "--store" => {
                params.store_dir = PathBuf::from(args.next().ok_or("Missing value for --store")?);
            }
            "--force-reload" => params.force_reload = true,
            "--dry-run" => params.dry_run = true,
            "--list-entries" => params.list_entries = true,
            "--locale" => {
                let v = args.next().ok_or("Missing value for --locale")?;
                params.locale = match v.to_ascii_lowercase().as_str() {
                    "de" => Locale::De,
                    "en" => Locale::En,
                    other => return Err(format!("Unknown locale: {}", other).into()),
                };
            }
            "--year" => {
                // Pin "now" for reproducible runs against fixtures
                params.current_year = args.next().ok_or("Missing value for --year")?.parse()?;
            }
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }
    Ok(())
}
