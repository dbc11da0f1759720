// benches/wikitext.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use chart_sync::core::wikitext;

/// Synthetic country list in the shape of a full chart year: one row per
/// week plus some prose and footnotes.
fn build_sample() -> String {
    let mut page = String::from(
        "Die Liste der Nummer-eins-Hits.\n\nSiehe auch [[Adele (Sängerin)|Adele]].\n\n== Singles ==\n",
    );
    for week in 1..=52u32 {
        page.push_str(&format!(
            "{{{{Nummer-eins-Hits Zeile|Chartein={week}|Titel=Titel {week}<ref>Quelle {week}</ref>|Interpret=Interpret {week}}}}}\n"
        ));
    }
    page.push_str("\n== Alben ==\nKeine Daten.\n");
    page
}

fn bench_parse(c: &mut Criterion) {
    let doc = build_sample();

    c.bench_function("parse_country_list", |b| {
        b.iter(|| {
            let tree = wikitext::parse(black_box(&doc));
            black_box(tree.records("Nummer-eins-Hits Zeile").len())
        })
    });

    c.bench_function("links_scan", |b| {
        let tree = wikitext::parse(&doc);
        b.iter(|| black_box(tree.links().count()))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
