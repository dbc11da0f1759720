// tests/wikitext.rs
use chart_sync::core::wikitext::{self, Node};

const PAGE: &str = "\
Intro with a [[Lead Link|lead]] mention.

== Wallonie ==
Some prose for [[Wallonien]].

=== Singles ===
{{Nummer-eins-Hits Zeile|Chartein=2015-09-05|Titel=Old|Interpret=Nobody}}
{{Nummer-eins-Hits Zeile|Chartein=2015-09-12|Titel=El Perdón|Interpret=Nicky Jam & Enrique Iglesias}}

== Flandern ==
=== Singles ===
{{Nummer-eins-Hits Zeile|Chartein=2015-09-12|Titel=Other|Interpret=Else}}
";

#[test]
fn sections_nest_by_heading_level() {
    let tree = wikitext::parse(PAGE);

    let wallonie = tree.find_section("Wallonie").expect("Wallonie section");
    assert_eq!(wallonie.level, 2);
    let singles = wallonie.find_subsection("Singles").expect("Singles sub");
    assert_eq!(singles.level, 3);

    // Flandern has its own Singles subsection; the Wallonie one must not
    // see Flandern's rows.
    assert_eq!(singles.records("Nummer-eins-Hits Zeile").len(), 2);
}

#[test]
fn section_records_keep_document_order() {
    let tree = wikitext::parse(PAGE);
    let singles = tree
        .find_section("Wallonie")
        .unwrap()
        .find_subsection("Singles")
        .unwrap();
    let rows = singles.records("Nummer-eins-Hits Zeile");
    let last = rows.last().unwrap();
    assert_eq!(
        last.get("Titel").unwrap().plain_text(tree.text()),
        "El Perdón"
    );
}

#[test]
fn named_and_positional_params() {
    let tree = wikitext::parse("{{SortKeyName|Iglesias|Enrique|Enrique Iglesias (Sänger)}}");
    let rec = &tree.records("SortKeyName")[0];
    assert_eq!(rec.nth(1).unwrap().plain_text(tree.text()), "Iglesias");
    assert_eq!(rec.nth(2).unwrap().plain_text(tree.text()), "Enrique");
    assert_eq!(
        rec.nth(3).unwrap().plain_text(tree.text()),
        "Enrique Iglesias (Sänger)"
    );
    assert!(rec.nth(4).is_none());
    assert!(rec.get("Titel").is_none());
}

#[test]
fn footnotes_are_stripped_from_plain_text() {
    let text = "{{Zeile|Titel=Hello<ref>chart source</ref>|Chartein=2015-10-23<ref name=\"x\" />}}";
    let tree = wikitext::parse(text);
    let rec = &tree.records("Zeile")[0];
    assert_eq!(rec.get("Titel").unwrap().plain_text(tree.text()), "Hello");
    assert_eq!(
        rec.get("Chartein").unwrap().plain_text(tree.text()),
        "2015-10-23"
    );
}

#[test]
fn links_iterate_in_document_order_and_restart() {
    let tree = wikitext::parse(PAGE);
    let first_pass: Vec<_> = tree.links().map(|l| l.target.clone()).collect();
    assert_eq!(first_pass[0], "Lead Link");
    assert!(first_pass.contains(&String::from("Wallonien")));

    // Restartable: a fresh iterator starts over.
    let second_pass: Vec<_> = tree.links().map(|l| l.target.clone()).collect();
    assert_eq!(first_pass, second_pass);
}

#[test]
fn links_inside_record_params_are_found() {
    let tree = wikitext::parse("{{Eintrag|Liste=[[Liste (2015)|Belgien]]}}");
    let targets: Vec<_> = tree.links().map(|l| l.target.as_str()).collect();
    assert_eq!(targets, vec!["Liste (2015)"]);

    let rec = &tree.records("Eintrag")[0];
    let link = rec.get("Liste").unwrap().links().next().unwrap();
    assert_eq!(link.display_text(), "Belgien");
}

#[test]
fn malformed_markup_degrades_to_text() {
    // Unclosed constructs parse as plain text; lookups come back empty.
    let tree = wikitext::parse("{{Broken|Titel=x\nand [[also broken");
    assert!(tree.records("Broken").is_empty());
    assert_eq!(tree.links().count(), 0);
}

#[test]
fn record_spans_slice_the_original_text() {
    let tree = wikitext::parse(PAGE);
    for rec in tree.records("Nummer-eins-Hits Zeile") {
        let slice = rec.span.slice(tree.text());
        assert!(slice.starts_with("{{Nummer-eins-Hits Zeile"));
        assert!(slice.ends_with("}}"));
    }
}

#[test]
fn nested_records_are_reachable() {
    let text = "== Singles ==\n{{Wrapper|inhalt={{Zeile|Titel=A}}{{Zeile|Titel=B}}}}";
    let tree = wikitext::parse(text);
    let singles = tree.find_section("Singles").unwrap();

    let wrappers = singles.records("Wrapper");
    assert_eq!(wrappers.len(), 1);
    let rows = wrappers[0].records("Zeile");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("Titel").unwrap().plain_text(tree.text()), "B");

    // Section-level search sees them too, in document order.
    let all = singles.records("Zeile");
    assert_eq!(all.len(), 2);
}

#[test]
fn heading_lines_stay_text_nodes() {
    let tree = wikitext::parse("== Singles ==\nplain");
    let singles = tree.find_section("Singles").unwrap();
    assert!(matches!(singles.nodes[0], Node::Text(_)));
    assert_eq!(singles.nodes[0].span().slice(tree.text()), "== Singles ==\n");
}
