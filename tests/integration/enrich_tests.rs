//! End-to-end tests for enrichment
//!
//! A raw export and a set of variant pages go in; the dataset file comes out.

use osgenome::crawler::parse_snp_page;
use osgenome::enrich::EnrichmentPipeline;
use osgenome::storage::{load_results, parse_raw_export, PersonalStore, ReferenceStore};
use osgenome::EnrichedRecord;
use tempfile::TempDir;

const RAW_EXPORT: &str = "\
# This data file generated by 23andMe
# rsid\tchromosome\tposition\tgenotype
rs53576\t3\t8804371\tAG
rs1815739\t11\t66328095\tCC
rs4680\t22\t19951271\t--
rs9999\t1\t1000\tTT
";

fn page(description: &str, orientation: &str, rows: &[(&str, &str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(geno, mag, summary)| format!("<tr><td>{}</td><td>{}</td><td>{}</td></tr>", geno, mag, summary))
        .collect();

    format!(
        r#"<html><body>
<table style="border: 1px; background-color: #FFFFC0; border-style: solid; margin:1em; width:90%;"><tr><td>{}</td></tr></table>
<table class="sortable smwtable"><tr><th>Geno</th><th>Mag</th><th>Summary</th></tr>{}</table>
<table><tr><td>Rs_StabilizedOrientation</td><td>{}</td></tr></table>
</body></html>"#,
        description, rows, orientation
    )
}

fn reference_store() -> ReferenceStore {
    let mut store = ReferenceStore::new();
    store.insert(parse_snp_page(
        "rs53576",
        &page(
            "Oxytocin receptor",
            "minus",
            &[("(T;C)", "0", "common"), ("(A;G)", "2", "rare finding")],
        ),
    ));
    store.insert(parse_snp_page(
        "rs1815739",
        &page(
            "ACTN3 sprinter gene",
            "plus",
            &[("(C;C)", "2", "better sprinter"), ("(T;T)", "0", "normal")],
        ),
    ));
    store.insert(parse_snp_page(
        "rs4680",
        &page("COMT", "plus", &[("(G;G)", "2", "warrior")]),
    ));
    store
}

fn find<'a>(records: &'a [EnrichedRecord], rsid: &str) -> &'a EnrichedRecord {
    records
        .iter()
        .find(|record| record.rsid == rsid)
        .unwrap_or_else(|| panic!("{} missing from dataset", rsid))
}

#[test]
fn test_export_to_dataset() {
    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("result_table.json");

    let (personal, summary) = parse_raw_export(RAW_EXPORT);
    assert_eq!(summary.imported, 4);
    assert_eq!(summary.no_calls, 1);

    let reference = reference_store();
    let (records, report) = EnrichmentPipeline::default()
        .run_and_save(&personal, &reference, &results_path)
        .unwrap();

    assert_eq!(report.total_calls, 4);
    assert_eq!(report.enriched, 2);
    assert_eq!(report.no_calls, 1);
    assert_eq!(report.missing_reference, 1);

    // Minus strand: (A;G) is reported as (T;C), which matches the common row
    let oxytocin = find(&records, "rs53576");
    assert_eq!(oxytocin.genotype, "(A;G)<br><i>flipped<br>(T;C)</i>");
    assert_eq!(oxytocin.variations, "<b>(T;C) 0 common</b><br>(A;G) 2 rare finding");
    assert_eq!(oxytocin.orientation, "minus");
    assert!(oxytocin.is_interesting);
    assert!(!oxytocin.is_uncommon);

    let actn3 = find(&records, "rs1815739");
    assert_eq!(actn3.genotype, "(C;C)");
    assert!(!actn3.is_flipped());
    assert!(actn3.is_interesting);
    assert!(actn3.is_uncommon);

    let on_disk = load_results(&results_path).unwrap().unwrap();
    assert_eq!(on_disk, records);
}

#[test]
fn test_dataset_file_layout() {
    let dir = TempDir::new().unwrap();
    let results_path = dir.path().join("result_table.json");

    let (personal, _) = parse_raw_export(RAW_EXPORT);
    EnrichmentPipeline::default()
        .run_and_save(&personal, &reference_store(), &results_path)
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results_path).unwrap()).unwrap();
    let rows = raw.as_array().unwrap();
    let actn3 = rows
        .iter()
        .find(|row| row["Name"] == "rs1815739")
        .unwrap();

    assert_eq!(actn3["IsInteresting"], "Yes");
    assert_eq!(actn3["IsUncommon"], "Yes");
    assert_eq!(actn3["StabilizedOrientation"], "plus");
    assert_eq!(actn3["Description"], "ACTN3 sprinter gene");
}

#[test]
fn test_reference_round_trip_preserves_enrichment() {
    let dir = TempDir::new().unwrap();
    let reference_path = dir.path().join("results.json");

    let reference = reference_store();
    reference.save(&reference_path).unwrap();
    let reloaded = ReferenceStore::load(&reference_path).unwrap();

    let (personal, _) = parse_raw_export(RAW_EXPORT);
    let pipeline = EnrichmentPipeline::default();
    let (before, _) = pipeline.run(&personal, &reference);
    let (after, _) = pipeline.run(&personal, &reloaded);

    assert_eq!(before, after);
}

#[test]
fn test_significance_is_read_from_third_cell() {
    let dir = TempDir::new().unwrap();
    let personal_path = dir.path().join("personal_snps.json");
    let reference_path = dir.path().join("results.json");
    std::fs::write(&personal_path, r#"{"rs123": "(A;G)"}"#).unwrap();
    std::fs::write(
        &reference_path,
        r#"{"rs123": {"Description": "d",
                      "Variations": [["(T;C)", "common", "n"], ["(A;G)", "rare finding", "x"]],
                      "StabilizedOrientation": "minus"}}"#,
    )
    .unwrap();

    let personal = PersonalStore::load(&personal_path).unwrap();
    let reference = ReferenceStore::load(&reference_path).unwrap();
    let (records, report) = EnrichmentPipeline::default().run(&personal, &reference);

    assert_eq!(report.enriched, 1);
    let record = &records[0];
    assert_eq!(record.genotype, "(A;G)<br><i>flipped<br>(T;C)</i>");
    assert_eq!(record.variations, "<b>(T;C) common n</b><br>(A;G) rare finding x");
    // "n" and "x" are the significance cells, and neither is a common phrase
    assert!(record.is_interesting);
    assert!(record.is_uncommon);
}
