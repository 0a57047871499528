use dupefinder::duplicates::DuplicateFinder;
use dupefinder::rules::{read_rules, write_rules, CategorizationRule, RuleStore, RulesError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_classify_scanned_files() {
    let dir = tempdir().unwrap();
    let rules_path = dir.path().join("rules.json");
    fs::write(
        &rules_path,
        r#"[
            {"category": "Invoices", "keywords": ["invoice", "bill"]},
            {"category": "Images", "keywords": ["jpg", "png"]},
            {"category": "Everything", "keywords": ["e"]}
        ]"#,
    )
    .unwrap();

    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("Invoice-2023.PDF"), b"1").unwrap();
    fs::write(data.join("holiday.jpg"), b"2").unwrap();
    fs::write(data.join("readme.md"), b"3").unwrap();
    fs::write(data.join("zzz.bin"), b"4").unwrap();

    let result = DuplicateFinder::with_defaults().scan(&data).unwrap();
    let store = RuleStore::open(&rules_path).unwrap();
    let categories = store.classify(&result.records);

    assert_eq!(categories.len(), 3);
    assert!(categories["Invoices"][0].ends_with("Invoice-2023.PDF"));
    assert!(categories["Images"][0].ends_with("holiday.jpg"));
    assert_eq!(categories["Everything"].len(), 1);
    assert!(categories["Everything"][0].ends_with("readme.md"));

    let assigned: usize = categories.values().map(Vec::len).sum();
    assert_eq!(assigned, 3);
}

#[test]
fn test_first_matching_rule_wins() {
    let dir = tempdir().unwrap();
    let store = RuleStore::with_rules(
        dir.path().join("rules.json"),
        vec![
            CategorizationRule::new("Reports", ["report"]),
            CategorizationRule::new("Pdfs", ["pdf"]),
        ],
    );

    assert_eq!(
        store.categorize_file("annual_report.pdf").as_deref(),
        Some("Reports")
    );
    assert_eq!(store.categorize_file("scan.pdf").as_deref(), Some("Pdfs"));
    assert_eq!(store.categorize_file("notes.txt"), None);
}

#[test]
fn test_save_then_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("rules.json");

    let store = RuleStore::open(&path).unwrap();
    assert!(store.rules().is_empty());

    let rules = vec![
        CategorizationRule::new("Music", ["mp3", "flac"]),
        CategorizationRule::new("Video", ["mkv"]),
    ];
    store.save(rules.clone()).unwrap();

    assert_eq!(*store.rules(), rules);
    assert_eq!(store.categorize_file("song.MP3").as_deref(), Some("Music"));

    let reopened = RuleStore::open(&path).unwrap();
    assert_eq!(*reopened.rules(), rules);
}

#[test]
fn test_rules_document_edge_cases() {
    let dir = tempdir().unwrap();

    assert!(read_rules(&dir.path().join("missing.json")).unwrap().is_empty());

    let blank = dir.path().join("blank.json");
    fs::write(&blank, "  \n\t").unwrap();
    assert!(read_rules(&blank).unwrap().is_empty());

    let empty_array = dir.path().join("empty.json");
    fs::write(&empty_array, "[]").unwrap();
    assert!(read_rules(&empty_array).unwrap().is_empty());

    let malformed = dir.path().join("bad.json");
    fs::write(&malformed, r#"{"category": "not an array"}"#).unwrap();
    assert!(matches!(
        read_rules(&malformed),
        Err(RulesError::Parse { .. })
    ));
    assert!(RuleStore::open(&malformed).is_err());
}

#[test]
fn test_write_rules_is_pretty_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");

    write_rules(&path, &[CategorizationRule::new("Docs", ["doc"])]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  {"));
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed[0]["category"], "Docs");
    assert_eq!(parsed[0]["keywords"][0], "doc");

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name())
        .collect();
    assert_eq!(names, vec!["rules.json"]);
}
