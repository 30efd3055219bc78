use anyhow::Result;
use ironsweep::testing::*;
use ironsweep::*;
use std::sync::Arc;

fn job(store: &Arc<InMemoryStore>, cfg: JobConfig) -> Result<DedupJob> {
    DedupJob::with_store(cfg, Arc::clone(store))
}

fn parallel_config() -> JobConfig {
    let mut cfg = scenario_config();
    cfg.exec = ExecConfig {
        sequential: false,
        threads: Some(4),
        partitions: Some(3),
    };
    cfg
}

#[test]
fn return_auth_scenario_deletes_second_a_only() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    let sink = MemorySink::new();
    let params = StaticParams::from_lines(["RA-1", "RA-1", " ", "RA-2"]);

    let summary = job(&store, scenario_config())?.run(&params, &sink)?;

    assert!(summary.complete);
    assert!(!summary.dry_run);
    assert_summary_counts(&summary, 1, 0);
    let deleted = &summary.successes[0];
    assert_eq!(deleted.to_string(), "RA-1/A/11");
    assert_delete_attempts(&store, &["11"]);
    assert!(store.contains("10"));
    assert!(store.contains("12"));
    assert!(store.contains("20"));
    assert_eq!(sink.last(), Some(summary));
    // One query for the deduplicated id set.
    assert_eq!(store.search_calls(), 1);
    Ok(())
}

#[test]
fn failed_delete_is_reported_and_later_duplicate_still_attempted() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    store.extend(records_for("RA-1", &[("A", "13")]).into_iter().map(|mut r| {
        r.transaction_number = "RA-1-T9999".into();
        r
    }));
    store.fail_delete_of("11");

    let summary = job(&store, scenario_config())?.run_ids(&parent_ids(&["RA-1", "RA-2"]))?;

    assert_summary_counts(&summary, 1, 1);
    assert_eq!(summary.errors[0].identity.to_string(), "RA-1/A/11");
    assert!(summary.errors[0].cause.is_some());
    assert_eq!(deleted_ids(&summary), vec!["13"]);
    assert_delete_attempts(&store, &["11", "13"]);
    assert!(store.contains("11"));
    Ok(())
}

#[test]
fn delete_count_is_excess_of_each_subtype() -> Result<()> {
    // n = 4 of A and m = 3 of B: (n - 1) + (m - 1) deletes.
    let store = Arc::new(InMemoryStore::new());
    store.extend(records_for(
        "RA-5",
        &[("A", "1"), ("B", "2"), ("A", "3"), ("A", "4"), ("B", "5"), ("C", "6"), ("A", "7"), ("B", "8")],
    ));

    let summary = job(&store, parallel_config())?.run_ids(&parent_ids(&["RA-5"]))?;

    assert_summary_counts(&summary, 5, 0);
    assert_collections_equal(&deleted_ids(&summary), &["3", "4", "5", "7", "8"].map(String::from));
    assert!(store.contains("1") && store.contains("2") && store.contains("6"));
    Ok(())
}

#[test]
fn untracked_subtypes_never_touched() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store.extend(records_for("RA-1", &[("C", "1"), ("C", "2"), ("D", "3"), ("D", "4")]));

    let summary = job(&store, scenario_config())?.run_ids(&parent_ids(&["RA-1"]))?;

    assert_summary_counts(&summary, 0, 0);
    assert!(store.delete_attempts().is_empty());
    assert_eq!(store.len(), 4);
    Ok(())
}

#[test]
fn rerun_after_cleanup_is_a_no_op() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    let j = job(&store, scenario_config())?;
    let ids = parent_ids(&["RA-1", "RA-2"]);

    let first = j.run_ids(&ids)?;
    assert_summary_counts(&first, 1, 0);

    let second = j.run_ids(&ids)?;
    assert_summary_counts(&second, 0, 0);
    assert_delete_attempts(&store, &["11"]);
    Ok(())
}

#[test]
fn many_parents_in_parallel_match_sequential() -> Result<()> {
    let build = || {
        let store = InMemoryStore::new();
        for n in 0..40 {
            let parent = format!("RA-{n}");
            let a = format!("{n}a");
            let a2 = format!("{n}a2");
            let b = format!("{n}b");
            let rows: Vec<(&str, &str)> = if n % 3 == 0 {
                vec![("A", a.as_str()), ("B", b.as_str()), ("A", a2.as_str())]
            } else {
                vec![("A", a.as_str()), ("B", b.as_str())]
            };
            store.extend(records_for(&parent, &rows));
        }
        Arc::new(store)
    };
    let ids: Vec<ParentId> = (0..40).filter_map(|n| ParentId::parse(&format!("RA-{n}"))).collect();

    let seq_store = build();
    let seq = job(&seq_store, scenario_config())?.run_ids(&ids)?;
    let par_store = build();
    let par = job(&par_store, parallel_config())?.run_ids(&ids)?;

    assert_summary_counts(&seq, 14, 0);
    assert_eq!(seq, par);
    let expected: Vec<String> = (0..40).filter(|n| n % 3 == 0).map(|n| format!("{n}a2")).collect();
    assert_collections_unordered_equal(&deleted_ids(&par), &expected);
    Ok(())
}

#[test]
fn small_pages_are_fully_drained() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let rows: Vec<(String, String)> = (0..23).map(|i| ("A".to_string(), i.to_string())).collect();
    let rows_ref: Vec<(&str, &str)> = rows.iter().map(|(t, i)| (t.as_str(), i.as_str())).collect();
    store.extend(records_for("RA-1", &rows_ref));

    let cfg = JobConfig {
        page_size: 5,
        ..scenario_config()
    };
    let summary = job(&store, cfg)?.run_ids(&parent_ids(&["RA-1"]))?;

    assert_summary_counts(&summary, 22, 0);
    assert!(store.contains("0"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.search_calls(), 5);
    Ok(())
}

#[test]
fn enumeration_failure_degrades_to_empty_run() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    store.fail_search_on_page(0);

    let summary = job(&store, scenario_config())?.run_ids(&parent_ids(&["RA-1", "RA-2"]))?;

    assert!(summary.complete);
    assert_summary_counts(&summary, 0, 0);
    assert!(store.delete_attempts().is_empty());
    Ok(())
}

#[test]
fn unresolved_parent_is_dropped_not_grouped() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let mut orphan = RecordBuilder::new("", "A", "90").tran("RA-1-T0000").build();
    orphan.parent_id = "   ".into();
    store.insert_linked(orphan, "RA-1");
    store.extend(records_for("RA-1", &[("A", "91"), ("A", "92")]));

    let summary = job(&store, scenario_config())?.run_ids(&parent_ids(&["RA-1"]))?;

    // The orphan is neither counted nor deleted.
    assert_eq!(deleted_ids(&summary), vec!["92"]);
    assert!(store.contains("90"));
    Ok(())
}

#[test]
fn dry_run_reports_without_deleting() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    let cfg = JobConfig {
        dry_run: true,
        ..scenario_config()
    };

    let summary = job(&store, cfg)?.run_ids(&parent_ids(&["RA-1", "RA-2"]))?;

    assert!(summary.dry_run);
    assert_eq!(deleted_ids(&summary), vec!["11"]);
    assert!(store.delete_attempts().is_empty());
    assert!(store.contains("11"));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_at_build() {
    let store = Arc::new(InMemoryStore::new());
    let cfg = JobConfig {
        page_size: 0,
        ..Default::default()
    };
    assert!(DedupJob::with_store(cfg, store).is_err());
}

#[test]
fn parameter_file_feeds_the_run() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    let file = temp_params_file(&["RA-2", "", "RA-1", "  RA-2  "])?;
    let out = TempFilePath::with_extension("json")?;

    let summary = job(&store, scenario_config())?.run(
        &FileParams(file.path().to_path_buf()),
        &JsonFileSink(out.path().to_path_buf()),
    )?;

    assert_summary_counts(&summary, 1, 0);
    let written: RunSummary = serde_json::from_str(&std::fs::read_to_string(out.path())?)?;
    assert_eq!(written, summary);
    Ok(())
}

#[test]
fn unreadable_parameter_source_is_an_error() -> Result<()> {
    let store = Arc::new(return_auth_scenario());
    let params = FileParams("/no/such/params.txt".into());
    let err = job(&store, scenario_config())?.run(&params, &TracingSink).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read parent ids"));
    Ok(())
}
