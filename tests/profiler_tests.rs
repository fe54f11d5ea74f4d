use datascribe::dataset::{Column, ColumnKind, Dataset};
use datascribe::profiler::{profile, ColumnStats};

fn cells(raw: &[&str]) -> Vec<Option<String>> {
    raw.iter()
        .map(|r| {
            if r.is_empty() {
                None
            } else {
                Some(r.to_string())
            }
        })
        .collect()
}

fn mixed_dataset() -> Dataset {
    Dataset::new(vec![
        Column::infer("id".into(), cells(&["1", "2", "3", "4"])),
        Column::infer("amount".into(), cells(&["10", "20", "", "40"])),
        Column::infer("region".into(), cells(&["n", "s", "n", ""])),
        Column::infer("notes".into(), cells(&["", "", "", ""])),
    ])
}

#[test]
fn profiles_every_column_in_order() {
    let summary = profile(&mixed_dataset());
    assert_eq!(summary.row_count, 4);
    assert_eq!(
        summary.column_names(),
        vec!["id", "amount", "region", "notes"]
    );

    let kinds: Vec<ColumnKind> = summary.columns.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ColumnKind::Numeric,
            ColumnKind::Numeric,
            ColumnKind::Textual,
            ColumnKind::Unresolved
        ]
    );

    let missing: Vec<usize> = summary.columns.iter().map(|c| c.missing).collect();
    assert_eq!(missing, vec![0, 1, 1, 4]);
}

#[test]
fn numeric_stats_follow_dataframe_conventions() {
    let summary = profile(&mixed_dataset());
    let ColumnStats::Numeric(stats) = &summary.columns[0].stats else {
        panic!("id should carry numeric stats");
    };
    assert_eq!(stats.count, 4);
    assert!((stats.mean - 2.5).abs() < 1e-12);
    assert!((stats.std - 1.2909944487358056).abs() < 1e-12);
    assert!((stats.q25 - 1.75).abs() < 1e-12);
    assert!((stats.q50 - 2.5).abs() < 1e-12);
    assert!((stats.q75 - 3.25).abs() < 1e-12);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 4.0);
}

#[test]
fn textual_stats_pick_first_seen_mode_on_ties() {
    let ds = Dataset::new(vec![Column::infer(
        "color".into(),
        cells(&["blue", "red", "red", "blue"]),
    )]);
    let summary = profile(&ds);
    let ColumnStats::Textual(stats) = &summary.columns[0].stats else {
        panic!("color should carry textual stats");
    };
    assert_eq!(stats.count, 4);
    assert_eq!(stats.unique, 2);
    assert_eq!(stats.top, "blue");
    assert_eq!(stats.freq, 2);
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let ds = Dataset::new(vec![
        Column::infer("up".into(), cells(&["1", "2", "3", "4"])),
        Column::infer("down".into(), cells(&["8", "6", "4", "2"])),
        Column::infer("gapped".into(), cells(&["1", "", "2", ""])),
    ]);
    let summary = profile(&ds);
    let m = &summary.correlation;
    assert_eq!(m.labels, vec!["up", "down", "gapped"]);
    for i in 0..m.size() {
        assert_eq!(m.values[i][i], 1.0);
        for j in 0..m.size() {
            let a = m.values[i][j];
            let b = m.values[j][i];
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
    assert!((m.values[0][1] + 1.0).abs() < 1e-12);
}

#[test]
fn undefined_statistics_serialize_as_null() {
    let ds = Dataset::new(vec![
        Column::infer("x".into(), cells(&["1", "2", "3"])),
        Column::infer("flat".into(), cells(&["5", "5", "5"])),
    ]);
    let summary = profile(&ds);
    // flat column has zero variance: correlation and skewness are undefined
    assert!(summary.correlation.values[0][1].is_nan());
    assert!(summary.skewness[1].value.is_nan());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["correlation"]["values"][0][1], serde_json::Value::Null);
    assert_eq!(json["skewness"][1]["value"], serde_json::Value::Null);
}

#[test]
fn profile_is_deterministic() {
    let a = serde_json::to_string(&profile(&mixed_dataset())).unwrap();
    let b = serde_json::to_string(&profile(&mixed_dataset())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_dataset_profiles_to_empty_summary() {
    let summary = profile(&Dataset::new(vec![]));
    assert_eq!(summary.row_count, 0);
    assert!(summary.columns.is_empty());
    assert!(summary.correlation.is_empty());
    assert!(summary.skewness.is_empty());
}
