use recap_history::{
    CaptureData, CovariateValue, HistoryEncoder, HistoryError, ObsLevels, assemble,
};

/// Three cohorts of a dipper-like study with a sex covariate.
fn cohorts() -> CaptureData {
    let mut data = CaptureData::new(vec!["sex".to_string(), "wing".to_string()]).unwrap();
    data.push("1011", 3, vec!["F".into(), 71.5.into()]).unwrap();
    data.push("0110", 2, vec!["M".into(), CovariateValue::Missing])
        .unwrap();
    data.push("0001", 1, vec!["F".into(), 69.0.into()]).unwrap();
    data
}

#[test]
fn releases_follow_first_encounter() {
    let data = cohorts();
    let levels = ObsLevels::new(["0", "1"]).unwrap();
    let releases = data.releases(&levels).unwrap();

    assert_eq!(releases.n_occasions(), 4);
    assert_eq!(releases.occasions(), &[1, 2, 4]);
    assert!((0..data.len()).all(|id| releases.symbol(id) == 1));
    assert_eq!(data.total_freq(), 6);
    assert_eq!(data.n_distinct_histories(), 3);
}

#[test]
fn stratum_histories_in_both_notations() {
    let levels = ObsLevels::new(["0", "A", "B"]).unwrap();
    let mut data = CaptureData::new(vec![]).unwrap();
    data.push("0AB0", 1, vec![]).unwrap();
    data.push("0,0,B,A", 1, vec![]).unwrap();

    let releases = data.releases(&levels).unwrap();
    assert_eq!(releases.occasions(), &[2, 3]);
    assert_eq!(releases.symbol(0), 1);
    assert_eq!(releases.symbol(1), 2);
}

#[test]
fn multi_character_codes_round_trip_with_commas() {
    let levels = ObsLevels::new(["0", "N1", "N2"]).unwrap();
    let encoder = HistoryEncoder::for_levels(&levels);
    assert_eq!(encoder.delimiter(), ",");

    let ch = encoder.encode(&[0, 1, 2, 0], &levels);
    assert_eq!(ch, "0,N1,N2,0");
    assert_eq!(levels.parse(&ch, 0).unwrap(), vec![0, 1, 2, 0]);
}

#[test]
fn ragged_histories_are_rejected() {
    let levels = ObsLevels::new(["0", "1"]).unwrap();
    let mut data = CaptureData::new(vec![]).unwrap();
    data.push("101", 1, vec![]).unwrap();
    data.push("1001", 1, vec![]).unwrap();

    assert_eq!(
        data.releases(&levels).unwrap_err(),
        HistoryError::OccasionMismatch {
            row: 1,
            expected: 3,
            got: 4,
        }
    );
}

#[test]
fn never_released_history_is_rejected() {
    let levels = ObsLevels::new(["0", "1"]).unwrap();
    let mut data = CaptureData::new(vec![]).unwrap();
    data.push("100", 1, vec![]).unwrap();
    data.push("000", 1, vec![]).unwrap();

    assert!(matches!(
        data.releases(&levels).unwrap_err(),
        HistoryError::NoRelease { row: 1, .. }
    ));
}

#[test]
fn assembled_rows_replicate_covariates() {
    let data = cohorts();
    let levels = ObsLevels::new(["0", "1"]).unwrap();
    let encoder = HistoryEncoder::for_levels(&levels);

    let histories = vec![
        encoder.encode_rows(&[1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 0], 4, &levels),
        encoder.encode_rows(&[0, 1, 1, 1, 0, 1, 0, 0], 4, &levels),
        encoder.encode_rows(&[0, 0, 0, 1], 4, &levels),
    ];
    let out = assemble(&data, histories).unwrap();

    assert_eq!(out.n_rows(), 6);
    assert_eq!(out.ch(), &["1100", "1011", "1000", "0111", "0100", "0001"]);
    assert_eq!(out.source_ids(), &[0, 0, 0, 1, 1, 2]);

    let sex: Vec<String> = out
        .column("sex")
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(sex, vec!["F", "F", "F", "M", "M", "F"]);
    assert_eq!(out.column("wing").unwrap()[4], CovariateValue::Missing);
    assert!(out.column("age").is_none());
}

#[test]
fn assembly_checks_replicate_counts() {
    let data = cohorts();
    let histories = vec![
        vec!["1000".to_string(); 3],
        vec!["0100".to_string()],
        vec!["0001".to_string()],
    ];
    assert_eq!(
        assemble(&data, histories).unwrap_err(),
        HistoryError::ReplicateMismatch {
            id: 1,
            expected: 2,
            got: 1,
        }
    );
}
