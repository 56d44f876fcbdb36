//! Integration tests for the transaction cost model.

use std::io::Write;

use proptest::prelude::*;
use tempfile::NamedTempFile;
use tessera_costs::{CostError, DEFAULT_COSTS_BPS, TransactionCostModel};

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "default_bps: 9.0\nper_instrument:\n  NTN-B: 7.0").unwrap();

    let model = TransactionCostModel::load(file.path()).unwrap();
    assert!((model.get_cost_bps("NTN-B35").unwrap() - 7.0).abs() < 1e-12);
    assert!((model.get_cost_bps("BRL-OTHER").unwrap() - 9.0).abs() < 1e-12);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = TransactionCostModel::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, CostError::Io(_)));
}

#[test]
fn test_load_malformed_yaml() {
    let err = TransactionCostModel::from_yaml("per_instrument: [1, 2").unwrap_err();
    assert!(matches!(err, CostError::Yaml(_)));
}

#[test]
fn test_every_base_key_resolves_to_itself() {
    let model = TransactionCostModel::new();
    for (key, bps) in DEFAULT_COSTS_BPS {
        assert_eq!(model.resolve(key), Some(key));
        assert!((model.get_cost_bps(key).unwrap() - bps).abs() < 1e-12);
    }
}

proptest! {
    #[test]
    fn prop_suffixed_ticker_matches_base(idx in 0usize..12, suffix in "[A-Z][0-9]{2}") {
        let model = TransactionCostModel::new();
        let (key, _) = DEFAULT_COSTS_BPS[idx];
        let ticker = format!("{key}{suffix}");
        prop_assert_eq!(
            model.get_cost_bps(&ticker).unwrap(),
            model.get_cost_bps(key).unwrap()
        );
    }
}
