//! Integration tests against the shipped data files.

use std::path::{Path, PathBuf};

use colony_core::colony::ColonyEvent;
use colony_tools::data_loader::{load_colony_file, load_rules_file};
use colony_tools::report::run_report;
use colony_tools::validate::validate_data_directory;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data")
}

#[test]
fn test_shipped_data_validates() {
    let summary = validate_data_directory(&data_dir()).unwrap();
    assert_eq!(summary.rules, 1);
    assert_eq!(summary.colonies, 2);
}

#[test]
fn test_jamestown_opening_production() {
    let spec = load_rules_file(&data_dir().join("rules/classic.ron")).unwrap();
    let colony = load_colony_file(&spec, &data_dir().join("colonies/jamestown.ron")).unwrap();

    let food = spec.require_goods_type("food").unwrap();
    let hammers = spec.require_goods_type("hammers").unwrap();
    let lumber = spec.require_goods_type("lumber").unwrap();
    let bells = spec.bells();

    // Centre grain 5 plus (4 + 2) fish doubled by the expert, less 4 * 2 eaten.
    assert_eq!(colony.net_production_of(food), 9);
    // One carpenter turns 3 lumber into 3 hammers; the tile yields 4 lumber.
    assert_eq!(colony.net_production_of(hammers), 3);
    assert_eq!(colony.net_production_of(lumber), 1);
    // Town hall 1 + statesman 6 + 2 free, less 1 per colonist.
    assert_eq!(colony.net_production_of(bells), 5);
}

#[test]
fn test_report_is_reproducible() {
    let rules = data_dir().join("rules/classic.ron");
    let colony = data_dir().join("colonies/jamestown.ron");

    let a = run_report(&rules, &colony, 30, 4).unwrap();
    let b = run_report(&rules, &colony, 30, 4).unwrap();

    assert_eq!(a.events, b.events);
    assert_eq!(a.production, b.production);
    assert!(a
        .events
        .iter()
        .any(|e| matches!(e, ColonyEvent::BuildingCompleted { building } if building == "stockade")));

    let json = serde_json::to_string(&a).unwrap();
    assert!(json.contains("\"colony\":\"Jamestown\""));
}

#[test]
fn test_plymouth_stables_fill_warehouse() {
    let rules = data_dir().join("rules/classic.ron");
    let colony = data_dir().join("colonies/plymouth.ron");

    let report = run_report(&rules, &colony, 0, 0).unwrap();
    assert_eq!(report.production.warehouse_capacity, 200);
    assert_eq!(report.production.storage.get("horses"), Some(&150));
    assert!(report
        .production
        .producers
        .iter()
        .any(|p| p.production.contains_key("horses")));
}
