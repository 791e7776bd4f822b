use std::fs;

use neolithic::{scenario::ScenarioLoader, SimError, Strategy};
use tempfile::tempdir;

const PLAIN: &str = r#"
name: plain
seed: 11
ticks: 7
grid:
  width: 6
  height: 6
seeds:
  - { strategy: rice, x: 1, y: 1, size: 30 }
foragers:
  count: 5
"#;

#[test]
fn scenario_loads_from_any_directory() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("plain.yaml"), PLAIN).unwrap();

    let scenario = ScenarioLoader::new(temp.path()).load("plain.yaml").unwrap();
    assert_eq!(scenario.ticks(None), 7);
    assert_eq!(scenario.logging.level, "info");

    let world = scenario.build_world().unwrap();
    assert_eq!(world.group_count(Strategy::RiceFarmer), 1);
    assert_eq!(world.group_count(Strategy::Forager), 5);
    assert_eq!(world.params().intensification_coefficient, 1.2);
}

#[test]
fn missing_file_names_the_path() {
    let temp = tempdir().expect("tempdir");
    let err = ScenarioLoader::new(temp.path())
        .load("absent.yaml")
        .unwrap_err();
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("broken.yaml"), "name: [unterminated").unwrap();
    let err = ScenarioLoader::new(temp.path())
        .load("broken.yaml")
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse"));
}

#[test]
fn unknown_immigrant_strategy_is_rejected_at_load() {
    let temp = tempdir().expect("tempdir");
    let text = format!("{PLAIN}immigration:\n  - {{ strategy: herder, per_tick: 1 }}\n");
    fs::write(temp.path().join("herders.yaml"), text).unwrap();
    let err = ScenarioLoader::new(temp.path())
        .load("herders.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("unknown agent kind"));
}

#[test]
fn invalid_parameters_stop_world_construction() {
    let temp = tempdir().expect("tempdir");
    let text = format!("{PLAIN}params:\n  loss_rate: 1.5\n");
    fs::write(temp.path().join("lossy.yaml"), text).unwrap();
    let scenario = ScenarioLoader::new(temp.path()).load("lossy.yaml").unwrap();
    let err = scenario.build_world().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SimError>(),
        Some(SimError::InvalidParams(_))
    ));
}
