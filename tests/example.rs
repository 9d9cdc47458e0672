//! Integration tests for running the bundled example models.
use float_cmp::assert_approx_eq;
use match_model::cli::RunOpts;
use match_model::cli::example::handle_example_run_command;
use match_model::settings::Settings;
use tempfile::tempdir;

mod common;
use common::{check_costs_add_up, read_load_balance};

/// Run the local T&D example and check that losses are made up by extra generation
#[test]
fn test_run_local_td_example() {
    unsafe { std::env::set_var("MATCH_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("local_td");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_example_run_command("local_td", &opts, Some(Settings::default())).unwrap();

    // Demand is withdrawn from the distributed bus, so doesn't appear here
    let (header, records) = read_load_balance(&output_dir);
    assert_eq!(
        header,
        [
            "load_zone",
            "timestamp",
            "ZoneTotalGeneration",
            "WithdrawFromCentralGrid",
            "ZoneTotalExcessGen"
        ]
    );

    let north_evening = records
        .iter()
        .find(|record| &record[0] == "North" && &record[1] == "2030-06-01 19:00")
        .unwrap();
    let generation: f64 = north_evening[2].parse().unwrap();
    let withdrawal: f64 = north_evening[3].parse().unwrap();
    assert_approx_eq!(f64, generation, withdrawal, epsilon = 1e-6);
    assert_approx_eq!(f64, withdrawal, 600.0 / 0.94, epsilon = 1e-6);

    check_costs_add_up(&output_dir);
}
