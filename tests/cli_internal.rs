mod common;

use common::{temp_path, write_temp_file, TEST_INVALID_INVENTORY, TEST_INVENTORY};
use ipamkit::cli::run_with_args;
use std::fs;

#[test]
fn run_with_args_check_accepts_valid_inventory() {
    let input = write_temp_file("check_ok", TEST_INVENTORY);

    let result = run_with_args(["ipamkit", "check", "--in", input.to_str().unwrap()]);

    assert!(result.is_ok(), "check failed: {:?}", result.err());
}

#[test]
fn run_with_args_check_counts_problems() {
    let input = write_temp_file("check_bad", TEST_INVALID_INVENTORY);

    let err = run_with_args(["ipamkit", "check", "--in", input.to_str().unwrap()])
        .expect_err("invalid inventory should fail the check");
    assert!(err.to_string().contains("problem(s) found"));
}

#[test]
fn run_with_args_report_rejects_unknown_network() {
    let input = write_temp_file("report_unknown", TEST_INVENTORY);

    let err = run_with_args([
        "ipamkit",
        "report",
        "--in",
        input.to_str().unwrap(),
        "--network",
        "net-missing",
    ])
    .expect_err("unknown network should fail");
    assert!(err.to_string().contains("Unknown network: net-missing"));
}

#[test]
fn run_with_args_report_refuses_invalid_inventory() {
    let input = write_temp_file("report_bad", TEST_INVALID_INVENTORY);

    let err = run_with_args(["ipamkit", "report", "--in", input.to_str().unwrap()])
        .expect_err("invalid inventory should not be reported on");
    assert!(err.to_string().contains("run 'ipamkit check'"));
}

#[test]
fn run_with_args_rejects_same_input_output() {
    let input = write_temp_file("same_io", TEST_INVENTORY);

    let err = run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        input.to_str().unwrap(),
    ])
    .expect_err("should fail on same input/output");
    assert!(err
        .to_string()
        .contains("Output path must be different from input path"));
}

#[test]
fn run_with_args_requires_force_for_existing_output() {
    let input = write_temp_file("existing_out_in", TEST_INVENTORY);
    let output = write_temp_file("existing_out_out", "<ipam />");

    let err = run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        output.to_str().unwrap(),
    ])
    .expect_err("should refuse to overwrite");
    assert!(err.to_string().contains("use --force to overwrite"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "<ipam />");

    run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        output.to_str().unwrap(),
        "--force",
    ])
    .expect("forced export");
    assert!(fs::read_to_string(&output)
        .unwrap()
        .contains("<complete_name>Campus / LAN</complete_name>"));
}

#[test]
fn run_with_args_export_writes_derived_fields() {
    let input = write_temp_file("export_in", TEST_INVENTORY);
    let output = temp_path("export_out");

    run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        output.to_str().unwrap(),
    ])
    .expect("export");

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("<cidr>10.0.1.0/24</cidr>"));
    assert!(written.contains("<free_ip_count>254</free_ip_count>"));
    assert!(written.contains("<free_ip_count>65527</free_ip_count>"));
    assert!(written.contains("<subnet_count>2</subnet_count>"));
}

#[test]
fn run_with_args_export_without_derived_fields() {
    let input = write_temp_file("export_plain_in", TEST_INVENTORY);
    let output = temp_path("export_plain_out");

    run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        output.to_str().unwrap(),
        "--no-derived",
    ])
    .expect("export");

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("<network_address>10.0.1.0</network_address>"));
    assert!(!written.contains("<free_ip_count>"));
    assert!(!written.contains("<complete_name>"));
}

#[test]
fn run_with_args_verify_accepts_canonical_export() {
    let input = write_temp_file("verify_in", TEST_INVENTORY);
    let canonical = temp_path("verify_canonical");

    run_with_args([
        "ipamkit",
        "export",
        "--in",
        input.to_str().unwrap(),
        "--out",
        canonical.to_str().unwrap(),
    ])
    .expect("export");

    run_with_args([
        "ipamkit",
        "verify",
        "--in",
        canonical.to_str().unwrap(),
        "--quiet",
    ])
    .expect("canonical export should verify cleanly");

    let err = run_with_args([
        "ipamkit",
        "verify",
        "--in",
        input.to_str().unwrap(),
        "--quiet",
    ])
    .expect_err("hand-written input lacks derived fields");
    assert!(err.to_string().contains("changes detected"));
}
