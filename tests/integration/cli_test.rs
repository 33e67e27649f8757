use std::process::{Command, Output};

fn run_mtrun(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mtrun"))
        .args(args)
        .env_remove("MTRUN_NO_MT")
        .env_remove("MTRUN_WORKERS")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute mtrun")
}

#[test]
fn test_cpus_prints_positive_count() {
    let output = run_mtrun(&["cpus"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let count: usize = stdout.trim().parse().expect("cpus output should be a number");
    assert!(count >= 1);
}

#[test]
fn test_parallel_run_succeeds() {
    let output = run_mtrun(&["run", "--count", "40", "--work", "1000", "-j", "4"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstdout: {}",
        output.status,
        stdout
    );
    assert!(stdout.contains("Dispatching 40 queued test cases"));
    assert!(stdout.contains("Mode: parallel"));
    assert!(stdout.contains("Tests executed: 40"));
    assert!(stdout.contains("Workers: 4"));
    assert!(stdout.contains("All tests passed."));
}

#[test]
fn test_single_flag_runs_sequentially() {
    let output = run_mtrun(&[
        "run",
        "--count",
        "10",
        "--work",
        "100",
        "--exclusive",
        "2",
        "--single",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Mode: sequential"));
    assert!(stdout.contains("Exclusive tests:"));
    assert!(stdout.contains("Tests executed: 10"));
    assert!(stdout.contains("Tests executed: 2"));
}

#[test]
fn test_env_var_disables_parallelism() {
    let output = Command::new(env!("CARGO_BIN_EXE_mtrun"))
        .args(["run", "--count", "5", "--work", "10"])
        .env("MTRUN_NO_MT", "1")
        .env_remove("MTRUN_WORKERS")
        .output()
        .expect("Failed to execute mtrun");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Mode: sequential"));
}

#[test]
fn test_invalid_worker_env_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_mtrun"))
        .args(["run", "--count", "5"])
        .env("MTRUN_WORKERS", "none")
        .env_remove("MTRUN_NO_MT")
        .output()
        .expect("Failed to execute mtrun");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid worker count 'none'"));
}

#[test]
fn test_failed_checks_set_exit_code() {
    let output = run_mtrun(&[
        "run",
        "--count",
        "20",
        "--work",
        "100",
        "--jitter",
        "--seed",
        "7",
        "--fail-every",
        "5",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("Failed: 4"));
    assert!(stdout.contains("Tests executed: 20"));
}

#[test]
fn test_zero_workers_flag_is_rejected() {
    let output = run_mtrun(&["run", "--count", "5", "-j", "0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid worker count '0'"));
}

#[test]
fn test_mode_flag_selects_sequential() {
    let output = run_mtrun(&["run", "--count", "6", "--work", "10", "--mode", "serial"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Mode: sequential"));
    assert!(stdout.contains("Tests executed: 6"));
}
