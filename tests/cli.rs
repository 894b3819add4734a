//! Exit behavior of the binaries on bad command lines.

use std::process::{Command, Output, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

const DEADLINE: Duration = Duration::from_secs(10);

const ENV_KEYS: &[&str] = &[
    "BRIDGE_PORT",
    "BRIDGE_HOST",
    "BRIDGE_TARGET",
    "BRIDGE_LISTEN",
    "BRIDGE_ONE_WAY",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "RUST_LOG",
];

/// Run a binary to completion, killing it if it outlives the deadline
fn run(bin: &str, args: &[&str]) -> Output {
    let mut cmd = Command::new(bin);
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    let mut child = cmd
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let started = Instant::now();
    while child.try_wait().unwrap().is_none() {
        if started.elapsed() > DEADLINE {
            child.kill().unwrap();
            panic!("{} {:?} kept running instead of exiting", bin, args);
        }
        sleep(Duration::from_millis(20));
    }
    child.wait_with_output().unwrap()
}

fn assert_usage_exit(bin: &str, args: &[&str]) {
    let output = run(bin, args);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{:?} stderr: {}", args, stderr);
    assert!(stderr.contains("Usage:"), "{:?} stderr: {}", args, stderr);
    assert!(!stderr.contains("failed to bind"), "{:?} stderr: {}", args, stderr);
}

#[test]
fn bridge_rejects_target_without_port() {
    assert_usage_exit(
        env!("CARGO_BIN_EXE_ws-udp-bridge"),
        &["--port", "0", "--listen", "0", "--target", "127.0.0.1"],
    );
}

#[test]
fn bridge_rejects_non_numeric_target_port() {
    assert_usage_exit(
        env!("CARGO_BIN_EXE_ws-udp-bridge"),
        &["--port", "0", "--listen", "0", "--target", "127.0.0.1:abc"],
    );
}

#[test]
fn bridge_rejects_non_numeric_ws_port() {
    assert_usage_exit(
        env!("CARGO_BIN_EXE_ws-udp-bridge"),
        &["--port", "eighty", "--target", "127.0.0.1:3333"],
    );
}

#[test]
fn bridge_rejects_mismatched_address_families() {
    assert_usage_exit(
        env!("CARGO_BIN_EXE_ws-udp-bridge"),
        &["--port", "0", "--listen", "0", "--target", "[::1]:3333"],
    );
}

#[test]
fn tone_rejects_target_without_port() {
    assert_usage_exit(env!("CARGO_BIN_EXE_udp-tone"), &["--target", "127.0.0.1"]);
}
