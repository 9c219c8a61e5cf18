//! Bakes the build metadata `hprv version` prints into the binary

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn set_env(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

/// Trimmed stdout of a command, if it ran and succeeded
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let stdout = stdout.trim();
    (!stdout.is_empty()).then(|| stdout.to_string())
}

/// CI-provided ref, then git, then the crate version
fn repo_version() -> String {
    env::var("CI_BUILD_REF")
        .ok()
        .filter(|val| !val.is_empty())
        .or_else(|| command_stdout("git", &["describe", "--always", "--dirty", "--tags"]))
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
}

fn features() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_").map(str::to_lowercase))
        .collect();
    if features.is_empty() {
        return "none".to_string();
    }
    features.sort();
    features.join(",")
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    set_env("REPO_VERSION", &repo_version());
    set_env(
        "BUILD_PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string()),
    );
    set_env("BUILD_FEATURES", &features());
    set_env("BUILD_TIMESTAMP", &chrono::Utc::now().to_rfc3339());
    set_env(
        "RUST_VERSION",
        &command_stdout("rustc", &["--version"]).unwrap_or_else(|| UNKNOWN.to_string()),
    );
    if let Ok(target) = env::var("TARGET") {
        set_env("BUILD_TARGET", &target);
    }
}
