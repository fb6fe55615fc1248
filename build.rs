//! Build script for prsieve - embeds human-readable version information.
//!
//! Prefers `git describe --tags --always --dirty` when the sources live
//! in a git checkout; falls back to a pseudo-version built from the
//! Cargo.toml version and the build timestamp otherwise.

use std::{env, process::Command};

use chrono::Utc;

fn main() {
    ["src", "build.rs", "Cargo.toml", "Cargo.lock"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    let build_info = generate_human_readable_version();
    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

/// Executes a git command and returns the trimmed stdout as a String.
fn git_command(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_rustc_version() -> Option<String> {
    Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

/// Describes the current commit, or generates a pseudo-version of the
/// form v{version}-{timestamp}-{commit} when no tags are reachable.
fn get_git_version() -> String {
    if let Some(desc) = git_command(&["describe", "--tags", "--always", "--dirty"]) {
        if desc.contains('v') || desc.contains("-g") {
            return desc;
        }
    }

    let commit_hash =
        git_command(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let version = env!("CARGO_PKG_VERSION");

    format!("v{version}-{timestamp}-{commit_hash}")
}

fn generate_human_readable_version() -> String {
    let components = [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        Some(format!("({})", get_git_version())),
        get_rustc_version(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>();

    components.join(" ")
}
