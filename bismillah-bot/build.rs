//! Stamps the binary with the source revision, build time and profile

use std::process::Command;

/// Trimmed stdout of a git command, if git is present and succeeds
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    // Source tarballs have no .git; packagers can pass the revision in
    let revision = std::env::var("BISMILLAH_REVISION")
        .ok()
        .filter(|r| !r.is_empty())
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=8"]))
        .unwrap_or_else(|| "unknown".to_string());

    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    for (key, value) in [
        ("GIT_HASH", revision),
        ("BUILD_TIMESTAMP", built_at.to_string()),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={key}={value}");
    }
}
