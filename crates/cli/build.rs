use std::process::Command;

/// Exposes `APP_VERSION` to the binary: an explicit `APP_VERSION` wins, then
/// the latest git tag, then the package version. A leading `v` is dropped.
fn main() {
    let version = std::env::var("APP_VERSION")
        .ok()
        .or_else(latest_git_tag)
        .map(|v| v.trim_start_matches('v').to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=APP_VERSION={}", version);
    println!("cargo:rerun-if-env-changed=APP_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn latest_git_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let tag = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!tag.is_empty()).then_some(tag)
}
