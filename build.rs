//! Embeds VCS revision, build time and toolchain into the binary for the
//! `version` subcommand. Absent metadata degrades to "unknown".

use std::process::Command;

fn capture(cmd: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(cmd).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn main() {
    let revision = capture("git", &["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let build_time =
        capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| "unknown".into());
    let toolchain = capture("rustc", &["--version"]).unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env=BUILD_REVISION={revision}");
    println!("cargo:rustc-env=BUILD_TIME={build_time}");
    println!("cargo:rustc-env=BUILD_TOOLCHAIN={toolchain}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
