use std::path::Path;
use std::process::Command;

fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!s.is_empty()).then_some(s)
}

fn main() {
    println!("cargo:rerun-if-env-changed=TALLY_BUILD_SHA");

    // Release tarballs have no .git; packagers pass the revision in.
    if let Ok(sha) = std::env::var("TALLY_BUILD_SHA") {
        println!("cargo:rustc-env=TALLY_BUILD_SHA={sha}");
        return;
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo = Path::new(&manifest_dir).join("..");

    if let Some(git_dir) = git(&repo, &["rev-parse", "--absolute-git-dir"]) {
        println!("cargo:rerun-if-changed={git_dir}/HEAD");
    }

    let sha = git(&repo, &["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=TALLY_BUILD_SHA={sha}");
}
