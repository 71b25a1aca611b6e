use std::path::Path;
use std::process::Command;

const SHA_VAR: &str = "BILLSHEET_BUILD_SHA";

/// `git describe` of the workspace, `-dirty` when the tree has local edits.
fn describe(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let repo_root = Path::new(&manifest_dir).join("..");

    println!("cargo:rerun-if-env-changed={}", SHA_VAR);
    for tracked in [".git/HEAD", ".git/index"] {
        let p = repo_root.join(tracked);
        if p.exists() {
            println!("cargo:rerun-if-changed={}", p.display());
        }
    }

    // Source tarballs have no .git; packagers can pass the sha through the env.
    let sha = std::env::var(SHA_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| describe(&repo_root))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={}={}", SHA_VAR, sha);
}
