use std::process::Command;

const SHA_VAR: &str = "BOOKKEEP_BUILD_SHA";

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");

    // packaged builds have no .git; let the packager stamp the revision
    let sha = std::env::var(SHA_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(git_short_sha)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={SHA_VAR}={sha}");
}

fn git_short_sha() -> Option<String> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").ok()?;
    let workspace_root = std::path::Path::new(&manifest_dir).parent()?.to_path_buf();
    println!(
        "cargo:rerun-if-changed={}",
        workspace_root.join(".git/HEAD").display()
    );

    Command::new("git")
        .arg("-C")
        .arg(&workspace_root)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
}
