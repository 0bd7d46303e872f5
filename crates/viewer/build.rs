#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

// Exposes the short commit hash as CC_GIT_SHA for `--version` and `/api/about`.
fn main() {
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    if let Some(sha) = head_sha(&manifest_dir) {
        let short = sha.chars().take(12).collect::<String>();
        println!("cargo:rustc-env=CC_GIT_SHA={short}");
    }
}

fn head_sha(start: &Path) -> Option<String> {
    let git_dir = start.ancestors().find_map(git_dir_at)?;
    let head_path = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head_path.display());

    let head = fs::read_to_string(&head_path).ok()?;
    let head = head.trim();
    match head.strip_prefix("ref:") {
        Some(name) => ref_sha(&git_dir, name.trim()),
        None => non_empty(head),
    }
}

/// `.git` is a directory in a normal checkout and a `gitdir:` pointer file in a worktree.
fn git_dir_at(dir: &Path) -> Option<PathBuf> {
    let dot_git = dir.join(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }
    let text = fs::read_to_string(&dot_git).ok()?;
    let target = text.lines().next()?.trim().strip_prefix("gitdir:")?;
    Some(dir.join(target.trim()))
}

fn ref_sha(git_dir: &Path, name: &str) -> Option<String> {
    let loose = git_dir.join(name);
    if loose.is_file() {
        println!("cargo:rerun-if-changed={}", loose.display());
        if let Some(sha) = fs::read_to_string(&loose).ok().and_then(|t| non_empty(t.trim())) {
            return Some(sha);
        }
    }

    let packed = git_dir.join("packed-refs");
    println!("cargo:rerun-if-changed={}", packed.display());
    let text = fs::read_to_string(packed).ok()?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
        .filter_map(|line| line.split_once(' '))
        .find(|(_, ref_name)| *ref_name == name)
        .and_then(|(sha, _)| non_empty(sha.trim()))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
