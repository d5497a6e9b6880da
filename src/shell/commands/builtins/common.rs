use std::path::{Path, PathBuf};
use crate::shell::context::ShellContext;
use std::fs;
use anyhow::{Result, Context};

fn has_wildcard(arg: &str) -> bool {
    arg.contains('*') || arg.contains('?') || arg.contains('[')
}

/// Resolves each argument against the session cwd, expanding glob patterns.
///
/// A pattern that matches nothing is kept literally so the caller reports it as missing.
pub fn expand_paths(ctx: &ShellContext<'_>, args: &[&String]) -> Vec<(String, PathBuf)> {
    let mut paths = Vec::new();
    for arg in args {
        let resolved = ctx.resolve_path(arg);
        if has_wildcard(arg) {
            let pattern = resolved.to_string_lossy().into_owned();
            let mut found = false;
            if let Ok(entries) = glob::glob(&pattern) {
                for path in entries.flatten() {
                    paths.push((path.display().to_string(), path));
                    found = true;
                }
            }
            if found {
                continue;
            }
        }
        paths.push((arg.to_string(), resolved));
    }
    paths
}

/// Splits `-x`-style flags from operands.
pub fn split_flags(args: &[String]) -> (Vec<&String>, Vec<&String>) {
    args.iter().partition(|arg| arg.starts_with('-') && arg.len() > 1)
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)
            .with_context(|| format!("Failed to create directory: {}", dst.display()))?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}
