//! PHP file discovery under a project root, using the `ignore` crate's walker.
//!
//! Honours `.gitignore`, `.phpguardignore` (gitignore syntax, hierarchical),
//! the default ignores below and `scan.exclude`. Output is sorted by path.

use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use phpguard_core::config::ScanConfig;
use phpguard_core::errors::ConfigError;

/// Directories never worth checking in a PHP project.
pub const DEFAULT_IGNORES: &[&str] = &[
    ".git",
    "vendor",
    "node_modules",
    "storage",
    "bootstrap/cache",
];

pub const IGNORE_FILE_NAME: &str = ".phpguardignore";

/// Collect every PHP file under `root`. A file `root` is returned as-is when
/// its extension matches.
pub fn discover_files(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ConfigError> {
    let extensions = config.effective_extensions();
    if root.is_file() {
        return Ok(if has_extension(root, &extensions) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut overrides = OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES.iter().copied().chain(config.exclude.iter().map(String::as_str)) {
        overrides
            .add(&format!("!{}", pattern.trim()))
            .map_err(|e| invalid_exclude(pattern, e))?;
    }
    let overrides = overrides.build().map_err(|e| invalid_exclude("<all>", e))?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .git_global(false)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .follow_links(config.effective_follow_symlinks())
        .overrides(overrides);

    let mut files = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|t| t.is_file());
                if is_file && has_extension(entry.path(), &extensions) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => tracing::warn!(error = %err, "skipping unreadable entry"),
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "discovery complete");
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

fn invalid_exclude(pattern: &str, err: ignore::Error) -> ConfigError {
    ConfigError::InvalidValue {
        field: "scan.exclude".to_string(),
        message: format!("{pattern}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        let exts = vec!["php".to_string()];
        assert!(has_extension(Path::new("a/B.PHP"), &exts));
        assert!(!has_extension(Path::new("a/B.phtml"), &exts));
        assert!(!has_extension(Path::new("a/php"), &exts));
    }
}
