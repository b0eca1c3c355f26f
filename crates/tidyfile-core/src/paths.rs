//! Path and metadata helpers.

use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Expand `~` and canonicalize an existing path.
pub fn resolve_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    expand_home(path.as_ref()).canonicalize()
}

/// Make a possibly non-existent path absolute.
///
/// The deepest existing ancestor is canonicalized and the remaining
/// components are appended unchanged.
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let expanded = expand_home(path.as_ref());
    let absolute = std::path::absolute(&expanded).unwrap_or(expanded);

    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(base) = current.canonicalize() {
            return tail.iter().rev().fold(base, |acc, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                current = parent;
            }
            _ => return absolute,
        }
    }
}

/// Modification time in whole seconds since the Unix epoch.
pub fn modified_epoch(metadata: &Metadata) -> i64 {
    modified_utc(metadata).timestamp()
}

/// Modification time as a UTC timestamp.
pub fn modified_utc(metadata: &Metadata) -> DateTime<Utc> {
    DateTime::<Utc>::from(metadata.modified().unwrap_or(UNIX_EPOCH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let expanded = expand_home(Path::new("~/docs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("docs"));
        }
        assert_eq!(expand_home(Path::new("/tmp/~")), PathBuf::from("/tmp/~"));
    }

    #[test]
    fn test_absolute_path_of_missing_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let missing = temp.path().join("a/b");
        assert_eq!(absolute_path(&missing), root.join("a/b"));
    }

    #[test]
    fn test_resolve_missing_path_fails() {
        assert!(resolve_path("/definitely/not/here/tidyfile").is_err());
    }
}
