//! Include/exclude glob filtering.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use tidyfile_core::ScanError;

/// Exclude/include pattern pair applied to scanned files.
///
/// Patterns use shell glob syntax where `*` also crosses `/`, and a
/// pattern matches when it matches either the full path or the bare
/// file name.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    exclude: Option<GlobSet>,
    include: Option<GlobSet>,
}

impl PatternFilter {
    /// Compile exclude and include patterns.
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            exclude: compile(exclude)?,
            include: compile(include)?,
        })
    }

    /// Check whether a file survives both pattern lists.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.exclude.as_ref().is_some_and(|set| matches(set, path)) {
            return false;
        }
        match &self.include {
            Some(set) => matches(set, path),
            None => true,
        }
    }
}

fn compile(patterns: &[String]) -> Result<Option<GlobSet>, ScanError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.kind().to_string(),
            })?;
        builder.add(glob);
    }

    builder.build().map(Some).map_err(|e| ScanError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

fn matches(set: &GlobSet, path: &Path) -> bool {
    set.is_match(path) || path.file_name().is_some_and(|name| set.is_match(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exclude_by_name() {
        let filter = PatternFilter::new(&patterns(&["*.log"]), &[]).unwrap();
        assert!(!filter.accepts(Path::new("/var/app/debug.log")));
        assert!(filter.accepts(Path::new("/var/app/debug.txt")));
    }

    #[test]
    fn test_star_crosses_separators_on_full_path() {
        let filter = PatternFilter::new(&patterns(&["*/node_modules/*"]), &[]).unwrap();
        assert!(!filter.accepts(Path::new("/proj/node_modules/pkg/index.js")));
        assert!(filter.accepts(Path::new("/proj/src/index.js")));
    }

    #[test]
    fn test_include_restricts() {
        let filter = PatternFilter::new(&[], &patterns(&["*.jpg", "*.png"])).unwrap();
        assert!(filter.accepts(Path::new("/photos/a.jpg")));
        assert!(!filter.accepts(Path::new("/photos/a.txt")));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = PatternFilter::new(&patterns(&["secret*"]), &patterns(&["*.txt"])).unwrap();
        assert!(!filter.accepts(Path::new("/d/secret.txt")));
        assert!(filter.accepts(Path::new("/d/public.txt")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternFilter::new(&patterns(&["[abc"]), &[]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = PatternFilter::default();
        assert!(filter.accepts(Path::new("/anything")));
    }
}
