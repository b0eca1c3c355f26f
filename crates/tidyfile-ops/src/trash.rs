//! OS trash capability.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{OpsError, OpsResult};

/// Recoverable-delete capability chosen once when an engine is built.
///
/// Callers ask [`can_trash`](TrashCan::can_trash) and fall back to a
/// permanent delete when it is `false`.
pub trait TrashCan: Send + Sync {
    /// Whether this implementation can move files to a trash.
    fn can_trash(&self) -> bool;

    /// Move `path` into the trash.
    fn trash(&self, path: &Path) -> OpsResult<()>;
}

/// The platform trash via the `trash` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl TrashCan for SystemTrash {
    fn can_trash(&self) -> bool {
        true
    }

    fn trash(&self, path: &Path) -> OpsResult<()> {
        trash::delete(path).map_err(|e| OpsError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// No trash available; every delete is permanent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrash;

impl TrashCan for NoTrash {
    fn can_trash(&self) -> bool {
        false
    }

    fn trash(&self, path: &Path) -> OpsResult<()> {
        Err(OpsError::Trash {
            path: path.to_path_buf(),
            message: "trash is not available".to_string(),
        })
    }
}

/// Pick the system trash where the platform has one, otherwise [`NoTrash`].
pub fn detect_trash() -> Arc<dyn TrashCan> {
    let supported = cfg!(any(
        target_os = "windows",
        target_os = "macos",
        all(
            unix,
            not(target_os = "ios"),
            not(target_os = "android")
        )
    ));

    if supported {
        debug!("using system trash");
        Arc::new(SystemTrash)
    } else {
        debug!("no system trash, deletes are permanent");
        Arc::new(NoTrash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_trash_refuses() {
        let can = NoTrash;
        assert!(!can.can_trash());
        assert!(matches!(
            can.trash(Path::new("/tmp/x")),
            Err(OpsError::Trash { .. })
        ));
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_detect_on_desktop_platforms() {
        assert!(detect_trash().can_trash());
    }
}
