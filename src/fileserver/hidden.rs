//! Hide-list filtering by filesystem identity

use crate::vfs::{FileInfo, FileSystem, VirtualFile};

/// Whether `info` is the same entry as any path on the hide list
///
/// Entries that cannot be opened or stat'ed match nothing.
pub async fn is_hidden<F: FileSystem>(fs: &F, hide: &[String], info: &FileInfo) -> bool {
    for hidden_path in hide {
        let Ok(file) = fs.open(hidden_path).await else {
            continue;
        };
        let stat = file.stat().await;
        drop(file);
        if let Ok(hidden) = stat {
            if fs.same_file(info, &hidden) {
                tracing::debug!(
                    hidden = %hidden_path,
                    name = %info.name,
                    "request matches hide list"
                );
                return true;
            }
        }
    }
    false
}
