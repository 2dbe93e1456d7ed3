pub mod format;
pub mod inspect;
pub mod locate;

pub use format::{format, FormatArgs};
pub use inspect::{inspect, InspectArgs};
pub use locate::{locate, LocateArgs};

use std::path::{Path, PathBuf};

/// Resolve a user path against the working directory
pub(crate) fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(cwd).join(path)
    }
}
