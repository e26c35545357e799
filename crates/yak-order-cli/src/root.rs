use std::path::{Path, PathBuf};
use yak_order_core::paths::YAK_DIR;

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `YAK_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.yak/`
/// 3. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_project(&cwd).unwrap_or(cwd)
}

fn find_project(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(YAK_DIR).is_dir())
        .map(Path::to_path_buf)
}
