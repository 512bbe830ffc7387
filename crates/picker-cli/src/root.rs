use std::path::{Path, PathBuf};

/// Resolve the picker root directory.
///
/// Priority:
/// 1. `--root` flag / `PICKER_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.picker/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_picker_dir(&cwd).unwrap_or(cwd)
}

fn find_picker_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(picker_core::paths::PICKER_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_picker_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".picker")).unwrap();
        let subdir = dir.path().join("public/decks");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_picker_dir(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_picker_dir_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        let found = find_picker_dir(&subdir);
        assert!(found.is_none() || !found.unwrap().starts_with(dir.path()));
    }
}
