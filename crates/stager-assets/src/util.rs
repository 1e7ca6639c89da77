//! Path helpers shared by extraction and destination handling.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Use `/` as the only separator
pub(crate) fn normalize_separators(name: &str) -> String {
    name.replace('\\', "/")
}

/// `C:` style drive designator at the start of a normalized name
pub(crate) fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexically resolve `name` beneath `base`.
///
/// Leading roots and drive designators are dropped, so an absolute name
/// still lands under `base`. Returns `None` when `..` would climb above it.
/// Nothing is touched on disk and symlinks are not followed.
pub(crate) fn join_under(base: &Path, name: &str) -> Option<PathBuf> {
    let normalized = normalize_separators(name);
    let relative = if has_drive_prefix(&normalized) {
        &normalized[2..]
    } else {
        normalized.as_str()
    };

    let mut parts: Vec<&OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut path = base.to_path_buf();
    path.extend(parts);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_under() {
        let base = Path::new("/deploy");

        assert_eq!(join_under(base, "tools/nssm"), Some(PathBuf::from("/deploy/tools/nssm")));
        assert_eq!(join_under(base, ""), Some(PathBuf::from("/deploy")));
        assert_eq!(join_under(base, "a/../b"), Some(PathBuf::from("/deploy/b")));
        assert_eq!(join_under(base, "tools\\nssm"), Some(PathBuf::from("/deploy/tools/nssm")));
    }

    #[test]
    fn test_join_under_keeps_absolute_names_inside() {
        let base = Path::new("/deploy");

        assert_eq!(join_under(base, "/etc/app"), Some(PathBuf::from("/deploy/etc/app")));
        assert_eq!(join_under(base, "C:\\Program Files\\app"), Some(PathBuf::from("/deploy/Program Files/app")));
    }

    #[test]
    fn test_join_under_refuses_to_climb() {
        let base = Path::new("/deploy");

        assert_eq!(join_under(base, ".."), None);
        assert_eq!(join_under(base, "a/../.."), None);
        assert_eq!(join_under(base, "/../outside"), None);
    }

    #[test]
    fn test_has_drive_prefix() {
        assert!(has_drive_prefix("C:/Windows"));
        assert!(has_drive_prefix("c:evil"));
        assert!(!has_drive_prefix("tools/c:x"));
        assert!(!has_drive_prefix("1:x"));
    }
}
