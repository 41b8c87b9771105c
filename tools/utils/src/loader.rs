//! 对 `brats-berry::session` 的更一层封装. 提供更直接的会话查找.

use brats_berry::SessionDir;
use std::fs;
use std::path::{Path, PathBuf};

/// 获取会话根目录.
///
/// 1. 若环境变量 `$BRATS_SESSION_ROOT` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/brats/sessions`.
#[inline]
pub fn session_root_from_env_or_home() -> PathBuf {
    brats_berry::config::session_root()
}

/// 列出 `root` 下的全部会话目录, 按目录名排序. `root` 不可读时返回空列表.
pub fn session_dirs<P: AsRef<Path>>(root: P) -> Vec<SessionDir> {
    let Ok(rd) = fs::read_dir(root.as_ref()) else {
        return Vec::new();
    };
    let mut ans: Vec<_> = rd
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(SessionDir::from_path)
        .collect();
    ans.sort_by(|a, b| a.id().cmp(b.id()));
    ans
}

/// 在 `root` 下按标识查找会话. 目录不存在时返回 `None`.
pub fn find_session<P: AsRef<Path>>(root: P, id: &str) -> Option<SessionDir> {
    let path = root.as_ref().join(id);
    if path.is_dir() {
        SessionDir::from_path(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let root = tempfile::tempdir().unwrap();
        assert!(session_dirs(root.path()).is_empty());

        let a = SessionDir::create_in(root.path()).unwrap();
        let b = SessionDir::create_in(root.path()).unwrap();
        fs::write(root.path().join("stray.txt"), b"x").unwrap();

        let all = session_dirs(root.path());
        assert_eq!(all.len(), 2);
        assert!(all.contains(&a) && all.contains(&b));

        assert_eq!(find_session(root.path(), a.id().as_str()), Some(a));
        assert!(find_session(root.path(), "missing").is_none());
        assert!(session_dirs(root.path().join("nope")).is_empty());
    }
}
