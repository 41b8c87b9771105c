//! 运行配置.

use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// 会话根目录的环境变量名.
pub const SESSION_ROOT_ENV: &str = "BRATS_SESSION_ROOT";

/// 缓存容量的环境变量名.
pub const CACHE_CAPACITY_ENV: &str = "BRATS_CACHE_CAPACITY";

/// 默认最多同时驻留内存的会话数.
pub const DEFAULT_CACHE_CAPACITY: usize = 16;

/// [`crate::VolumeCache`] 的配置.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CacheConfig {
    /// 最多驻留的会话数. 超出时淘汰最久未访问的会话.
    pub capacity: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 常量非零, 可直接 unwrap.
            capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap(),
        }
    }
}

impl CacheConfig {
    /// 指定容量.
    #[inline]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    /// 从环境变量 `$BRATS_CACHE_CAPACITY` 读取容量.
    /// 变量缺失或不是正整数时使用默认值.
    pub fn from_env() -> Self {
        env::var(CACHE_CAPACITY_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<NonZeroUsize>().ok())
            .map_or_else(Self::default, Self::with_capacity)
    }
}

/// 获取会话根目录.
///
/// 1. 若环境变量 `$BRATS_SESSION_ROOT` 非空, 则返回其值;
/// 2. 否则, 返回 `{用户主目录}/brats/sessions`;
/// 3. 无法确定主目录时返回系统临时目录下的 `brats-sessions`.
pub fn session_root() -> PathBuf {
    match env::var(SESSION_ROOT_ENV) {
        Ok(d) if !d.is_empty() => PathBuf::from(d),
        _ => crate::session::home_session_root()
            .unwrap_or_else(|| env::temp_dir().join("brats-sessions")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(CacheConfig::default().capacity.get(), DEFAULT_CACHE_CAPACITY);
    }
}
