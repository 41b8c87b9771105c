//! 缓存所依赖的存储读取原语.

use crate::data::CacheEntry;
use crate::error::Result;
use crate::session::SessionDir;

/// 从持久化存储读取会话的推理结果.
///
/// 返回 `Ok(None)` 表示推理尚未完成 (强度数组不存在), 而非错误.
pub trait VolumeStore: Send + Sync {
    /// 完整读取 `session` 的强度与标签体数据.
    fn load(&self, session: &SessionDir) -> Result<Option<CacheEntry>>;
}

/// 基于会话目录下 `img.npy` / `mask.npy` 的存储.
#[derive(Copy, Clone, Debug, Default)]
pub struct NpyStore;

impl VolumeStore for NpyStore {
    #[inline]
    fn load(&self, session: &SessionDir) -> Result<Option<CacheEntry>> {
        session.load_inference()
    }
}

impl<S: VolumeStore + ?Sized> VolumeStore for &S {
    #[inline]
    fn load(&self, session: &SessionDir) -> Result<Option<CacheEntry>> {
        (**self).load(session)
    }
}
