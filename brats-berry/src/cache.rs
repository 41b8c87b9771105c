//! 会话级切片缓存.
//!
//! 拖动切片滑块时, 同一会话会被反复请求. 缓存在第一次访问时把会话的
//! (强度, 标签) 体数据完整读入内存, 此后对任意方向、任意索引的请求都不再读取存储.

use crate::config::CacheConfig;
use crate::data::{CacheEntry, SliceAxis};
use crate::error::{Error, Result};
use crate::render::{placeholder, render_overlay};
use crate::session::{SessionDir, SessionId};
use crate::storage::{NpyStore, VolumeStore};
use image::RgbaImage;
use log::{debug, error, info};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// 以会话标识为键的 (强度, 标签) 体数据缓存.
///
/// 容量有界, 超出时淘汰最久未访问的会话. 条目一经插入便不再修改;
/// 命中只会更新 LRU 访问顺序.
///
/// 未命中时在锁外读取存储, 插入时若发现其他线程已插入同一会话,
/// 则沿用已有条目 (insert-if-absent). 因此并发的首次访问可能重复读取存储,
/// 但所有调用方看到的都是同一份数据.
pub struct VolumeCache<S = NpyStore> {
    store: S,
    entries: Mutex<LruCache<SessionId, Arc<CacheEntry>>>,
}

impl VolumeCache<NpyStore> {
    /// 以会话目录下的 npy 文件为存储创建缓存.
    #[inline]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_store(NpyStore, config)
    }
}

impl Default for VolumeCache<NpyStore> {
    #[inline]
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<S: VolumeStore> VolumeCache<S> {
    /// 以指定存储创建缓存.
    pub fn with_store(store: S, config: CacheConfig) -> Self {
        Self {
            store,
            entries: Mutex::new(LruCache::new(config.capacity)),
        }
    }

    /// 底层存储.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 获取会话的缓存条目, 未命中时从存储读取并插入.
    ///
    /// 推理尚未完成时返回 [`Error::NotInferred`], 且不插入任何条目.
    pub fn entry(&self, session: &SessionDir) -> Result<Arc<CacheEntry>> {
        let id = session.id();
        if let Some(hit) = self.entries.lock().get(id).cloned() {
            debug!("cache hit for session {id}");
            return Ok(hit);
        }

        info!("loading session {id} into memory");
        let loaded = self
            .store
            .load(session)?
            .ok_or_else(|| Error::NotInferred(id.to_string()))?;
        let loaded = Arc::new(loaded);

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(id) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = entries.push(id.clone(), Arc::clone(&loaded)) {
            if &evicted != id {
                debug!("evicted session {evicted} from cache");
            }
        }
        Ok(loaded)
    }

    /// 渲染 `session` 在 `axis` 方向第 `index` 层的叠加切片.
    ///
    /// 错误按类型返回: 推理未完成为 [`Error::NotInferred`], 索引越界为
    /// [`Error::SliceOutOfRange`], 其余为存储读取错误. 越界索引不做截断.
    pub fn try_get_slice(
        &self,
        session: &SessionDir,
        axis: SliceAxis,
        index: usize,
    ) -> Result<RgbaImage> {
        let entry = self.entry(session)?;
        let (scan, label) = entry.slice_at(axis, index)?;
        Ok(render_overlay(scan, label))
    }

    /// 同 [`Self::try_get_slice`], 但永不失败: 供界面直接使用.
    ///
    /// - `session` 为 `None` 时直接返回占位图, 不访问缓存;
    /// - 任何错误都会被记录日志并转换为占位图.
    pub fn get_slice(
        &self,
        session: Option<&SessionDir>,
        axis: SliceAxis,
        index: usize,
    ) -> RgbaImage {
        let Some(session) = session else {
            return placeholder();
        };
        match self.try_get_slice(session, axis, index) {
            Ok(img) => img,
            Err(e) if e.is_not_ready() => {
                debug!("{e}");
                placeholder()
            }
            Err(e) => {
                error!("slice {axis}[{index}] of session {}: {e}", session.id());
                placeholder()
            }
        }
    }

    /// 同 [`Self::get_slice`], 但以路径和轴序号描述请求. 会话标识取路径的目录名.
    ///
    /// 空路径返回占位图; 非法轴序号被记录日志并返回占位图.
    pub fn get_slice_by_path(&self, path: Option<&Path>, axis: usize, index: usize) -> RgbaImage {
        let Some(session) = path.and_then(|p| SessionDir::from_path(p)) else {
            return placeholder();
        };
        match SliceAxis::try_from(axis) {
            Ok(axis) => self.get_slice(Some(&session), axis, index),
            Err(e) => {
                error!("session {}: {e}", session.id());
                placeholder()
            }
        }
    }

    /// 会话是否已驻留内存. 不影响访问顺序.
    #[inline]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.entries.lock().contains(id)
    }

    /// 已驻留的会话数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// 缓存是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 最多驻留的会话数.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.lock().cap()
    }

    /// 主动移出一个会话. 返回该会话此前是否驻留.
    #[inline]
    pub fn evict(&self, id: &SessionId) -> bool {
        self.entries.lock().pop(id).is_some()
    }

    /// 清空缓存.
    #[inline]
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
