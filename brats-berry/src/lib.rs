#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 为脑部 MRI 肿瘤分割看板提供切片缓存、分割评估指标和会话存储.
//!
//! 该 crate 只提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 标签遵循 BraTS 约定: 0 背景, 1 坏死核心, 2 水肿, 3 增强肿瘤.
//! 2. 体数据按文件自身的 `[axis0, axis1, axis2]` 顺序处理, 不做转置.
//! 3. 可恢复的错误以 [`Error`] 返回; 违反调用约定 (如直接调用指标函数时形状不一致)
//!   会直接 panic, 而不会导致内存错误.
//!
//! # 模块一览
//!
//! ### 切片缓存 ✅
//!
//! 每个会话的强度与标签体数据只从磁盘读取一次, 之后的切片请求都在内存中完成.
//! 缓存容量有限, 超出时淘汰最久未访问的会话.
//!
//! 实现位于 `brats-berry/src/cache.rs`, 读取原语位于 `brats-berry/src/storage.rs`.
//!
//! ### 切片渲染 ✅
//!
//! 旋转, 归一化, 灰度化, 按标签着色叠加.
//!
//! 实现位于 `brats-berry/src/render.rs`.
//!
//! ### 分割评估指标 ✅
//!
//! Dice, IoU, 精确率/召回率, 灵敏度/特异度, Hausdorff 距离, 以及三区域汇总报告.
//!
//! 实现位于 `brats-berry/src/metrics`.
//!
//! ### 会话存储与流程 ✅
//!
//! 上传校验, 推理结果持久化, 体积统计, 权重分片拼接.
//!
//! 实现位于 `brats-berry/src/session.rs`, `pipeline.rs`, `stats.rs`, `checkpoint.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 标签值谓词.
pub type Predicate = fn(u8) -> bool;

/// 三维体数据及其二维切片.
mod data;

pub use data::{
    read_header, CacheEntry, ImgWriteVis, LabelSlice, LabelVolume, ScanSlice, SliceAxis, Volume,
    VolumeShape,
};

mod error;
pub use error::{Error, Result};

pub mod consts;
pub use consts::Region;

pub mod config;
pub use config::CacheConfig;

pub mod render;

pub mod session;
pub use session::{SessionDir, SessionId};

pub mod storage;
pub use storage::{NpyStore, VolumeStore};

mod cache;
pub use cache::VolumeCache;

pub mod metrics;
pub use metrics::{compare, ComparisonReport, RegionMetrics};

pub mod stats;
pub use stats::VolumeStats;

pub mod pipeline;
pub mod checkpoint;

pub mod prelude;
