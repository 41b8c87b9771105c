//! 运行时错误.

use crate::Idx3d;
use std::path::PathBuf;

/// 本 crate 的统一错误类型.
///
/// 调用方据此区分 "数据尚未就绪" ([`Error::NotInferred`]),
/// "数据损坏" (I/O, npy, nifti 相关变体) 和 "调用参数错误" (其余变体).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 底层 I/O 错误.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 读取 npy 文件错误.
    #[error("cannot read npy array: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// 写入 npy 文件错误.
    #[error("cannot write npy array: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// 读写 nifti 文件错误.
    #[error("nifti error: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 预测标签与真值标签 (或扫描与标签) 形状不一致.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// 左侧 (通常是预测) 形状.
        left: Idx3d,
        /// 右侧 (通常是真值) 形状.
        right: Idx3d,
    },

    /// 数组维度不是 3 (或可降为 3 的 4).
    #[error("expected a 3D volume, found {0} dimensions")]
    BadDimension(usize),

    /// 切片方向只能是 0, 1, 2.
    #[error("invalid slice axis {0}, expected 0 (sagittal), 1 (coronal) or 2 (axial)")]
    InvalidAxis(usize),

    /// 切片索引越界.
    #[error("slice index {index} out of range for axis of length {len}")]
    SliceOutOfRange {
        /// 请求的索引.
        index: usize,
        /// 该方向的长度.
        len: usize,
    },

    /// 会话尚未完成推理 (强度数组不存在).
    #[error("session `{0}` has no inference result yet")]
    NotInferred(String),

    /// 只接受 `.nii` 和 `.nii.gz` 文件.
    #[error("invalid file type: {0}, expected .nii or .nii.gz")]
    InvalidFileType(String),

    /// 上传真值之前必须先上传扫描.
    #[error("no scan uploaded under {0:?}")]
    NoScanUploaded(PathBuf),

    /// 标签值超出 `u8` 范围.
    #[error("label value {0} does not fit into u8")]
    LabelOutOfRange(i64),

    /// 外部分割模型报告的错误.
    #[error("segmentation failed: {0}")]
    Segmentation(String),
}

/// 本 crate 的 `Result` 别名.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 是否仅仅表示 "数据尚未就绪", 而非真正的故障.
    #[inline]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::NotInferred(_))
    }
}
