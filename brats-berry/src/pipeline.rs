//! 从上传的扫描到可展示结果的完整流程.
//!
//! 分割模型本身不在本库中实现, 调用方通过 [`Segmenter`] 注入.

use crate::data::{LabelVolume, Volume, VolumeShape};
use crate::error::{Error, Result};
use crate::metrics::{compare, ComparisonReport};
use crate::session::SessionDir;
use crate::stats::VolumeStats;
use log::{info, warn};

/// 分割结果.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// 预处理后用于展示的强度体数据.
    pub intensity: Volume,
    /// 与 `intensity` 形状相同的预测标签.
    pub label: LabelVolume,
}

/// 分割模型.
///
/// 实现方负责全部预处理 (重采样, 裁剪, 归一化等), 输出的两个体数据必须形状一致.
pub trait Segmenter {
    /// 对原始扫描进行分割.
    fn segment(&self, source: &Volume) -> Result<Segmentation>;
}

impl<S: Segmenter + ?Sized> Segmenter for &S {
    #[inline]
    fn segment(&self, source: &Volume) -> Result<Segmentation> {
        (**self).segment(source)
    }
}

/// 一次诊断的结果.
#[derive(Debug)]
pub struct Diagnosis {
    /// 体积统计.
    pub stats: VolumeStats,
    /// 推理结果的形状.
    pub shape: crate::Idx3d,
    /// 与真值比较的结果. 未上传真值时为 `None`; 比较失败时为 `Some(Err(_))`.
    pub comparison: Option<Result<ComparisonReport>>,
}

impl Diagnosis {
    /// 每个方向上可用的最大切片下标.
    #[inline]
    pub fn max_slice_indices(&self) -> crate::Idx3d {
        let (a, b, c) = self.shape;
        (a.saturating_sub(1), b.saturating_sub(1), c.saturating_sub(1))
    }
}

/// 对 `session` 执行分割并持久化结果.
///
/// 1. 读取 `in.nii.gz`, 不存在时返回 [`Error::NoScanUploaded`];
/// 2. 调用 `segmenter`;
/// 3. 写入 `img.npy`, `mask.npy`, `pred.nii.gz`;
/// 4. 统计体积;
/// 5. 若存在 `gt.nii.gz`, 与其比较. 比较失败不影响前面的结果.
pub fn diagnose<S: Segmenter>(session: &SessionDir, segmenter: S) -> Result<Diagnosis> {
    if !session.has_source() {
        return Err(Error::NoScanUploaded(session.path().to_path_buf()));
    }
    let source = Volume::open_nifti(session.source_path())?;
    info!("session {}: segmenting {:?}", session.id(), source.shape());

    let Segmentation { intensity, label } = segmenter.segment(&source)?;
    session.persist_inference(&intensity, &label)?;
    let stats = VolumeStats::from_label(&label);

    let comparison = session.has_ground_truth().then(|| {
        let report = session
            .load_ground_truth()
            .and_then(|gt| compare(&label, &gt));
        if let Err(e) = &report {
            warn!("session {}: ground truth comparison failed: {e}", session.id());
        }
        report
    });

    Ok(Diagnosis {
        stats,
        shape: label.shape(),
        comparison,
    })
}
