//! 肿瘤体积统计.

use crate::consts::{Region, BRAIN_INTENSITY_THRESHOLD, VOXEL_VOLUME_CM3};
use crate::data::{LabelVolume, Volume, VolumeShape};
use crate::error::{Error, Result};
use ndarray::Zip;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 计算占比时加在总体积上的小量 (立方厘米), 避免无肿瘤时除零.
const SHARE_EPS: f64 = 0.01;

/// 保留两位小数. 恰好落在中点时舍入到偶数, 与 `numpy.round` 一致.
#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// 一个预测标签的体积统计, 单位立方厘米.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VolumeStats {
    volumes: [f64; 3],
    total: f64,
}

impl VolumeStats {
    /// 由标签体数据统计. 每个体素按 [`VOXEL_VOLUME_CM3`] 计.
    pub fn from_label(label: &LabelVolume) -> Self {
        let counts = label.numeric_statistics();
        let volumes = Region::ALL.map(|r| round2(counts[r.label() as usize] as f64 * VOXEL_VOLUME_CM3));
        let total = round2(volumes.iter().sum());
        Self { volumes, total }
    }

    /// 某个区域的体积, 已保留两位小数.
    #[inline]
    pub fn volume(&self, region: Region) -> f64 {
        self.volumes[region as usize]
    }

    /// 肿瘤总体积, 即三个区域 (已取整) 体积之和再保留两位小数.
    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// 区域占肿瘤总体积的百分比.
    #[inline]
    pub fn share(&self, region: Region) -> f64 {
        self.volume(region) / (self.total + SHARE_EPS) * 100.0
    }

    /// 坏死核心占比, 即 [`Region::NecroticCore`] 的 [`share`](Self::share).
    #[inline]
    pub fn core_ratio(&self) -> f64 {
        self.share(Region::NecroticCore)
    }
}

/// 收集脑组织 (强度高于 [`BRAIN_INTENSITY_THRESHOLD`]) 的体素强度.
#[inline]
pub fn brain_intensities(volume: &Volume) -> Vec<f32> {
    volume.values_above(BRAIN_INTENSITY_THRESHOLD)
}

/// 收集某个区域内的体素强度. 两者形状不一致时返回 [`Error::ShapeMismatch`].
pub fn region_intensities(volume: &Volume, label: &LabelVolume, region: Region) -> Result<Vec<f32>> {
    if volume.shape() != label.shape() {
        return Err(Error::ShapeMismatch {
            left: volume.shape(),
            right: label.shape(),
        });
    }
    let target = region.label();
    let mut ans = Vec::new();
    Zip::from(volume.data())
        .and(label.data())
        .for_each(|&v, &l| {
            if l == target {
                ans.push(v);
            }
        });
    Ok(ans)
}
