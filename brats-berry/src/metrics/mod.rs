//! 分割评估指标.
//!
//! 所有函数都比较两个形状相同的三维标签 (`pred` 为预测, `gt` 为真值)
//! 在某一标签 `label` 上的体素集合. 记 `P = {pred == label}`, `G = {gt == label}`.
//!
//! 退化情况 (标签在某一侧或两侧都不存在) 不是错误, 每个函数都有明确的回退值:
//!
//! | 函数                         | 分母为零时   |
//! |------------------------------|--------------|
//! | [`dice`], [`iou`]            | `1.0`        |
//! | [`precision_recall`]         | `0.0`        |
//! | [`sensitivity_specificity`]  | `0.0`        |
//! | [`hausdorff`]                | `+inf`       |
//!
//! 注意重叠类指标与计数类指标对 "两侧都不存在" 的回退值不同, 这是有意保持的约定.
//!
//! # 注意
//!
//! 形状一致是调用方的前置条件. 若形状不一致, 本模块的函数会直接 panic;
//! 需要错误值的调用方应使用 [`compare`].

mod report;

pub use report::{compare, compare_with, CompareOptions, ComparisonReport, DiceGrade, RegionMetrics};

use crate::Idx3d;
use ndarray::{ArrayView3, Zip};

/// Hausdorff 距离的默认百分位参数.
pub const DEFAULT_HD_PERCENTILE: f64 = 95.0;

/// 单个标签上的混淆矩阵计数.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Confusion {
    /// `|P ∩ G|`.
    pub true_pos: usize,
    /// `|P \ G|`.
    pub false_pos: usize,
    /// `|G \ P|`.
    pub false_neg: usize,
    /// 两侧都不是 `label` 的体素数.
    pub true_neg: usize,
}

impl Confusion {
    /// 一次遍历统计 `pred` 与 `gt` 在 `label` 上的混淆矩阵.
    ///
    /// 形状不一致时 panic.
    pub fn count(pred: ArrayView3<'_, u8>, gt: ArrayView3<'_, u8>, label: u8) -> Self {
        assert_eq!(pred.shape(), gt.shape(), "预测与真值形状不一致");
        let mut ans = Self::default();
        Zip::from(&pred).and(&gt).for_each(|&p, &g| {
            match (p == label, g == label) {
                (true, true) => ans.true_pos += 1,
                (true, false) => ans.false_pos += 1,
                (false, true) => ans.false_neg += 1,
                (false, false) => ans.true_neg += 1,
            }
        });
        ans
    }

    /// `|P|`.
    #[inline]
    pub fn pred_count(&self) -> usize {
        self.true_pos + self.false_pos
    }

    /// `|G|`.
    #[inline]
    pub fn gt_count(&self) -> usize {
        self.true_pos + self.false_neg
    }

    /// `|P ∪ G|`.
    #[inline]
    pub fn union(&self) -> usize {
        self.true_pos + self.false_pos + self.false_neg
    }

    /// `2|P∩G| / (|P|+|G|)`, 分母为零时为 `1.0`.
    #[inline]
    pub fn dice(&self) -> f64 {
        ratio(2 * self.true_pos, self.pred_count() + self.gt_count(), 1.0)
    }

    /// `|P∩G| / |P∪G|`, 分母为零时为 `1.0`.
    #[inline]
    pub fn iou(&self) -> f64 {
        ratio(self.true_pos, self.union(), 1.0)
    }

    /// `tp / (tp + fp)`, 分母为零时为 `0.0`.
    #[inline]
    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.pred_count(), 0.0)
    }

    /// `tp / (tp + fn)`, 分母为零时为 `0.0`. 与灵敏度相同.
    #[inline]
    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.gt_count(), 0.0)
    }

    /// `tn / (tn + fp)`, 分母为零时为 `0.0`.
    #[inline]
    pub fn specificity(&self) -> f64 {
        ratio(self.true_neg, self.true_neg + self.false_pos, 0.0)
    }
}

#[inline]
fn ratio(num: usize, den: usize, fallback: f64) -> f64 {
    if den == 0 {
        fallback
    } else {
        num as f64 / den as f64
    }
}

/// Dice 系数 `2|P∩G| / (|P|+|G|)`. 标签在两侧都不存在时返回 `1.0`.
#[inline]
pub fn dice(pred: ArrayView3<'_, u8>, gt: ArrayView3<'_, u8>, label: u8) -> f64 {
    Confusion::count(pred, gt, label).dice()
}

/// 交并比 `|P∩G| / |P∪G|`. 标签在两侧都不存在时返回 `1.0`.
#[inline]
pub fn iou(pred: ArrayView3<'_, u8>, gt: ArrayView3<'_, u8>, label: u8) -> f64 {
    Confusion::count(pred, gt, label).iou()
}

/// `(precision, recall)`. 任一分母为零时对应项为 `0.0`.
#[inline]
pub fn precision_recall(pred: ArrayView3<'_, u8>, gt: ArrayView3<'_, u8>, label: u8) -> (f64, f64) {
    let c = Confusion::count(pred, gt, label);
    (c.precision(), c.recall())
}

/// `(sensitivity, specificity)`. 任一分母为零时对应项为 `0.0`.
/// 灵敏度与 [`precision_recall`] 的召回率相同. 两侧都没有该标签时,
/// 灵敏度为 `0.0` 而特异度为 `tn / tn = 1.0`.
#[inline]
pub fn sensitivity_specificity(
    pred: ArrayView3<'_, u8>,
    gt: ArrayView3<'_, u8>,
    label: u8,
) -> (f64, f64) {
    let c = Confusion::count(pred, gt, label);
    (c.recall(), c.specificity())
}

/// 收集值为 `label` 的体素下标.
fn label_points(data: ArrayView3<'_, u8>, label: u8) -> Vec<Idx3d> {
    data.indexed_iter()
        .filter_map(|(pos, v)| (*v == label).then_some(pos))
        .collect()
}

/// 两个体素下标的欧氏距离平方.
#[inline]
fn dist_sq((a0, a1, a2): &Idx3d, (b0, b1, b2): &Idx3d) -> u64 {
    let d0 = a0.abs_diff(*b0) as u64;
    let d1 = a1.abs_diff(*b1) as u64;
    let d2 = a2.abs_diff(*b2) as u64;
    d0 * d0 + d1 * d1 + d2 * d2
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicU64, Ordering};

        /// 有向 Hausdorff 距离的平方: `max_{a∈from} min_{b∈to} |a-b|²`.
        /// `to` 必须非空.
        ///
        /// 各线程共享当前最大值; 某点一旦找到比它更近的点就不可能刷新最大值, 提前结束.
        fn directed_sq(from: &[Idx3d], to: &[Idx3d]) -> u64 {
            let cmax = AtomicU64::new(0);
            from.par_iter().for_each(|a| {
                let mut cmin = u64::MAX;
                for b in to {
                    let d = dist_sq(a, b);
                    if d < cmax.load(Ordering::Relaxed) {
                        return;
                    }
                    cmin = cmin.min(d);
                }
                cmax.fetch_max(cmin, Ordering::Relaxed);
            });
            cmax.into_inner()
        }
    } else {
        /// 有向 Hausdorff 距离的平方: `max_{a∈from} min_{b∈to} |a-b|²`.
        /// `to` 必须非空.
        ///
        /// 某点一旦找到比当前最大值更近的点就不可能刷新最大值, 提前结束.
        fn directed_sq(from: &[Idx3d], to: &[Idx3d]) -> u64 {
            let mut cmax = 0u64;
            'outer: for a in from {
                let mut cmin = u64::MAX;
                for b in to {
                    let d = dist_sq(a, b);
                    if d < cmax {
                        continue 'outer;
                    }
                    cmin = cmin.min(d);
                }
                cmax = cmax.max(cmin);
            }
            cmax
        }
    }
}

/// 对称 Hausdorff 距离: 两个方向有向距离的最大值. 任一侧点集为空时返回 `+inf`.
///
/// `_percentile` 参数目前 **不参与计算**, 结果始终是完整的最大值而非百分位截断值.
/// 保留该参数只为维持调用约定.
pub fn hausdorff(pred: ArrayView3<'_, u8>, gt: ArrayView3<'_, u8>, label: u8, _percentile: f64) -> f64 {
    assert_eq!(pred.shape(), gt.shape(), "预测与真值形状不一致");
    let p = label_points(pred, label);
    let g = label_points(gt, label);
    if p.is_empty() || g.is_empty() {
        return f64::INFINITY;
    }
    let forward = directed_sq(&p, &g);
    let backward = directed_sq(&g, &p);
    (forward.max(backward) as f64).sqrt()
}
