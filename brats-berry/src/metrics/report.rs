//! 三个肿瘤子区域的汇总比较报告.

use super::{hausdorff, Confusion, DEFAULT_HD_PERCENTILE};
use crate::consts::Region;
use crate::data::{LabelVolume, VolumeShape};
use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dice 系数的定性分档.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DiceGrade {
    /// `dice > 0.8`.
    Good,
    /// `0.5 < dice <= 0.8`.
    Fair,
    /// `dice <= 0.5`.
    Poor,
}

impl DiceGrade {
    /// 对 Dice 系数分档.
    pub fn of(dice: f64) -> Self {
        if dice > 0.8 {
            DiceGrade::Good
        } else if dice > 0.5 {
            DiceGrade::Fair
        } else {
            DiceGrade::Poor
        }
    }
}

impl fmt::Display for DiceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiceGrade::Good => "good",
            DiceGrade::Fair => "fair",
            DiceGrade::Poor => "poor",
        })
    }
}

/// 单个子区域的全部指标.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RegionMetrics {
    /// 子区域.
    pub region: Region,
    /// Dice 系数.
    pub dice: f64,
    /// 交并比.
    pub iou: f64,
    /// 精确率.
    pub precision: f64,
    /// 召回率.
    pub recall: f64,
    /// 灵敏度, 数值上与召回率相同.
    pub sensitivity: f64,
    /// 特异度.
    pub specificity: f64,
    /// Hausdorff 距离. 只有在 [`CompareOptions::hausdorff`] 打开时才计算.
    pub hausdorff: Option<f64>,
}

impl RegionMetrics {
    fn from_confusion(region: Region, c: &Confusion) -> Self {
        Self {
            region,
            dice: c.dice(),
            iou: c.iou(),
            precision: c.precision(),
            recall: c.recall(),
            sensitivity: c.recall(),
            specificity: c.specificity(),
            hausdorff: None,
        }
    }

    /// Dice 分档.
    #[inline]
    pub fn grade(&self) -> DiceGrade {
        DiceGrade::of(self.dice)
    }
}

/// 预测与真值在三个子区域上的比较结果.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonReport {
    regions: [RegionMetrics; 3],
}

impl ComparisonReport {
    /// 按 [`Region::ALL`] 顺序排列的各区域指标.
    #[inline]
    pub fn regions(&self) -> &[RegionMetrics; 3] {
        &self.regions
    }

    /// 指定区域的指标.
    #[inline]
    pub fn get(&self, region: Region) -> &RegionMetrics {
        // `regions` 与 `Region::ALL` 一一对应
        &self.regions[region as usize]
    }

    /// 三个区域 Dice 系数的算术平均.
    pub fn mean_dice(&self) -> f64 {
        self.regions.iter().map(|m| m.dice).sum::<f64>() / self.regions.len() as f64
    }

    /// Dice 最高的区域. 并列时取靠前者.
    pub fn best(&self) -> &RegionMetrics {
        // `max_by_key` 并列时返回最后一个, 故逆序查找.
        self.regions
            .iter()
            .rev()
            .max_by_key(|m| OrderedFloat(m.dice))
            .unwrap_or(&self.regions[0])
    }

    /// Dice 最低的区域. 并列时取靠前者.
    pub fn worst(&self) -> &RegionMetrics {
        self.regions
            .iter()
            .min_by_key(|m| OrderedFloat(m.dice))
            .unwrap_or(&self.regions[0])
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const S4: &str = "    ";

        #[inline]
        fn hd_to_display(h: Option<f64>) -> String {
            match h {
                Some(h) if h.is_finite() => format!("{h:.4}"),
                Some(_) => "inf".to_string(),
                None => "/".to_string(),
            }
        }

        for m in self.regions.iter() {
            writeln!(f, "Region `{}` ({}):", m.region, m.grade())?;
            writeln!(f, "{S4}Dice: {:.4}", m.dice)?;
            writeln!(f, "{S4}IoU: {:.4}", m.iou)?;
            writeln!(f, "{S4}Precision: {:.4}", m.precision)?;
            writeln!(f, "{S4}Recall: {:.4}", m.recall)?;
            writeln!(f, "{S4}Sensitivity: {:.4}", m.sensitivity)?;
            writeln!(f, "{S4}Specificity: {:.4}", m.specificity)?;
            writeln!(f, "{S4}Hausdorff: {}", hd_to_display(m.hausdorff))?;
        }
        writeln!(f, "Mean dice: {:.4}", self.mean_dice())?;
        writeln!(f, "Best region: {}", self.best().region)?;
        write!(f, "Worst region: {}", self.worst().region)
    }
}

/// 比较选项.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CompareOptions {
    /// 是否计算 Hausdorff 距离. 体素多时耗时明显, 默认关闭.
    pub hausdorff: bool,
}

/// 比较预测与真值, 计算三个子区域的全部重叠与计数指标.
///
/// 形状不一致时返回 [`Error::ShapeMismatch`].
#[inline]
pub fn compare(pred: &LabelVolume, gt: &LabelVolume) -> Result<ComparisonReport> {
    compare_with(pred, gt, CompareOptions::default())
}

/// 同 [`compare`], 可额外计算 Hausdorff 距离.
pub fn compare_with(
    pred: &LabelVolume,
    gt: &LabelVolume,
    options: CompareOptions,
) -> Result<ComparisonReport> {
    if pred.shape() != gt.shape() {
        return Err(Error::ShapeMismatch {
            left: pred.shape(),
            right: gt.shape(),
        });
    }
    let regions = Region::ALL.map(|region| {
        let c = Confusion::count(pred.data(), gt.data(), region.label());
        let mut m = RegionMetrics::from_confusion(region, &c);
        if options.hausdorff {
            m.hausdorff = Some(hausdorff(
                pred.data(),
                gt.data(),
                region.label(),
                DEFAULT_HD_PERCENTILE,
            ));
        }
        m
    });
    Ok(ComparisonReport { regions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn labels(shape: (usize, usize, usize), fill: &[((usize, usize, usize), u8)]) -> LabelVolume {
        let mut data = Array3::<u8>::zeros(shape);
        for (pos, v) in fill {
            data[*pos] = *v;
        }
        LabelVolume::new(data)
    }

    #[test]
    fn test_shape_mismatch() {
        let pred = labels((12, 12, 12), &[]);
        let gt = labels((10, 10, 10), &[]);
        match compare(&pred, &gt) {
            Err(Error::ShapeMismatch { left, right }) => {
                assert_eq!(left, (12, 12, 12));
                assert_eq!(right, (10, 10, 10));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_identical_report() {
        let v = labels((4, 4, 4), &[((0, 0, 0), 1), ((1, 1, 1), 2), ((2, 2, 2), 3)]);
        let r = compare(&v, &v).unwrap();
        assert_eq!(r.mean_dice(), 1.0);
        for (m, region) in r.regions().iter().zip(Region::ALL) {
            assert_eq!(m.region, region);
            assert_eq!(m.dice, 1.0);
            assert_eq!(m.specificity, 1.0);
            assert_eq!(m.grade(), DiceGrade::Good);
            assert_eq!(m.hausdorff, None);
        }
        // 全部并列, 取第一个
        assert_eq!(r.best().region, Region::NecroticCore);
        assert_eq!(r.worst().region, Region::NecroticCore);
    }

    #[test]
    fn test_best_and_worst() {
        // 坏死: 完全命中; 水肿: 命中一半; 增强: 完全错过.
        let pred = labels(
            (4, 4, 4),
            &[((0, 0, 0), 1), ((1, 0, 0), 2), ((1, 1, 0), 2), ((3, 3, 3), 3)],
        );
        let gt = labels(
            (4, 4, 4),
            &[((0, 0, 0), 1), ((1, 0, 0), 2), ((2, 2, 2), 2), ((0, 3, 3), 3)],
        );
        let r = compare(&pred, &gt).unwrap();
        assert_eq!(r.get(Region::NecroticCore).dice, 1.0);
        assert!((r.get(Region::Edema).dice - 0.5).abs() < 1e-12);
        assert_eq!(r.get(Region::Enhancing).dice, 0.0);
        assert!((r.mean_dice() - 0.5).abs() < 1e-12);
        assert_eq!(r.best().region, Region::NecroticCore);
        assert_eq!(r.worst().region, Region::Enhancing);
        assert_eq!(r.get(Region::Edema).grade(), DiceGrade::Poor);
    }

    #[test]
    fn test_ties_prefer_first_region() {
        // 坏死与增强都缺失 (dice = 1), 水肿完全错过 (dice = 0).
        let pred = labels((3, 3, 3), &[((0, 0, 0), 2)]);
        let gt = labels((3, 3, 3), &[((2, 2, 2), 2)]);
        let r = compare(&pred, &gt).unwrap();
        assert_eq!(r.best().region, Region::NecroticCore);
        assert_eq!(r.worst().region, Region::Edema);
    }

    #[test]
    fn test_hausdorff_option() {
        let pred = labels((5, 5, 5), &[((0, 0, 0), 1)]);
        let gt = labels((5, 5, 5), &[((0, 0, 0), 1), ((0, 0, 4), 1)]);
        let r = compare_with(&pred, &gt, CompareOptions { hausdorff: true }).unwrap();
        assert_eq!(r.get(Region::NecroticCore).hausdorff, Some(4.0));
        assert_eq!(r.get(Region::Edema).hausdorff, Some(f64::INFINITY));

        let text = r.to_string();
        assert!(text.contains("Region `Necrotic Core` (fair):"));
        assert!(text.contains("Hausdorff: 4.0000"));
        assert!(text.contains("Hausdorff: inf"));
        assert!(text.contains("Best region: Edema"));
        assert!(text.ends_with("Worst region: Necrotic Core"));
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(DiceGrade::of(0.81), DiceGrade::Good);
        assert_eq!(DiceGrade::of(0.8), DiceGrade::Fair);
        assert_eq!(DiceGrade::of(0.51), DiceGrade::Fair);
        assert_eq!(DiceGrade::of(0.5), DiceGrade::Poor);
    }
}
