//! 通用常量.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单通道标签值.
pub mod gray {
    /// BraTS 标签中, 背景的体素值.
    pub const BRATS_BACKGROUND: u8 = 0;

    /// BraTS 标签中, 坏死核心的体素值.
    pub const BRATS_NECROTIC: u8 = 1;

    /// BraTS 标签中, 水肿的体素值.
    pub const BRATS_EDEMA: u8 = 2;

    /// BraTS 标签中, 增强肿瘤的体素值.
    pub const BRATS_ENHANCING: u8 = 3;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BRATS_BACKGROUND)
    }

    /// 体素是否是肿瘤 (任意一种非背景标签)?
    #[inline]
    pub const fn is_tumor(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC | BRATS_EDEMA | BRATS_ENHANCING)
    }

    /// 体素是否是坏死核心?
    #[inline]
    pub const fn is_necrotic(p: u8) -> bool {
        matches!(p, BRATS_NECROTIC)
    }

    /// 体素是否是水肿?
    #[inline]
    pub const fn is_edema(p: u8) -> bool {
        matches!(p, BRATS_EDEMA)
    }

    /// 体素是否是增强肿瘤?
    #[inline]
    pub const fn is_enhancing(p: u8) -> bool {
        matches!(p, BRATS_ENHANCING)
    }
}

/// 三通道叠加颜色.
pub mod rgb {
    /// 坏死核心的叠加颜色 (`#ef4444`).
    pub const NECROTIC_RED: [u8; 3] = [239, 68, 68];

    /// 水肿的叠加颜色 (`#3b82f6`).
    pub const EDEMA_BLUE: [u8; 3] = [59, 130, 246];

    /// 增强肿瘤的叠加颜色 (`#fbbf24`).
    pub const ENHANCING_YELLOW: [u8; 3] = [251, 191, 36];

    /// 完全不透明.
    pub const OPAQUE: u8 = u8::MAX;

    /// 叠加时标签颜色所占的比例.
    pub const LABEL_RATIO: f32 = 0.6;

    /// 叠加时原灰度所占的比例. 与 [`LABEL_RATIO`] 之和为 1.
    pub const BASE_RATIO: f32 = 0.4;
}

/// 切片归一化时加在最大值上的小量, 避免全零切片除零.
pub const NORM_EPS: f32 = 1e-6;

/// 单个体素的体积 (立方厘米). 推理前会重采样到 1mm 各向同性.
pub const VOXEL_VOLUME_CM3: f64 = 0.001;

/// 脑组织强度阈值. 高于该值的体素被视为脑组织.
pub const BRAIN_INTENSITY_THRESHOLD: f32 = 0.1;

/// 肿瘤子区域. 顺序即报告顺序, 也是并列时的优先顺序.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Region {
    /// 坏死核心, 标签 [`gray::BRATS_NECROTIC`].
    NecroticCore,

    /// 水肿, 标签 [`gray::BRATS_EDEMA`].
    Edema,

    /// 增强肿瘤, 标签 [`gray::BRATS_ENHANCING`].
    Enhancing,
}

impl Region {
    /// 按报告顺序排列的全部前景区域.
    pub const ALL: [Region; 3] = [Region::NecroticCore, Region::Edema, Region::Enhancing];

    /// 区域对应的标签值.
    #[inline]
    pub const fn label(&self) -> u8 {
        match self {
            Region::NecroticCore => gray::BRATS_NECROTIC,
            Region::Edema => gray::BRATS_EDEMA,
            Region::Enhancing => gray::BRATS_ENHANCING,
        }
    }

    /// 由标签值反查区域. 背景或未知标签返回 `None`.
    #[inline]
    pub const fn from_label(label: u8) -> Option<Region> {
        match label {
            gray::BRATS_NECROTIC => Some(Region::NecroticCore),
            gray::BRATS_EDEMA => Some(Region::Edema),
            gray::BRATS_ENHANCING => Some(Region::Enhancing),
            _ => None,
        }
    }

    /// 区域的叠加颜色.
    #[inline]
    pub const fn color(&self) -> [u8; 3] {
        match self {
            Region::NecroticCore => rgb::NECROTIC_RED,
            Region::Edema => rgb::EDEMA_BLUE,
            Region::Enhancing => rgb::ENHANCING_YELLOW,
        }
    }

    /// 展示名称.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Region::NecroticCore => "Necrotic Core",
            Region::Edema => "Edema",
            Region::Enhancing => "Enhancing",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
