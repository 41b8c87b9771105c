//! 切片叠加渲染.
//!
//! 将一对 (强度, 标签) 切片渲染为 8-bit RGBA 图像: 先逆时针旋转 90 度,
//! 按切片自身最大值归一化为灰度, 再在标签位置按固定比例混合区域颜色.

use crate::consts::rgb::{BASE_RATIO, LABEL_RATIO, OPAQUE};
use crate::consts::{Region, NORM_EPS};
use crate::{LabelSlice, ScanSlice};
use image::{Rgba, RgbaImage};

/// 空白占位图: 1x1 完全透明.
#[inline]
pub fn placeholder() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))
}

/// 判断一张图是否为 [`placeholder`] 生成的占位图.
#[inline]
pub fn is_placeholder(img: &RgbaImage) -> bool {
    img.dimensions() == (1, 1) && img.get_pixel(0, 0).0 == [0, 0, 0, 0]
}

/// 按 `BASE_RATIO` / `LABEL_RATIO` 混合单个通道. 结果截断并饱和到 `u8`.
#[inline]
fn blend(base: f32, color: u8) -> u8 {
    (base * BASE_RATIO + color as f32 * LABEL_RATIO) as u8
}

/// 渲染叠加图.
///
/// 1. 两张切片均逆时针旋转 90 度;
/// 2. 强度除以 `max + 1e-6` 归一化, 再乘以 255 作为灰度, alpha 恒为 255;
/// 3. 对每个前景区域, 在标签匹配的位置按 60% 区域颜色 + 40% 原灰度逐通道混合.
///
/// # 注意
///
/// `scan` 和 `label` 形状必须一致, 否则程序 panic. [`crate::CacheEntry`]
/// 保证了这一点.
pub fn render_overlay(scan: ScanSlice<'_>, label: LabelSlice<'_>) -> RgbaImage {
    assert_eq!(scan.shape(), label.shape(), "强度与标签切片形状不一致");
    let scan = scan.rot90();
    let label = label.rot90();

    let (height, width) = scan.shape();
    let denom = scan.max() + NORM_EPS;
    let mut buf = RgbaImage::new(width as u32, height as u32);

    for ((h, w), &v) in scan.indexed_iter() {
        let gray = v / denom * 255.0;
        let pixel = match Region::from_label(label[(h, w)]) {
            Some(region) => {
                let [r, g, b] = region.color();
                [blend(gray, r), blend(gray, g), blend(gray, b), OPAQUE]
            }
            None => {
                let g = gray as u8;
                [g, g, g, OPAQUE]
            }
        };
        buf.put_pixel(w as u32, h as u32, Rgba(pixel));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, Axis};

    #[test]
    fn test_placeholder_is_well_formed() {
        let p = placeholder();
        assert_eq!(p.dimensions(), (1, 1));
        assert!(is_placeholder(&p));
    }

    #[test]
    fn test_single_marker_blend() {
        // 4x4x4 全 0.5 强度, 仅 (0, 0, 0) 为坏死核心. 轴状面第 0 层.
        let scan = Array3::<f32>::from_elem((4, 4, 4), 0.5);
        let mut label = Array3::<u8>::zeros((4, 4, 4));
        label[(0, 0, 0)] = 1;

        let img = render_overlay(
            ScanSlice::from_view(scan.index_axis(Axis(2), 0)),
            LabelSlice::from_view(label.index_axis(Axis(2), 0)),
        );
        assert_eq!(img.dimensions(), (4, 4));

        // 旋转后源 (0, 0) 落在 (row 3, col 0), 即 (x 0, y 3).
        let gray = 0.5f32 / (0.5 + NORM_EPS) * 255.0;
        let g = gray as u8;
        assert_eq!(g, 254);
        let expect = [blend(gray, 239), blend(gray, 68), blend(gray, 68), 255];
        assert_eq!(expect, [245, 142, 142, 255]);

        for (x, y, px) in img.enumerate_pixels() {
            if (x, y) == (0, 3) {
                assert_eq!(px.0, expect);
            } else {
                assert_eq!(px.0, [g, g, g, 255], "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_blend_exact_integers() {
        // 161 * 0.4 + 36 * 0.6 == 86, 不能因权重的舍入误差截断为 85.
        assert_eq!(blend(161.0, 36), 86);
        assert_eq!(blend(196.0, 36), 100);
        assert_eq!(blend(0.0, 239), 143);
        assert_eq!(blend(255.0, 255), 255);
    }

    #[test]
    fn test_each_region_color() {
        let scan = Array2::<f32>::zeros((1, 4));
        let label = ndarray::array![[0u8, 1, 2, 3]];
        let img = render_overlay(
            ScanSlice::from_view(scan.view()),
            LabelSlice::from_view(label.view()),
        );
        // 旋转后形状为 (4, 1): 源 (0, c) -> (3 - c, 0).
        assert_eq!(img.dimensions(), (1, 4));
        assert_eq!(img.get_pixel(0, 3).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 2).0, [143, 40, 40, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [35, 78, 147, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [150, 114, 21, 255]);
    }

    #[test]
    fn test_zero_slice_does_not_divide_by_zero() {
        let scan = Array2::<f32>::zeros((3, 3));
        let label = Array2::<u8>::zeros((3, 3));
        let img = render_overlay(
            ScanSlice::from_view(scan.view()),
            LabelSlice::from_view(label.view()),
        );
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }
}
