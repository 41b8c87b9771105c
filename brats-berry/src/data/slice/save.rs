//! 图像的持久化存储.

use crate::consts::NORM_EPS;
use crate::{LabelSlice, ScanSlice};
use image::{GrayImage, ImageResult, Luma};
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// 对于 `LabelSlice` 这类仅存在 0, 1, 2, 3 像素值的图像, 保存时会映射到肉眼较易区分的灰度;
/// 对于 `ScanSlice`, 保存时按切片自身最大值归一化. 两者均 **不做** 旋转,
/// 与数组的行列一一对应.
pub trait ImgWriteVis {
    /// 转换为单通道灰度图.
    fn to_gray(&self) -> GrayImage;

    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    #[inline]
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.to_gray().save(path)
    }
}

/// 使标签更有利于单通道可视化. 未知标签映射为黑色.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    use crate::consts::gray::*;
    match label {
        BRATS_NECROTIC => 0b_0100_0000,
        BRATS_EDEMA => 0b_1000_0000,
        BRATS_ENHANCING => 0b_1111_1111,
        _ => 0b_0000_0000,
    }
}

impl ImgWriteVis for LabelSlice<'_> {
    fn to_gray(&self) -> GrayImage {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((h, w), &pix) in self.indexed_iter() {
            buf.put_pixel(w as u32, h as u32, Luma([pretty(pix)]));
        }
        buf
    }
}

impl ImgWriteVis for ScanSlice<'_> {
    fn to_gray(&self) -> GrayImage {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        let denom = self.max() + NORM_EPS;
        for ((h, w), &v) in self.indexed_iter() {
            // `as` 截断并饱和到 [0, 255].
            buf.put_pixel(w as u32, h as u32, Luma([(v / denom * 255.0) as u8]));
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::ImgWriteVis;
    use crate::{LabelSlice, ScanSlice};
    use ndarray::array;
    use std::path::Path;

    #[test]
    fn test_label_to_gray() {
        let a = array![[0u8, 1], [2, 3]];
        let img = LabelSlice::from_view(a.view()).to_gray();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [64]);
        assert_eq!(img.get_pixel(0, 1).0, [128]);
        assert_eq!(img.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn test_scan_to_gray_saturates() {
        let a = array![[0.0f32, 2.0, -5.0]];
        let img = ScanSlice::from_view(a.view()).to_gray();
        assert_eq!(img.dimensions(), (3, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0]);
        assert_eq!(img.get_pixel(1, 0).0, [254]);
        assert_eq!(img.get_pixel(2, 0).0, [0]);
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let a = array![[0.0f32, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let dst = dir.path().join("scan.png");
        ScanSlice::from_view(a.view()).save(&dst).unwrap();

        let back = image::open(&dst).unwrap().into_luma8();
        assert_eq!(back, ScanSlice::from_view(a.view()).to_gray());
        assert_eq!(back.dimensions(), (3, 2));

        let missing = Path::new("/nonexistent-dir/label.png");
        let b = array![[1u8, 2]];
        assert!(LabelSlice::from_view(b.view()).save(missing).is_err());
    }
}
