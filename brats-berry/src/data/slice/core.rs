use crate::consts::gray::*;
use crate::Idx2d;
use ndarray::iter::Iter;
use ndarray::{s, ArrayView2, Ix2};
use std::ops::Index;

/// 不可变、借用的二维 MRI 标签切片.
#[derive(Clone, Copy, Debug)]
pub struct LabelSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LabelVolume`] 或调用方的数组.
    data: ArrayView2<'a, u8>,
}

/// 不可变、借用的二维 MRI 强度切片.
#[derive(Clone, Copy, Debug)]
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::Volume`] 或调用方的数组.
    data: ArrayView2<'a, f32>,
}

/// 两种切片共用的不可变方法集合.
macro_rules! impl_slice_immut {
    ($life: lifetime, $slice: ty, $elem: ty) => {
        impl<$life> Index<Idx2d> for $slice {
            type Output = $elem;

            #[inline]
            fn index(&self, index: Idx2d) -> &Self::Output {
                &self.data[index]
            }
        }

        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: ArrayView2<$life, $elem>) -> Self {
                Self { data }
            }

            /// 由任意二维视图构造切片, 供外部调用方渲染自有数据.
            #[inline]
            pub fn from_view(data: ArrayView2<$life, $elem>) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<$life, $elem> {
                self.data
            }

            /// 获取可以迭代图像像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, $elem, Ix2> {
                self.data.iter()
            }

            /// 图像的分辨率 (行, 列).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                let &[h, w] = self.data.shape() else {
                    unreachable!()
                };
                (h, w)
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &$elem)> {
                self.data.indexed_iter()
            }

            /// 逆时针旋转 90 度, 与 `numpy.rot90` 的默认行为一致.
            ///
            /// 原图形状为 `(h, w)` 时, 结果形状为 `(w, h)`, 且
            /// `out[(i, j)] == src[(j, w - 1 - i)]`. 不复制数据.
            #[inline]
            pub fn rot90(&self) -> Self {
                Self {
                    data: self.data.reversed_axes().slice_move(s![..;-1, ..]),
                }
            }
        }
    };
}

impl_slice_immut!('a, LabelSlice<'a>, u8);
impl_slice_immut!('a, ScanSlice<'a>, f32);

impl<'a> LabelSlice<'a> {
    /// 该图是否为全背景图?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 统计图像中值为 `label` 的像素总个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|&p| *p == label).count()
    }

    /// 图像中是否存在值为 `label` 的像素?
    #[inline]
    pub fn contains(&self, label: u8) -> bool {
        self.data.iter().any(|p| *p == label)
    }

    /// 判断图像上是否有肿瘤像素.
    #[inline]
    pub fn has_tumor(&self) -> bool {
        self.iter().any(|c| is_tumor(*c))
    }
}

impl<'a> ScanSlice<'a> {
    /// 切片中的最大强度值. 空切片返回 `0.0`.
    pub fn max(&self) -> f32 {
        self.data
            .iter()
            .copied()
            .reduce(f32::max)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{LabelSlice, ScanSlice};
    use ndarray::{array, Array2};

    #[test]
    fn test_rot90_matches_numpy() {
        // numpy.rot90([[1, 2, 3], [4, 5, 6]]) == [[3, 6], [2, 5], [1, 4]]
        let a = array![[1u8, 2, 3], [4, 5, 6]];
        let r = LabelSlice::from_view(a.view()).rot90();
        assert_eq!(r.shape(), (3, 2));
        assert_eq!(r.array_view(), array![[3u8, 6], [2, 5], [1, 4]]);
    }

    #[test]
    fn test_rot90_distinct_markers() {
        let (h, w) = (3, 5);
        let a = Array2::from_shape_fn((h, w), |(r, c)| (r * w + c) as f32);
        let src = ScanSlice::from_view(a.view());
        let rot = src.rot90();
        assert_eq!(rot.shape(), (w, h));
        for i in 0..w {
            for j in 0..h {
                assert_eq!(rot[(i, j)], src[(j, w - 1 - i)]);
            }
        }
    }

    #[test]
    fn test_rot90_four_times_is_identity() {
        let a = Array2::from_shape_fn((4, 2), |(r, c)| (r * 7 + c) as u8);
        let s = LabelSlice::from_view(a.view());
        let back = s.rot90().rot90().rot90().rot90();
        assert_eq!(back.array_view(), a.view());
    }

    #[test]
    fn test_scan_max() {
        let a = array![[0.5f32, -1.0], [3.0, 2.0]];
        assert_eq!(ScanSlice::from_view(a.view()).max(), 3.0);

        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(ScanSlice::from_view(empty.view()).max(), 0.0);
    }

    #[test]
    fn test_label_queries() {
        let a = array![[0u8, 1], [3, 3]];
        let s = LabelSlice::from_view(a.view());
        assert_eq!(s.count(3), 2);
        assert!(s.contains(1));
        assert!(!s.contains(2));
        assert!(s.has_tumor());
        assert!(!s.is_background());
    }
}
