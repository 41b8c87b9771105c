use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayD, ArrayView3, Axis, Ix3};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::error::{Error, Result};
use crate::{Idx3d, Predicate};

mod axis;
pub mod slice;

pub use axis::SliceAxis;
pub use slice::{ImgWriteVis, LabelSlice, ScanSlice};

/// 三维体数据的共用形状属性和部分通用操作.
pub trait VolumeShape {
    /// 底层数组的形状, 长度恒为 3.
    fn raw_shape(&self) -> &[usize];

    /// 获取数据形状大小 `(axis0, axis1, axis2)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        let &[a, b, c] = self.raw_shape() else {
            unreachable!()
        };
        (a, b, c)
    }

    /// 获取 `axis` 方向的切片个数.
    #[inline]
    fn len_of(&self, axis: SliceAxis) -> usize {
        self.raw_shape()[axis.index()]
    }

    /// 检查切片索引是否合法. 越界时返回 [`Error::SliceOutOfRange`].
    #[inline]
    fn check_slice(&self, axis: SliceAxis, index: usize) -> Result<()> {
        let len = self.len_of(axis);
        if index < len {
            Ok(())
        } else {
            Err(Error::SliceOutOfRange { index, len })
        }
    }
}

/// 将任意维度的 nifti 体数据降为三维. 四维数据只保留第一个体 (`[..., 0]`).
fn squeeze_to_3d<T: Clone>(data: ArrayD<T>) -> Result<Array3<T>> {
    let data = match data.ndim() {
        3 => data,
        4 if data.len_of(Axis(3)) > 0 => data.index_axis_move(Axis(3), 0),
        other => return Err(Error::BadDimension(other)),
    };
    let ndim = data.ndim();
    let data = data
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::BadDimension(ndim))?;
    // nifti 按列优先存储; 转成行优先以便后续切片遍历.
    Ok(data.as_standard_layout().into_owned())
}

/// 三维强度体数据 (MRI 扫描), 以 `f32` 保存, 按 `[axis0, axis1, axis2]` 索引.
///
/// 一经推理产生便不再修改.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<f32>,
}

impl VolumeShape for Volume {
    #[inline]
    fn raw_shape(&self) -> &[usize] {
        self.data.shape()
    }
}

impl Index<Idx3d> for Volume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<f32>> for Volume {
    #[inline]
    fn from(data: Array3<f32>) -> Self {
        Self { data }
    }
}

impl Volume {
    /// 直接由数组构造.
    #[inline]
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// 打开 npy 格式的强度数组.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data: Array3<f32> = read_npy(path.as_ref())?;
        Ok(Self { data })
    }

    /// 以 npy 格式保存.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_npy(path.as_ref(), &self.data)?;
        Ok(())
    }

    /// 打开 nifti 格式的扫描, 保持文件自身的 `[x, y, z]` 轴序.
    /// 四维扫描只保留第一个通道.
    pub fn open_nifti<P: AsRef<Path>>(path: P) -> Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let data = obj.into_volume().into_ndarray::<f32>()?;
        Ok(Self {
            data: squeeze_to_3d(data)?,
        })
    }

    /// 获取 `axis` 方向第 `index` 层切片视图.
    ///
    /// `index` 越界时返回 [`Error::SliceOutOfRange`], 不做任何截断.
    pub fn slice_at(&self, axis: SliceAxis, index: usize) -> Result<ScanSlice<'_>> {
        self.check_slice(axis, index)?;
        Ok(ScanSlice::new(self.data.index_axis(axis.axis(), index)))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 收集所有大于 `threshold` 的强度值, 结果按行优先存储.
    pub fn values_above(&self, threshold: f32) -> Vec<f32> {
        self.data
            .iter()
            .copied()
            .filter(|v| *v > threshold)
            .collect()
    }
}

/// 三维标签体数据. 标签值以 `u8` 保存, 与对应的 [`Volume`] 形状相同.
///
/// 标签含义固定: 0 背景, 1 坏死核心, 2 水肿, 3 增强肿瘤. 每个体素只有一个标签.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVolume {
    data: Array3<u8>,
}

impl VolumeShape for LabelVolume {
    #[inline]
    fn raw_shape(&self) -> &[usize] {
        self.data.shape()
    }
}

impl Index<Idx3d> for LabelVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<u8>> for LabelVolume {
    #[inline]
    fn from(data: Array3<u8>) -> Self {
        Self { data }
    }
}

impl LabelVolume {
    /// 直接由数组构造.
    #[inline]
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// 由 `i64` 标签数组构造 (如 argmax 的直接输出).
    /// 存在超出 `u8` 范围的值时返回 [`Error::LabelOutOfRange`].
    pub fn try_from_i64(wide: Array3<i64>) -> Result<Self> {
        let buf = wide
            .iter()
            .map(|&v| u8::try_from(v).map_err(|_| Error::LabelOutOfRange(v)))
            .collect::<Result<Vec<u8>>>()?;
        // 元素个数与形状一致, 该操作不会生成 `Err`, 可直接 unwrap.
        let data = Array3::from_shape_vec(wide.raw_dim(), buf).unwrap();
        Ok(Self { data })
    }

    /// 打开 npy 格式的标签数组. 同时接受 `u8` 和 `i64` 两种存储类型.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match read_npy::<_, Array3<u8>>(path) {
            Ok(data) => Ok(Self { data }),
            Err(ReadNpyError::WrongDescriptor(_)) => {
                let wide: Array3<i64> = read_npy(path)?;
                Self::try_from_i64(wide)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 以 npy 格式 (`u8`) 保存.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_npy(path.as_ref(), &self.data)?;
        Ok(())
    }

    /// 打开 nifti 格式的标签, 保持文件自身的 `[x, y, z]` 轴序.
    /// 四维标签只保留第一个体.
    pub fn open_nifti<P: AsRef<Path>>(path: P) -> Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let data = obj.into_volume().into_ndarray::<u8>()?;
        Ok(Self {
            data: squeeze_to_3d(data)?,
        })
    }

    /// 以 nifti 格式保存. 若给出 `reference`, 则沿用其中的空间信息.
    /// 路径以 `.gz` 结尾时自动压缩.
    pub fn save_nifti<P: AsRef<Path>>(&self, path: P, reference: Option<&NiftiHeader>) -> Result<()> {
        let writer = WriterOptions::new(path.as_ref());
        let writer = match reference {
            Some(header) => writer.reference_header(header),
            None => writer,
        };
        writer.write_nifti(&self.data)?;
        Ok(())
    }

    /// 获取 `axis` 方向第 `index` 层切片视图.
    ///
    /// `index` 越界时返回 [`Error::SliceOutOfRange`], 不做任何截断.
    pub fn slice_at(&self, axis: SliceAxis, index: usize) -> Result<LabelSlice<'_>> {
        self.check_slice(axis, index)?;
        Ok(LabelSlice::new(self.data.index_axis(axis.axis(), index)))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 获取值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取标签的基本统计信息.
    ///
    /// 统计信息格式为: \[背景, 坏死核心, 水肿, 增强肿瘤\] 的体素数.
    /// 该操作不会统计任何其他体素值.
    pub fn numeric_statistics(&self) -> [usize; 4] {
        let mut ans = [0; 4];
        for voxel in self.data.iter().filter(|p| **p <= BRATS_ENHANCING) {
            ans[*voxel as usize] += 1;
        }
        ans
    }

    /// 该标签是否为全背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 收集满足谓词 `pred` 的所有体素对应的下标, 结果按行优先存储.
    pub fn filter_pos(&self, pred: Predicate) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, voxel)| pred(*voxel).then_some(pos))
            .collect()
    }

    /// 收集所有肿瘤体素 (任意非背景标签) 对应的下标. 结果按行优先存储.
    #[inline]
    pub fn tumor_pos(&self) -> Vec<Idx3d> {
        self.filter_pos(is_tumor)
    }
}

/// 读取 nifti 文件的 header. 失败时返回 `Err`.
#[inline]
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
    Ok(NiftiHeader::from_file(path.as_ref())?)
}

/// 同一会话的强度体数据与预测标签.
///
/// 构造时保证两者形状一致, 之后只读.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    scan: Volume,
    label: LabelVolume,
}

impl CacheEntry {
    /// 组合强度与标签. 若形状不一致, 则返回 [`Error::ShapeMismatch`].
    pub fn new(scan: Volume, label: LabelVolume) -> Result<Self> {
        if scan.shape() != label.shape() {
            return Err(Error::ShapeMismatch {
                left: scan.shape(),
                right: label.shape(),
            });
        }
        Ok(Self { scan, label })
    }

    /// 强度体数据.
    #[inline]
    pub fn scan(&self) -> &Volume {
        &self.scan
    }

    /// 预测标签.
    #[inline]
    pub fn label(&self) -> &LabelVolume {
        &self.label
    }

    /// 依次获取强度和标签 `axis` 方向第 `index` 层切片.
    ///
    /// `index` 越界时返回 [`Error::SliceOutOfRange`].
    pub fn slice_at(&self, axis: SliceAxis, index: usize) -> Result<(ScanSlice<'_>, LabelSlice<'_>)> {
        Ok((
            self.scan.slice_at(axis, index)?,
            self.label.slice_at(axis, index)?,
        ))
    }
}
