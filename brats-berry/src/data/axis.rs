use crate::error::Error;
use ndarray::Axis;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D 切片方向. 数值即三维数组的轴序号.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SliceAxis {
    /// 矢状面, 沿 axis0 切片.
    Sagittal,

    /// 冠状面, 沿 axis1 切片.
    Coronal,

    /// 轴状面 (横断面), 沿 axis2 切片.
    Axial,
}

impl SliceAxis {
    /// 全部方向, 按轴序号排列.
    pub const ALL: [SliceAxis; 3] = [SliceAxis::Sagittal, SliceAxis::Coronal, SliceAxis::Axial];

    /// 对应的三维数组轴序号.
    #[inline]
    pub const fn index(&self) -> usize {
        match self {
            SliceAxis::Sagittal => 0,
            SliceAxis::Coronal => 1,
            SliceAxis::Axial => 2,
        }
    }

    /// 对应的 `ndarray` 轴.
    #[inline]
    pub const fn axis(&self) -> Axis {
        Axis(self.index())
    }

    /// 小写名称.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            SliceAxis::Sagittal => "sagittal",
            SliceAxis::Coronal => "coronal",
            SliceAxis::Axial => "axial",
        }
    }
}

impl TryFrom<usize> for SliceAxis {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SliceAxis::Sagittal),
            1 => Ok(SliceAxis::Coronal),
            2 => Ok(SliceAxis::Axial),
            other => Err(Error::InvalidAxis(other)),
        }
    }
}

impl std::fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::SliceAxis;
    use crate::Error;

    #[test]
    fn test_axis_from_index() {
        for axis in SliceAxis::ALL {
            assert_eq!(SliceAxis::try_from(axis.index()).unwrap(), axis);
        }
        assert!(matches!(SliceAxis::try_from(3), Err(Error::InvalidAxis(3))));
    }
}
