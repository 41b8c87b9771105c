//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{
    CacheEntry, ImgWriteVis, LabelSlice, LabelVolume, ScanSlice, SliceAxis, Volume, VolumeShape,
};

pub use crate::consts::gray::{BRATS_BACKGROUND, BRATS_EDEMA, BRATS_ENHANCING, BRATS_NECROTIC};
pub use crate::consts::Region;

pub use crate::config::{session_root, CacheConfig};
pub use crate::error::{Error, Result};
pub use crate::session::{SessionDir, SessionId};
pub use crate::storage::{NpyStore, VolumeStore};
pub use crate::VolumeCache;

pub use crate::metrics::{self, compare, ComparisonReport, DiceGrade, RegionMetrics};
pub use crate::pipeline::{diagnose, Diagnosis, Segmentation, Segmenter};
pub use crate::stats::VolumeStats;
