//! 会话与其存储目录.
//!
//! 每个会话对应一个目录, 目录下依次可能出现:
//!
//! | 文件            | 来源         | 含义                       |
//! |-----------------|--------------|----------------------------|
//! | `in.nii.gz`     | 用户上传     | 原始 MRI 扫描              |
//! | `gt.nii.gz`     | 用户上传     | (可选) 真值标签            |
//! | `img.npy`       | 推理         | 预处理后的强度体数据       |
//! | `mask.npy`      | 推理         | 预测标签                   |
//! | `pred.nii.gz`   | 推理         | 可供下载的预测标签         |
//!
//! `img.npy` 是否存在即 "推理是否已完成" 的判据.

use crate::data::{read_header, CacheEntry, LabelVolume, Volume, VolumeShape};
use crate::error::{Error, Result};
use log::{info, warn};
use std::borrow::Borrow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 上传的原始扫描文件名.
pub const SOURCE_FILE: &str = "in.nii.gz";

/// 上传的真值标签文件名.
pub const GROUND_TRUTH_FILE: &str = "gt.nii.gz";

/// 推理后的强度数组文件名.
pub const INTENSITY_FILE: &str = "img.npy";

/// 推理后的标签数组文件名.
pub const LABEL_FILE: &str = "mask.npy";

/// 导出的预测标签文件名.
pub const PREDICTION_FILE: &str = "pred.nii.gz";

/// 不透明的会话标识.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// 由任意字符串构造.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// 随机生成 (UUID v4).
    #[inline]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 字符串形式.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 判断文件名是否为 nifti 格式 (`.nii` 或 `.nii.gz`).
#[inline]
pub fn is_nifti_name(name: &str) -> bool {
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

/// 会话标识与其存储位置.
///
/// 会话身份由 `id` 显式给出, 不依赖路径字符串的结构.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionDir {
    id: SessionId,
    path: PathBuf,
}

impl SessionDir {
    /// 显式指定标识和目录.
    #[inline]
    pub fn new(id: SessionId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    /// 以目录名作为会话标识. 路径没有可用的目录名时返回 `None`.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let id = path.file_name()?.to_str()?.to_owned();
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id: SessionId(id),
            path,
        })
    }

    /// 在 `root` 下创建一个全新的会话目录.
    pub fn create_in<P: AsRef<Path>>(root: P) -> Result<Self> {
        let id = SessionId::generate();
        let path = root.as_ref().join(id.as_str());
        fs::create_dir_all(&path)?;
        info!("created session {id} at {}", path.display());
        Ok(Self { id, path })
    }

    /// 会话标识.
    #[inline]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// 会话目录.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 原始扫描路径.
    #[inline]
    pub fn source_path(&self) -> PathBuf {
        self.path.join(SOURCE_FILE)
    }

    /// 真值标签路径.
    #[inline]
    pub fn ground_truth_path(&self) -> PathBuf {
        self.path.join(GROUND_TRUTH_FILE)
    }

    /// 强度数组路径.
    #[inline]
    pub fn intensity_path(&self) -> PathBuf {
        self.path.join(INTENSITY_FILE)
    }

    /// 标签数组路径.
    #[inline]
    pub fn label_path(&self) -> PathBuf {
        self.path.join(LABEL_FILE)
    }

    /// 预测标签导出路径.
    #[inline]
    pub fn prediction_path(&self) -> PathBuf {
        self.path.join(PREDICTION_FILE)
    }

    /// 是否已上传原始扫描?
    #[inline]
    pub fn has_source(&self) -> bool {
        self.source_path().is_file()
    }

    /// 是否已上传真值标签?
    #[inline]
    pub fn has_ground_truth(&self) -> bool {
        self.ground_truth_path().is_file()
    }

    /// 推理是否已完成? 判据是强度数组文件存在.
    #[inline]
    pub fn has_inference(&self) -> bool {
        self.intensity_path().is_file()
    }

    /// 保存上传的原始扫描. `filename` 只用于格式校验.
    pub fn write_upload(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        if !is_nifti_name(filename) {
            return Err(Error::InvalidFileType(filename.to_owned()));
        }
        let dst = self.source_path();
        fs::write(&dst, bytes)?;
        info!("session {}: stored upload `{filename}`", self.id);
        Ok(dst)
    }

    /// 保存上传的真值标签. 必须先上传原始扫描.
    pub fn write_ground_truth(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        if !is_nifti_name(filename) {
            return Err(Error::InvalidFileType(filename.to_owned()));
        }
        if !self.has_source() {
            return Err(Error::NoScanUploaded(self.path.clone()));
        }
        let dst = self.ground_truth_path();
        fs::write(&dst, bytes)?;
        info!("session {}: stored ground truth `{filename}`", self.id);
        Ok(dst)
    }

    /// 持久化推理结果: 强度数组, 标签数组, 以及 nifti 格式的预测标签.
    ///
    /// 两者形状必须一致, 否则返回 [`Error::ShapeMismatch`] 且不写入任何文件.
    /// 若原始扫描的 header 可读, 则导出文件沿用其空间信息.
    pub fn persist_inference(&self, scan: &Volume, label: &LabelVolume) -> Result<()> {
        if scan.shape() != label.shape() {
            return Err(Error::ShapeMismatch {
                left: scan.shape(),
                right: label.shape(),
            });
        }
        // 先写标签, 最后写强度: 强度文件的出现标志着推理完成.
        label.save_npy(self.label_path())?;

        let reference = match read_header(self.source_path()) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("session {}: source header unavailable ({e}), exporting without it", self.id);
                None
            }
        };
        label.save_nifti(self.prediction_path(), reference.as_ref())?;

        scan.save_npy(self.intensity_path())?;
        info!("session {}: persisted inference {:?}", self.id, scan.shape());
        Ok(())
    }

    /// 从磁盘读取推理结果. 强度数组不存在时返回 `Ok(None)`.
    pub fn load_inference(&self) -> Result<Option<CacheEntry>> {
        if !self.has_inference() {
            return Ok(None);
        }
        let scan = Volume::open_npy(self.intensity_path())?;
        let label = LabelVolume::open_npy(self.label_path())?;
        CacheEntry::new(scan, label).map(Some)
    }

    /// 读取上传的真值标签.
    #[inline]
    pub fn load_ground_truth(&self) -> Result<LabelVolume> {
        LabelVolume::open_nifti(self.ground_truth_path())
    }
}

/// 获取 `{用户主目录}/brats/sessions` 目录.
pub fn home_session_root() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.extend(["brats", "sessions"]);
    Some(ans)
}
