//! 模型权重文件的拼接.
//!
//! 权重文件过大时会被拆成 `best.pth.part0`, `best.pth.part1` 分发, 使用前需拼回 `best.pth`.

use crate::error::Result;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 拼接后的权重文件名.
pub const CHECKPOINT_FILE: &str = "best.pth";

/// 超过该字节数的 `best.pth` 视为已完整, 不再拼接.
pub const COMPLETE_THRESHOLD: u64 = 100_000_000;

/// 第 `i` 个分片的路径.
#[inline]
fn part_path(target: &Path, i: usize) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(format!(".part{i}"));
    PathBuf::from(name)
}

/// 在 `dir` 下拼回 `best.pth`, 返回其路径.
///
/// 1. 若 `best.pth` 已存在且大于 [`COMPLETE_THRESHOLD`], 直接返回;
/// 2. 若 `best.pth.part0` 存在, 将它与 (可选的) `best.pth.part1` 顺序写入 `best.pth`;
/// 3. 否则只记录警告并返回目标路径, 由后续加载步骤报告缺失.
pub fn reassemble<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let target = dir.as_ref().join(CHECKPOINT_FILE);
    if fs::metadata(&target).is_ok_and(|m| m.len() > COMPLETE_THRESHOLD) {
        return Ok(target);
    }

    let first = part_path(&target, 0);
    if !first.is_file() {
        warn!("no checkpoint parts found under {}", dir.as_ref().display());
        return Ok(target);
    }

    info!("reassembling checkpoint {}", target.display());
    let mut out = BufWriter::new(File::create(&target)?);
    io::copy(&mut File::open(&first)?, &mut out)?;
    let second = part_path(&target, 1);
    if second.is_file() {
        io::copy(&mut File::open(&second)?, &mut out)?;
    }
    out.flush()?;
    info!("checkpoint reassembled");
    Ok(target)
}
