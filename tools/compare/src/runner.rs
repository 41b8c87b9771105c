//! 程序运行函数.

use crate::result::{CompareResult, SessionOutcome, SessionReport};
use brats_berry::metrics::{compare_with, CompareOptions};
use brats_berry::{
    CacheConfig, ImgWriteVis, LabelVolume, SessionDir, SliceAxis, VolumeCache, VolumeShape,
    VolumeStats,
};
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::thread;
use utils::loader;

/// 导出会话的三向叠加切片, 并打印体积统计与比较报告.
#[derive(Parser, Debug, Default)]
#[command(name = "compare", version, about)]
pub struct Args {
    /// 要处理的会话标识. 为空时处理全部会话.
    pub sessions: Vec<String>,

    /// PNG 导出目录. 缺省为各会话自身的目录.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// 是否计算 Hausdorff 距离.
    #[arg(long)]
    pub hausdorff: bool,
}

/// 导出每个方向的中间切片: 叠加图与对应的强度灰度图各一张.
fn export_middle_slices(
    cache: &VolumeCache,
    session: &SessionDir,
    out_dir: &Path,
) -> brats_berry::Result<Vec<PathBuf>> {
    let entry = cache.entry(session)?;
    let mut ans = Vec::with_capacity(SliceAxis::ALL.len());
    for axis in SliceAxis::ALL {
        let index = entry.scan().len_of(axis) / 2;
        let img = cache.try_get_slice(session, axis, index)?;
        let stem = format!("{}_{}_{index}", session.id(), axis.name());
        let dst = out_dir.join(format!("{stem}.png"));
        img.save(&dst).map_err(std::io::Error::other)?;
        ans.push(dst);

        let gray = out_dir.join(format!("{stem}_scan.png"));
        entry
            .scan()
            .slice_at(axis, index)?
            .save(&gray)
            .map_err(std::io::Error::other)?;
        ans.push(gray);
    }
    Ok(ans)
}

/// 处理单个会话.
fn process(cache: &VolumeCache, session: &SessionDir, args: &Args) -> SessionOutcome {
    let out_dir = args.out.as_deref().unwrap_or_else(|| session.path());
    let exported = export_middle_slices(cache, session, out_dir)?;

    let entry = cache.entry(session)?;
    let stats = VolumeStats::from_label(entry.label());
    let options = CompareOptions {
        hausdorff: args.hausdorff,
    };
    let comparison = session.has_ground_truth().then(|| {
        session
            .load_ground_truth()
            .and_then(|gt: LabelVolume| compare_with(entry.label(), &gt, options))
    });
    info!("session {} processed", session.id());
    Ok(SessionReport {
        stats,
        exported,
        comparison,
    })
}

/// 实际运行.
pub fn run(args: &Args) -> CompareResult {
    let root = loader::session_root_from_env_or_home();
    let sessions: Vec<SessionDir> = if args.sessions.is_empty() {
        loader::session_dirs(&root)
    } else {
        args.sessions
            .iter()
            .filter_map(|id| {
                let s = loader::find_session(&root, id);
                if s.is_none() {
                    error!("session `{id}` not found under {}", root.display());
                }
                s
            })
            .collect()
    };
    if let Some(d) = args.out.as_deref() {
        if let Err(e) = std::fs::create_dir_all(d) {
            error!("cannot create {}: {e}", d.display());
        }
    }

    println!("Processing {} session(s) under {}...", sessions.len(), root.display());
    let cache = VolumeCache::new(CacheConfig::from_env());
    thread::scope(|s| {
        let handles: Vec<_> = sessions
            .iter()
            .map(|session| {
                let cache = &cache;
                s.spawn(move || process(cache, session, args))
            })
            .collect();

        CompareResult::from_iter(sessions.iter().map(|s| s.id().to_string()).zip(
            handles
                .into_iter()
                .map(|th| th.join().expect("Thread joining error")),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_parse_args() {
        let args =
            Args::try_parse_from(["compare", "--hausdorff", "--out", "d", "abc", "xyz"]).unwrap();
        assert!(args.hausdorff);
        assert_eq!(args.out.as_deref(), Some(Path::new("d")));
        assert_eq!(args.sessions, ["abc", "xyz"]);

        let args = Args::try_parse_from(["compare"]).unwrap();
        assert!(args.sessions.is_empty());
        assert!(args.out.is_none());
        assert!(!args.hausdorff);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["compare", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["compare", "--out"]).is_err());
    }
}
