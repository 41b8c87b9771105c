//! 处理结果.

use brats_berry::metrics::ComparisonReport;
use brats_berry::{Region, VolumeStats};
use std::io::{self, Write};
use std::path::PathBuf;

/// 单个会话的处理结果.
pub struct SessionReport {
    pub stats: VolumeStats,
    pub exported: Vec<PathBuf>,
    pub comparison: Option<brats_berry::Result<ComparisonReport>>,
}

pub type SessionOutcome = brats_berry::Result<SessionReport>;

/// 将 `report` 的结果写进 `w` 中.
fn describe_into<W: Write>(id: &str, outcome: &SessionOutcome, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Session `{id}`:")?;
    let report = match outcome {
        Ok(r) => r,
        Err(e) => return write!(w, "{S4}Failed: {e}"),
    };
    let stats = &report.stats;
    writeln!(w, "{S4}Total tumor volume: {:.2} cm3", stats.total())?;
    for region in Region::ALL {
        writeln!(
            w,
            "{S4}{region}: {:.2} cm3 ({:.1}%)",
            stats.volume(region),
            stats.share(region)
        )?;
    }
    writeln!(w, "{S4}Core ratio: {:.1}%", stats.core_ratio())?;
    for p in report.exported.iter() {
        writeln!(w, "{S4}Exported {}", p.display())?;
    }
    match &report.comparison {
        None => write!(w, "{S4}No ground truth uploaded"),
        Some(Err(e)) => write!(w, "{S4}Ground truth comparison failed: {e}"),
        Some(Ok(c)) => write!(w, "{c}"),
    }
}

/// 全部会话的最终结果.
pub struct CompareResult {
    data: Vec<(String, SessionOutcome)>,
}

impl CompareResult {
    pub fn from_iter<I: IntoIterator<Item = (String, SessionOutcome)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 是否全部处理成功.
    pub fn all_ok(&self) -> bool {
        self.data.iter().all(|(_, r)| r.is_ok())
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(1024);

        for (key, outcome) in self.data.iter() {
            if describe_into(key, outcome, &mut buf).is_ok() {
                println!("{}", String::from_utf8_lossy(&buf));
            }
            buf.clear();

            utils::sep();
        }
    }
}
