//! 命令行工具依赖的通用组件.

use log::LevelFilter;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 初始化日志. 缺省级别为 `info`, 可由环境变量 `$RUST_LOG` 覆盖.
pub fn init_logger() {
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_sep_to() {
        let mut buf = Vec::new();
        super::sep_to(&mut buf).unwrap();
        assert_eq!(buf.len(), super::SEP.len() + 1);
    }

    #[test]
    fn test_init_logger_reads_env() {
        std::env::set_var("RUST_LOG", "debug");
        super::init_logger();
        assert_eq!(log::max_level(), log::LevelFilter::Debug);
        // 重复初始化只打印错误, 不 panic.
        super::init_logger();
    }
}
