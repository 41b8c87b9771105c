//! 导出会话的三向叠加切片, 并打印体积统计与比较报告.
//!
//! 用法: `compare [SESSION_ID ...] [--out DIR] [--hausdorff]`.
//! 不给出会话标识时处理会话根目录下的全部会话.

mod result;
mod runner;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    utils::init_logger();

    let args = runner::Args::parse();
    let result = runner::run(&args);
    result.analyze();
    if result.all_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
