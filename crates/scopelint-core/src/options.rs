//! 扫描选项与统计信息（模块）
use std::path::PathBuf;

use crate::lang::Language;
use crate::rules::ExitScan;

/// 输出格式
/// - Text：`<path>:<line>:<col>\t<message>`，每个问题一行
/// - Json：每行一个 JSON 对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 扫描选项
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// 只扫描某一种语言；None 表示全部支持的语言
    pub language: Option<Language>,
    /// 规则文件路径（TOML）；为空则使用内置默认规则
    pub rules_path: Option<PathBuf>,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    pub format: OutputFormat,
    /// 覆盖规则文件中的退出关键字查找范围
    pub exit_scan: Option<ExitScan>,
    /// 最大文件大小（字节）；超过则跳过
    pub max_file_size: Option<u64>,
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub issues_written: usize,
}
