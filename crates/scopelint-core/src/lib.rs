//! 轻量级词法缺陷模式扫描库
//!
//! 设计要点：
//! - 每个文件只做一次文本分类（代码 / 注释 / 字符串 / 文本块），之后的匹配都只看代码区。
//! - 区块边界靠花括号深度计数，不做语法分析；畸形源码只会少报或多报，不会崩溃。
//! - 规则配置在构建时固定，扫描过程中没有跨文件的可变状态，文件级并行安全。
//! - Swift：`guard let/var` 的 else 分支必须退出；Java：JDBC 句柄必须放进 try-with-resources。

mod block;
mod classify;
mod detectors;
mod error;
mod findings;
mod guard;
mod keywords;
mod lang;
mod options;
mod resource;
mod rules;
mod scan;
mod source;
mod types;

pub use block::{find_block_end, find_matching, Block};
pub use classify::{classify, Classification, SourceSpan, SpanKind};
pub use error::ConfigError;
pub use lang::Language;
pub use options::{OutputFormat, ScanOptions, ScanStats};
pub use rules::{load_rule_config, parse_rule_config, ExitScan, GuardConfig, ResourceConfig, RuleConfig, WalkConfig};
pub use scan::{collect_files, scan_and_write};
pub use types::{Issue, OutputItem, RuleId};

use detectors::DetectorSet;
use findings::{sort_findings_stable, LineIndex};

/// 按语言分派的分析器；构建后只读，可在线程间共享
pub struct Analyzer {
    sets: Vec<DetectorSet>,
}

impl Analyzer {
    pub fn new(config: &RuleConfig) -> Result<Self, ConfigError> {
        let sets = Language::ALL
            .into_iter()
            .map(|lang| DetectorSet::for_language(lang, config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sets })
    }

    /// 分析单个文件的文本，返回按源码顺序排列的问题
    pub fn analyze(&self, lang: Language, text: &str) -> Vec<Issue> {
        let Some(set) = self.sets.iter().find(|s| s.language == lang) else {
            return Vec::new();
        };
        let mut findings = set.run(text);
        sort_findings_stable(&mut findings);
        let index = LineIndex::new(text);
        findings.into_iter().map(|f| f.into_issue(&index)).collect()
    }
}
