//! Swift `guard let/var ... else { }` 检测
//!
//! 匹配：代码区中的 `guard let|var <name>`，随后在嵌套深度为零处找到 `else {`。
//! 判定：else 块内出现任一退出关键字（大小写不敏感子串）即放行，否则报告。
//! 区块边界在原文上按花括号深度计数；关键字查找范围由 [`ExitScan`] 决定。
use crate::block::find_block_end;
use crate::detectors::{Detector, SourceContext};
use crate::error::ConfigError;
use crate::findings::Finding;
use crate::keywords::{ident_end, idents, is_ident_byte, read_ident, skip_whitespace, KeywordSet};
use crate::rules::{ExitScan, GuardConfig};
use crate::types::RuleId;

pub(crate) const KIND_GUARD_NO_EXIT: &str = "guard_no_exit";

pub(crate) struct GuardExitRule {
    exit_keywords: KeywordSet,
    exit_scan: ExitScan,
}

/// 一个候选 guard：绑定名与 else 块的 `{` 偏移
#[derive(Debug, Clone, PartialEq, Eq)]
struct GuardCandidate {
    name: String,
    brace: usize,
}

impl GuardExitRule {
    pub(crate) fn from_config(cfg: &GuardConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            exit_keywords: KeywordSet::substrings_ignore_case(&cfg.exit_keywords)?,
            exit_scan: cfg.exit_scan,
        })
    }

    fn candidates(masked: &[u8]) -> Vec<GuardCandidate> {
        let mut out = Vec::new();
        for (start, end) in idents(masked) {
            if &masked[start..end] != b"guard" {
                continue;
            }
            if let Some(c) = match_guard(masked, end) {
                out.push(c);
            }
        }
        out
    }

    fn block_exits(&self, ctx: &SourceContext<'_>, body: std::ops::Range<usize>) -> bool {
        let hay = match self.exit_scan {
            ExitScan::Raw => &ctx.raw()[body],
            ExitScan::Code => &ctx.masked[body],
        };
        self.exit_keywords.is_match(hay)
    }
}

impl Detector for GuardExitRule {
    fn check(&self, ctx: &SourceContext<'_>) -> Vec<Finding> {
        let raw = ctx.raw();
        let mut findings = Vec::new();
        for cand in Self::candidates(&ctx.masked) {
            let block = find_block_end(raw, cand.brace + 1);
            if self.block_exits(ctx, block.body(raw.len())) {
                continue;
            }
            findings.push(Finding {
                rule: RuleId::GuardExit,
                offset: cand.brace,
                kind: KIND_GUARD_NO_EXIT.to_string(),
                message: format!("guard let '{}' else-block does not exit before continuing", cand.name),
            });
        }
        findings
    }
}

/// `after_guard` 紧跟关键字 `guard` 之后。`let` 与 `var` 绑定都接受，报告文本统一为 `guard let`
fn match_guard(masked: &[u8], after_guard: usize) -> Option<GuardCandidate> {
    let kw_start = skip_whitespace(masked, after_guard);
    if kw_start == after_guard {
        return None;
    }
    let kw_end = read_ident(masked, kw_start)?;
    if !matches!(&masked[kw_start..kw_end], b"let" | b"var") {
        return None;
    }
    let name_start = skip_whitespace(masked, kw_end);
    let name_end = read_ident(masked, name_start)?;
    let name = String::from_utf8_lossy(&masked[name_start..name_end]).into_owned();
    let brace = find_else_opener(masked, name_end)?;
    Some(GuardCandidate { name, brace })
}

/// 从 `from` 向后寻找深度为零的 `else {`，返回 `{` 的偏移。
/// 先遇到离开当前作用域的闭分隔符、下一个 `guard` 或文件末尾则视为没有匹配。
fn find_else_opener(masked: &[u8], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < masked.len() {
        match masked[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.checked_sub(1)?,
            b if is_ident_byte(b) => {
                let end = ident_end(masked, i);
                if depth == 0 {
                    match &masked[i..end] {
                        b"guard" => return None,
                        b"else" => {
                            let next = skip_whitespace(masked, end);
                            return (masked.get(next) == Some(&b'{')).then_some(next);
                        }
                        _ => {}
                    }
                }
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}
