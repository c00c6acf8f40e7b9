//! 命中项与排序（内部使用）
use crate::types::{Issue, RuleId};

/// 单次命中的内部表示（字节偏移，尚未换算行列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub(crate) rule: RuleId,
    pub(crate) offset: usize,
    pub(crate) kind: String,
    pub(crate) message: String,
}

impl Finding {
    pub(crate) fn into_issue(self, index: &LineIndex) -> Issue {
        let (line, column) = index.line_col(self.offset);
        Issue { line, column, rule: self.rule, kind: self.kind, message: self.message }
    }
}

/// 单文件内稳定排序：偏移升序 → 规则 → 种类字典序，保持源码顺序
pub(crate) fn sort_findings_stable(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.offset
            .cmp(&b.offset)
            .then_with(|| a.rule.cmp(&b.rule))
            .then_with(|| a.kind.cmp(&b.kind))
    });
}

/// 偏移 -> 1 基行列。列按字符计数而非字节。
pub(crate) struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.bytes().enumerate().filter(|(_, b)| *b == b'\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub(crate) fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line_idx = self.line_starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let start = self.line_starts[line_idx];
        let column = self
            .text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        (line_idx + 1, column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let idx = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(1), (1, 2));
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
        assert_eq!(idx.line_col(6), (3, 1));
        assert_eq!(idx.line_col(7), (4, 1));
    }

    #[test]
    fn columns_count_characters() {
        let text = "let ü = 1 {";
        let idx = LineIndex::new(text);
        assert_eq!(idx.line_col(text.len() - 1), (1, 11));
    }

    #[test]
    fn sort_keeps_source_order() {
        let mk = |offset: usize, kind: &str| Finding {
            rule: RuleId::ResourceLifecycle,
            offset,
            kind: kind.to_string(),
            message: String::new(),
        };
        let mut v = vec![mk(30, "b"), mk(10, "z"), mk(30, "a")];
        sort_findings_stable(&mut v);
        let order: Vec<(usize, &str)> = v.iter().map(|f| (f.offset, f.kind.as_str())).collect();
        assert_eq!(order, vec![(10, "z"), (30, "a"), (30, "b")]);
    }
}
