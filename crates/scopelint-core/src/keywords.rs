//! 关键字集合（Aho-Corasick）
//!
//! - 退出关键字：大小写不敏感的子串查找（与参考行为一致，`returnValue` 也算命中）。
//! - 句柄类型名：区分大小写，最左最长匹配 + 标识符边界检查，`PreparedStatement` 不会被拆成 `Statement`。

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::error::ConfigError;

/// 一次按整词命中的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordHit {
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// 对应构建时的模式下标
    pub(crate) pattern: usize,
}

pub(crate) struct KeywordSet {
    ac: AhoCorasick,
    words: Vec<String>,
}

impl KeywordSet {
    /// 大小写不敏感的子串集合
    pub(crate) fn substrings_ignore_case(words: &[String]) -> Result<Self, ConfigError> {
        let ac = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostFirst)
            .build(words)?;
        Ok(Self { ac, words: words.to_vec() })
    }

    /// 区分大小写的整词集合
    pub(crate) fn words(words: &[String]) -> Result<Self, ConfigError> {
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(words)?;
        Ok(Self { ac, words: words.to_vec() })
    }

    pub(crate) fn word(&self, pattern: usize) -> &str {
        &self.words[pattern]
    }

    /// 任意关键字作为子串出现即为 true
    pub(crate) fn is_match(&self, hay: &[u8]) -> bool {
        !self.words.is_empty() && self.ac.is_match(hay)
    }

    /// 所有满足标识符边界的命中（按出现顺序）。前一个字节允许是 `.`，以便匹配 `java.sql.ResultSet`
    pub(crate) fn find_words(&self, hay: &[u8]) -> Vec<WordHit> {
        self.ac
            .find_iter(hay)
            .filter(|m| {
                let before_ok = m.start() == 0 || !is_ident_byte(hay[m.start() - 1]);
                let after_ok = hay.get(m.end()).map_or(true, |&b| !is_ident_byte(b));
                before_ok && after_ok
            })
            .map(|m| WordHit { start: m.start(), end: m.end(), pattern: m.pattern().as_usize() })
            .collect()
    }
}

/// 标识符字节：ASCII 字母数字、下划线，以及任意非 ASCII 字节（Swift/Java 允许 Unicode 标识符）
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

pub(crate) fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// 从 `i` 开始读取一个标识符，返回其结束偏移；不是标识符则返回 None
pub(crate) fn read_ident(bytes: &[u8], i: usize) -> Option<usize> {
    let first = *bytes.get(i)?;
    if first.is_ascii_digit() || !is_ident_byte(first) {
        return None;
    }
    Some(ident_end(bytes, i))
}

/// 标识符（或数字字面量）在 `i` 处开始时，返回其结束偏移
pub(crate) fn ident_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

/// 依次产出 `(start, end)` 形式的标识符位置
pub(crate) fn idents(bytes: &[u8]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut i = 0usize;
    std::iter::from_fn(move || {
        while i < bytes.len() {
            if is_ident_byte(bytes[i]) {
                let start = i;
                i = ident_end(bytes, i);
                return Some((start, i));
            }
            i += 1;
        }
        None
    })
}
