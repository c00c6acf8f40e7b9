//! 文本分类：把整个文件切分为代码 / 注释 / 字符串 / 文本块区间
//!
//! - 单趟从左到右扫描，产出有序、连续、互不重叠且覆盖全部偏移的区间。
//! - 字符串优先识别并保护到闭合引号（遵守反斜杠转义），因此字符串里的 `//` 不会被当作注释。
//! - Swift 扩展分隔符字符串（`#"…"#`、`#"""…"""#`）按 `#` 的个数闭合，其中的反斜杠只有后跟同样多的 `#` 才是转义。
//! - 未闭合的字符串 / 文本块 / 块注释一直延伸到文件末尾，不报错。
//! - 偏移均为字节偏移；所有分隔符都是 ASCII，因此区间边界总落在字符边界上。

use crate::lang::Language;

/// 区间类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Code,
    LineComment,
    BlockComment,
    StringLiteral,
    TextBlock,
}

/// 一段带类别的源码区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

/// 语言相关的词法差异
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LexicalSyntax {
    /// 块注释是否可嵌套（Swift 可以，Java 不行）
    pub(crate) nested_block_comments: bool,
    /// 是否存在 `'x'` 字符字面量
    pub(crate) char_literals: bool,
    /// 是否存在 `#"..."#` 扩展分隔符字符串
    pub(crate) raw_strings: bool,
}

const TEXT_BLOCK_DELIM: &[u8] = b"\"\"\"";

/// 整个文件的分类结果（只计算一次，之后只读）
#[derive(Debug, Clone)]
pub struct Classification {
    spans: Vec<SourceSpan>,
    len: usize,
}

impl Classification {
    pub fn spans(&self) -> &[SourceSpan] {
        &self.spans
    }

    /// 只返回非代码区间
    pub fn non_code_spans(&self) -> impl Iterator<Item = &SourceSpan> {
        self.spans.iter().filter(|s| s.kind != SpanKind::Code)
    }

    /// 查询某个偏移所属的类别；越界返回 None
    pub fn kind_at(&self, offset: usize) -> Option<SpanKind> {
        if offset >= self.len {
            return None;
        }
        let idx = self.spans.partition_point(|s| s.end <= offset);
        self.spans.get(idx).map(|s| s.kind)
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.kind_at(offset) == Some(SpanKind::Code)
    }

    /// 生成与原文等长的字节副本：非代码区间替换为空格（保留换行），代码原样保留。
    /// 之后的模式匹配都在这份副本上进行，偏移与原文一一对应。
    pub fn masked(&self, text: &str) -> Vec<u8> {
        let mut out = text.as_bytes().to_vec();
        for span in self.non_code_spans() {
            for b in &mut out[span.start..span.end] {
                if *b != b'\n' {
                    *b = b' ';
                }
            }
        }
        out
    }
}

/// 对整个文件做一次分类
pub fn classify(text: &str, lang: Language) -> Classification {
    let syntax = lang.lexical_syntax();
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut spans: Vec<SourceSpan> = Vec::new();
    let mut code_start = 0usize;
    let mut i = 0usize;

    while i < len {
        let next = bytes.get(i + 1).copied();
        let found = match bytes[i] {
            b'/' if next == Some(b'/') => Some((line_comment_end(bytes, i), SpanKind::LineComment)),
            b'/' if next == Some(b'*') => Some((
                block_comment_end(bytes, i + 2, syntax.nested_block_comments),
                SpanKind::BlockComment,
            )),
            b'"' if bytes[i..].starts_with(TEXT_BLOCK_DELIM) => {
                Some((text_block_end(bytes, i + TEXT_BLOCK_DELIM.len()), SpanKind::TextBlock))
            }
            b'"' => Some((quoted_end(bytes, i + 1, b'"'), SpanKind::StringLiteral)),
            b'\'' if syntax.char_literals => Some((quoted_end(bytes, i + 1, b'\''), SpanKind::StringLiteral)),
            b'#' if syntax.raw_strings => raw_string_end(bytes, i),
            _ => None,
        };

        match found {
            Some((end, kind)) => {
                push_span(&mut spans, code_start, i, SpanKind::Code);
                push_span(&mut spans, i, end, kind);
                i = end;
                code_start = end;
            }
            None => i += 1,
        }
    }
    push_span(&mut spans, code_start, len, SpanKind::Code);

    Classification { spans, len }
}

fn push_span(spans: &mut Vec<SourceSpan>, start: usize, end: usize, kind: SpanKind) {
    if end > start {
        spans.push(SourceSpan { start, end, kind });
    }
}

/// 行注释到换行符为止（换行符本身属于代码）
fn line_comment_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| start + p)
        .unwrap_or(bytes.len())
}

fn block_comment_end(bytes: &[u8], mut i: usize, nested: bool) -> usize {
    let mut depth = 1u32;
    while i < bytes.len() {
        if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
            continue;
        }
        if nested && bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
            continue;
        }
        i += 1;
    }
    bytes.len()
}

/// 单引号 / 双引号字面量，返回闭合引号之后的偏移
fn quoted_end(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// 文本块以 `"""` 原子地开启与闭合，中间的 `\"` 转义同样被跳过
fn text_block_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(TEXT_BLOCK_DELIM) {
            return i + TEXT_BLOCK_DELIM.len();
        }
        i += 1;
    }
    bytes.len()
}

fn hash_run(bytes: &[u8], i: usize) -> usize {
    bytes.get(i..).map_or(0, |rest| rest.iter().take_while(|&&b| b == b'#').count())
}

/// `start` 处是一串 `#`：后面紧跟引号时按扩展分隔符字符串处理，否则返回 None（`#if`、`#selector` 等属于代码）
fn raw_string_end(bytes: &[u8], start: usize) -> Option<(usize, SpanKind)> {
    let hashes = hash_run(bytes, start);
    let open = start + hashes;
    let (quotes, kind) = if bytes[open..].starts_with(TEXT_BLOCK_DELIM) {
        (TEXT_BLOCK_DELIM.len(), SpanKind::TextBlock)
    } else if bytes.get(open) == Some(&b'"') {
        (1, SpanKind::StringLiteral)
    } else {
        return None;
    };
    let closer = &TEXT_BLOCK_DELIM[..quotes];

    let mut i = open + quotes;
    while i < bytes.len() {
        if bytes[i] == b'\\' && hash_run(bytes, i + 1) >= hashes {
            i += 1 + hashes + 1;
            continue;
        }
        if bytes[i..].starts_with(closer) && hash_run(bytes, i + quotes) >= hashes {
            return Some((i + quotes + hashes, kind));
        }
        i += 1;
    }
    Some((bytes.len(), kind))
}
