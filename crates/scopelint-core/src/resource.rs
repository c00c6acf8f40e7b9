//! Java JDBC 句柄生命周期检测
//!
//! 1. 全部匹配都在屏蔽后的文本上进行，注释、字符串、文本块中的声明天然不可见；
//! 2. 找出所有 `try ( ... )` 资源列表，其中的声明一律豁免；
//! 3. 其余 `<HandleType> <name> =` 声明按类型名映射到问题种类并逐个报告；
//!    `Statement a = x, b = y;` 这样的多声明符语句，每个带初始化的名字各报一次。
use std::ops::Range;

use crate::block::find_matching;
use crate::detectors::{Detector, SourceContext};
use crate::error::ConfigError;
use crate::findings::Finding;
use crate::keywords::{idents, read_ident, skip_whitespace, KeywordSet};
use crate::rules::ResourceConfig;
use crate::types::RuleId;

pub(crate) struct ResourceLifecycleRule {
    types: KeywordSet,
    /// 与 `types` 的模式下标一一对应
    kinds: Vec<String>,
}

/// 一个句柄声明候选
#[derive(Debug, Clone, PartialEq, Eq)]
struct HandleDecl {
    offset: usize,
    type_name: String,
    name: String,
    kind: String,
}

impl ResourceLifecycleRule {
    pub(crate) fn from_config(cfg: &ResourceConfig) -> Result<Self, ConfigError> {
        let (names, kinds): (Vec<String>, Vec<String>) =
            cfg.handle_types.iter().map(|(t, k)| (t.clone(), k.clone())).unzip();
        Ok(Self { types: KeywordSet::words(&names)?, kinds })
    }

    fn declarations(&self, masked: &[u8]) -> Vec<HandleDecl> {
        let mut out = Vec::new();
        for hit in self.types.find_words(masked) {
            if skip_whitespace(masked, hit.end) == hit.end {
                continue;
            }
            let Some(first) = initialized_name(masked, hit.end) else { continue };
            let type_name = self.types.word(hit.pattern);
            let kind = &self.kinds[hit.pattern];
            let decl = |offset: usize, name: Range<usize>| HandleDecl {
                offset,
                type_name: type_name.to_string(),
                name: String::from_utf8_lossy(&masked[name]).into_owned(),
                kind: kind.clone(),
            };
            let rest = following_declarators(masked, first.end);
            out.push(decl(hit.start, first));
            out.extend(rest.into_iter().map(|name| decl(name.start, name)));
        }
        out
    }
}

/// `from` 之后是 `<name> =`（不是 `==`）时返回名字的范围
fn initialized_name(masked: &[u8], from: usize) -> Option<Range<usize>> {
    let start = skip_whitespace(masked, from);
    let end = read_ident(masked, start)?;
    let eq = skip_whitespace(masked, end);
    (masked.get(eq) == Some(&b'=') && masked.get(eq + 1) != Some(&b'=')).then_some(start..end)
}

/// 同一语句里后续的声明符：深度为零的 `,` 之后紧跟 `<name> =`，遇到 `;` 或离开当前作用域即停止
fn following_declarators(masked: &[u8], from: usize) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    for (i, &b) in masked.iter().enumerate().skip(from) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => break,
            },
            b';' if depth == 0 => break,
            b',' if depth == 0 => out.extend(initialized_name(masked, i + 1)),
            _ => {}
        }
    }
    out
}

/// `try ( ... )` 资源列表的内容范围（不含括号）。括号在屏蔽文本上配对，字符串里的括号不参与计数。
fn scoped_regions(masked: &[u8]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    for (start, end) in idents(masked) {
        if &masked[start..end] != b"try" {
            continue;
        }
        let open = skip_whitespace(masked, end);
        if masked.get(open) != Some(&b'(') {
            continue;
        }
        let block = find_matching(masked, open + 1, b'(', b')');
        if block.terminated {
            let body = skip_whitespace(masked, block.close + 1);
            if masked.get(body) != Some(&b'{') {
                continue;
            }
        }
        out.push(block.body(masked.len()));
    }
    out
}

impl Detector for ResourceLifecycleRule {
    fn check(&self, ctx: &SourceContext<'_>) -> Vec<Finding> {
        let regions = scoped_regions(&ctx.masked);
        self.declarations(&ctx.masked)
            .into_iter()
            .filter(|d| !regions.iter().any(|r| r.contains(&d.offset)))
            .map(|d| Finding {
                rule: RuleId::ResourceLifecycle,
                offset: d.offset,
                message: format!(
                    "{} '{}' is not declared in try-with-resources and may leak",
                    d.type_name, d.name
                ),
                kind: d.kind,
            })
            .collect()
    }
}
