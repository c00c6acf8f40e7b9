//! 公共类型（对外暴露）
use serde::Serialize;

/// 产生问题的规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// guard 的 else 分支没有退出当前作用域
    GuardExit,
    /// 句柄未声明在 try-with-resources 中
    ResourceLifecycle,
}

impl RuleId {
    /// 带种类标签的规则在文本输出里把 kind 作为单独一列
    pub fn tagged(self) -> bool {
        matches!(self, RuleId::ResourceLifecycle)
    }
}

/// 单个问题（行列均为 1 基）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub line: usize,
    pub column: usize,
    pub rule: RuleId,
    pub kind: String,
    pub message: String,
}

impl Issue {
    /// 文本输出中 tab 之后的部分
    pub fn rendered_message(&self) -> String {
        if self.rule.tagged() {
            format!("{}\t{}", self.kind, self.message)
        } else {
            self.message.clone()
        }
    }
}

/// JSON 输出项（每行一个对象）
#[derive(Debug, Clone, Serialize)]
pub struct OutputItem<'a> {
    pub path: &'a str,
    pub line: usize,
    pub column: usize,
    pub kind: &'a str,
    pub message: &'a str,
}
