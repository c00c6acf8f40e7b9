//! 规则配置加载（TOML）
//!
//! 所有字段都有内置默认值；规则文件只需写出想覆盖的部分。
//! 配置在扫描开始前构建一次，之后以只读方式在各线程间共享。
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::lang::Language;

/// 退出关键字的查找范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitScan {
    /// 在 else 块原文上做子串查找（包括块内的字符串与注释）
    #[default]
    Raw,
    /// 只在 else 块内被分类为代码的部分查找
    Code,
}

/// guard 规则配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub exit_keywords: Vec<String>,
    pub exit_scan: ExitScan,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            exit_keywords: ["return", "throw", "break", "continue", "fatalError", "preconditionFailure"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_scan: ExitScan::Raw,
        }
    }
}

/// 资源句柄规则配置：类型名 -> 问题种类
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub handle_types: BTreeMap<String, String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        let handle_types = [
            ("Statement", "statement_handle"),
            ("PreparedStatement", "statement_handle"),
            ("CallableStatement", "statement_handle"),
            ("ResultSet", "resultset_handle"),
        ]
        .iter()
        .map(|(ty, kind)| (ty.to_string(), kind.to_string()))
        .collect();
        Self { handle_types }
    }
}

/// 目录遍历配置；`skip_dirs` 为空时使用各语言的默认排除集
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub skip_dirs: Vec<String>,
}

/// 顶层规则文件结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub guard: GuardConfig,
    pub resource: ResourceConfig,
    pub walk: WalkConfig,
}

impl RuleConfig {
    /// 某种语言实际生效的排除目录
    pub fn skip_dirs(&self, lang: Language) -> Vec<String> {
        if self.walk.skip_dirs.is_empty() {
            lang.default_skip_dirs().iter().map(|s| s.to_string()).collect()
        } else {
            self.walk.skip_dirs.clone()
        }
    }

    pub fn with_exit_scan(mut self, scan: ExitScan) -> Self {
        self.guard.exit_scan = scan;
        self
    }
}

/// 从 TOML 文本解析
pub fn parse_rule_config(txt: &str, path: &Path) -> Result<RuleConfig, ConfigError> {
    let parsed: RuleConfig = toml::from_str(txt).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if parsed.guard.exit_keywords.iter().any(|k| k.is_empty()) {
        return Err(ConfigError::Empty { rule: "guard", field: "exit keyword" });
    }
    if parsed.resource.handle_types.iter().any(|(ty, kind)| ty.is_empty() || kind.is_empty()) {
        return Err(ConfigError::Empty { rule: "resource", field: "handle type mapping" });
    }
    Ok(parsed)
}

/// 从 TOML 规则文件加载
pub fn load_rule_config(path: &Path) -> Result<RuleConfig, ConfigError> {
    let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rule_config(&txt, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_rule_config("", Path::new("empty.toml")).unwrap();
        assert_eq!(cfg, RuleConfig::default());
        assert_eq!(cfg.guard.exit_keywords.len(), 6);
        assert_eq!(cfg.resource.handle_types.get("ResultSet").map(String::as_str), Some("resultset_handle"));
    }

    #[test]
    fn partial_override_keeps_other_sections() {
        let txt = r#"
            [guard]
            exit_scan = "code"

            [resource.handle_types]
            FileInputStream = "stream_handle"
        "#;
        let cfg = parse_rule_config(txt, Path::new("custom.toml")).unwrap();
        assert_eq!(cfg.guard.exit_scan, ExitScan::Code);
        assert_eq!(cfg.guard.exit_keywords, GuardConfig::default().exit_keywords);
        assert_eq!(cfg.resource.handle_types.len(), 1);
    }

    #[test]
    fn skip_dirs_fall_back_to_language_defaults() {
        let cfg = RuleConfig::default();
        assert!(cfg.skip_dirs(Language::Swift).contains(&"DerivedData".to_string()));
        assert!(cfg.skip_dirs(Language::Java).contains(&"target".to_string()));

        let cfg = parse_rule_config("[walk]\nskip_dirs = [\"vendor\"]", Path::new("w.toml")).unwrap();
        assert_eq!(cfg.skip_dirs(Language::Java), vec!["vendor".to_string()]);
    }

    #[test]
    fn rejects_bad_toml_and_empty_keywords() {
        assert!(matches!(
            parse_rule_config("[guard", Path::new("bad.toml")),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            parse_rule_config("[guard]\nexit_keywords = [\"\"]", Path::new("e.toml")),
            Err(ConfigError::Empty { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_rule_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
