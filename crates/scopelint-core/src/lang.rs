//! 支持的语言及其词法差异
use crate::classify::LexicalSyntax;

/// 扫描目标语言
/// - Swift：检查 `guard let/var ... else { }` 的 else 分支是否真正退出
/// - Java：检查 JDBC 句柄是否声明在 try-with-resources 中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Swift,
    Java,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Swift, Language::Java];

    /// 名称解析（大小写不敏感）
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swift" => Some(Language::Swift),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.extension() == ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Swift => "swift",
            Language::Java => "java",
        }
    }

    pub fn name(self) -> &'static str {
        self.extension()
    }

    /// 目录遍历时默认排除的目录（版本控制、构建产物、依赖）
    pub fn default_skip_dirs(self) -> &'static [&'static str] {
        match self {
            Language::Swift => &[".git", ".hg", ".svn", "build", "DerivedData", ".swiftpm", ".idea", "node_modules"],
            Language::Java => &[".git", ".hg", ".svn", "build", "target", "out", ".gradle", ".idea", "node_modules"],
        }
    }

    pub(crate) fn lexical_syntax(self) -> LexicalSyntax {
        match self {
            Language::Swift => LexicalSyntax { nested_block_comments: true, char_literals: false, raw_strings: true },
            Language::Java => LexicalSyntax { nested_block_comments: false, char_literals: true, raw_strings: false },
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_parsing_is_case_insensitive() {
        assert_eq!(Language::from_name("SWIFT"), Some(Language::Swift));
        assert_eq!(Language::from_name("Java"), Some(Language::Java));
        assert_eq!(Language::from_name("kotlin"), None);
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(Language::from_extension("swift"), Some(Language::Swift));
        assert_eq!(Language::from_extension("java"), Some(Language::Java));
        assert_eq!(Language::from_extension("kt"), None);
    }
}
