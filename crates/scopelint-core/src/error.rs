//! 配置相关错误
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read rule file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to build keyword matcher")]
    Keywords(#[from] aho_corasick::BuildError),

    #[error("rule `{rule}` has an empty {field}")]
    Empty { rule: &'static str, field: &'static str },
}
