//! 检测器集合（按语言）
//!
//! 单文件流水线严格顺序执行：分类 → 匹配 → 提取区块 → 判定 → 产出。
//! 分类结果与屏蔽后的文本每个文件只算一次，各检测器只读共享。
use crate::classify::classify;
use crate::error::ConfigError;
use crate::findings::Finding;
use crate::guard::GuardExitRule;
use crate::lang::Language;
use crate::resource::ResourceLifecycleRule;
use crate::rules::RuleConfig;

/// 单个文件的只读上下文
pub(crate) struct SourceContext<'a> {
    pub(crate) text: &'a str,
    /// 非代码字节被替换为空格的副本，与 `text` 等长；代码区判定全部经由它完成
    pub(crate) masked: Vec<u8>,
}

impl<'a> SourceContext<'a> {
    pub(crate) fn new(text: &'a str, lang: Language) -> Self {
        let masked = classify(text, lang).masked(text);
        Self { text, masked }
    }

    pub(crate) fn raw(&self) -> &'a [u8] {
        self.text.as_bytes()
    }
}

/// 规则检测器
pub(crate) trait Detector: Send + Sync {
    fn check(&self, ctx: &SourceContext<'_>) -> Vec<Finding>;
}

/// 某种语言启用的检测器集合
pub(crate) struct DetectorSet {
    pub(crate) language: Language,
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorSet {
    /// 从规则配置构建某种语言的检测器集合
    pub(crate) fn for_language(language: Language, config: &RuleConfig) -> Result<Self, ConfigError> {
        let detectors: Vec<Box<dyn Detector>> = match language {
            Language::Swift => vec![Box::new(GuardExitRule::from_config(&config.guard)?)],
            Language::Java => vec![Box::new(ResourceLifecycleRule::from_config(&config.resource)?)],
        };
        Ok(Self { language, detectors })
    }

    pub(crate) fn run(&self, text: &str) -> Vec<Finding> {
        let ctx = SourceContext::new(text, self.language);
        self.detectors.iter().flat_map(|d| d.check(&ctx)).collect()
    }
}
