//! # Localiser Library
//!
//! 在可变的 HTML 文档树中原位翻译文本：按语言和静态查找表计算显示文本，
//! 并在子树持续发生结构变化时保持正确。
//!
//! ## 模块组织
//!
//! - `core` - 一次性的文档本地化流程
//! - `document` - 可观察的活文档（结构变更记录与投递）
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 解析、查询、序列化
//! - `translation` - 增量翻译引擎及其部件

pub mod core;
pub mod document;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use self::core::{localise_document, LocaliserOptions};
pub use document::{LiveDocument, MutationObserver, MutationRecord, ObserveOptions};
pub use translation::{
    bind_engine, resolve_locale, EngineOptions, EngineState, LocaleOverrides, LocaleStore,
    LocaliserError, LocaliserResult, LookupTable, ScanStats, Strategy, TranslationEngine,
};
