//! 翻译模块
//!
//! 在活文档的子树内做原位文本翻译，采用清晰的模块化架构：
//! - **core**: 增量翻译引擎
//! - **pipeline**: 子树扫描与容器变更监听
//! - **config**: 配置管理
//! - **error**: 错误处理
//! - 叶子部件：查找表、语言解析、翻译策略、原文快照、语言存储
//!
//! # 基本用法
//!
//! ```rust
//! use localiser::translation::{EngineOptions, LookupTable, TranslationEngine};
//! use localiser::LiveDocument;
//!
//! let document = LiveDocument::from_html("<p id=\"greeting\">Hello</p>").unwrap();
//! let container = document.document().clone();
//!
//! let mut engine = TranslationEngine::new(
//!     container,
//!     EngineOptions {
//!         lookup_table: LookupTable::new().with_entry("fr", "hello", "Bonjour"),
//!         locale: "fr".to_string(),
//!         ..EngineOptions::default()
//!     },
//! );
//! engine.scan(&document);
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 语言、策略、边界类名与查找表路径
pub mod config;

/// 核心翻译引擎模块
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 有效语言解析
pub mod locale;

/// 查找表
pub mod lookup;

/// 文本处理管道模块 - 子树扫描与变更监听
pub mod pipeline;

/// 原文快照存储
pub mod snapshot;

/// 响应式语言存储
pub mod store;

/// 翻译策略
pub mod strategy;

// ============================================================================
// 公共API重新导出
// ============================================================================

pub use config::{ConfigManager, LocaliserConfig};
pub use self::core::{EngineOptions, EngineState, TranslationEngine};
pub use error::{LocaliserError, LocaliserResult};
pub use locale::{resolve_locale, LocaleOverrides};
pub use lookup::LookupTable;
pub use pipeline::{ChangeObserver, ScanSettings, ScanStats, SubtreeScanner};
pub use snapshot::TextSnapshotStore;
pub use store::{bind_engine, LocaleStore, Subscription};
pub use strategy::Strategy;
