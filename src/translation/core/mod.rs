//! 翻译系统核心模块
//!
//! 引擎把各个部件组合起来：
//!
//! ```text
//! TranslationEngine (engine.rs)
//!     ├── SubtreeScanner (pipeline/scanner.rs)
//!     │       ├── TextSnapshotStore (snapshot.rs)
//!     │       └── Strategy (strategy.rs)
//!     ├── ChangeObserver (pipeline/observer.rs)
//!     └── resolve_locale (locale.rs)
//! ```

pub mod engine;

/// 增量文本翻译引擎
pub use engine::TranslationEngine;

/// 引擎构造参数与生命周期状态
pub use engine::{EngineOptions, EngineState};
