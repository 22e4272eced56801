//! 翻译管道模块
//!
//! 提供子树扫描和容器变更监听

pub mod observer;
pub mod scanner;

// 重新导出主要类型
pub use observer::ChangeObserver;
pub use scanner::{ScanSettings, ScanStats, SubtreeScanner};
