//! 本地化配置管理模块
//!
//! 提供简化的配置管理，支持配置文件、环境变量和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, LocaliserConfig};

/// 配置常量
pub mod constants {
    /// 默认订阅语言
    pub const DEFAULT_LOCALE: &str = "en";

    /// 默认边界标记类名
    pub const DEFAULT_BOUNDARY_CLASS: &str = "localisation-boundary";

    /// 默认文档编码
    pub const DEFAULT_ENCODING: &str = "utf-8";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "localiser.toml",
        ".localiser.toml",
        "~/.config/localiser/config.toml",
    ];
}
