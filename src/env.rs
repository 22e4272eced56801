//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。每个变量是一个实现了 [`EnvVar`] 的零大小类型，
//! 名称、默认值、说明和解析规则都集中在一处。

use std::env;
use std::fmt;

use crate::translation::strategy::Strategy;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 变量是否已设置（不论值是否合法）
    fn is_set() -> bool {
        env::var_os(Self::NAME).is_some()
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LOCALISER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid log level '{}'. Use: trace, debug, info, warn, error", value),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 本地化相关环境变量
pub mod localiser {
    use super::*;

    /// 订阅语言
    pub struct Locale;
    impl EnvVar<String> for Locale {
        const NAME: &'static str = "LOCALISER_LOCALE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Locale used to look up translations";

        fn parse(value: &str) -> EnvResult<String> {
            let locale = value.trim();
            if locale.is_empty() || locale.contains(char::is_whitespace) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid locale '{}'", value),
                });
            }
            Ok(locale.to_string())
        }
    }

    /// 翻译策略
    pub struct TranslationStrategy;
    impl EnvVar<Strategy> for TranslationStrategy {
        const NAME: &'static str = "LOCALISER_STRATEGY";
        const DEFAULT: Option<Strategy> = Some(Strategy::WholeText);
        const DESCRIPTION: &'static str = "Translation strategy: whole-text, per-word, per-character";

        fn parse(value: &str) -> EnvResult<Strategy> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!(
                    "Invalid strategy '{}'. Use: whole-text, per-word, per-character",
                    value
                ),
            })
        }
    }

    /// 边界标记类名
    pub struct BoundaryClass;
    impl EnvVar<String> for BoundaryClass {
        const NAME: &'static str = "LOCALISER_BOUNDARY_CLASS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Class token that excludes an element subtree from translation";

        fn parse(value: &str) -> EnvResult<String> {
            let class = value.trim();
            if class.is_empty() || class.contains(char::is_whitespace) {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Boundary class must be a single non-empty class token".to_string(),
                });
            }
            Ok(class.to_string())
        }
    }

    /// 查找表文件路径
    pub struct LookupTablePath;
    impl EnvVar<String> for LookupTablePath {
        const NAME: &'static str = "LOCALISER_LOOKUP_TABLE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path to a JSON or TOML lookup table";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Lookup table path must not be empty".to_string(),
                });
            }
            Ok(shellexpand::tilde(value.trim()).into_owned())
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    docs.push_str(&format!("- `{}`: {} (default: info)\n", core::LogLevel::NAME, core::LogLevel::DESCRIPTION));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Localisation\n\n");
    docs.push_str(&format!("- `{}`: {}\n", localiser::Locale::NAME, localiser::Locale::DESCRIPTION));
    docs.push_str(&format!(
        "- `{}`: {} (default: {})\n",
        localiser::TranslationStrategy::NAME,
        localiser::TranslationStrategy::DESCRIPTION,
        Strategy::default()
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        localiser::BoundaryClass::NAME,
        localiser::BoundaryClass::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        localiser::LookupTablePath::NAME,
        localiser::LookupTablePath::DESCRIPTION
    ));

    docs
}
