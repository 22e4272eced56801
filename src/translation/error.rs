//! 本地化模块统一错误处理
//!
//! 引擎核心本身不会失败（所有查找都是全函数，未命中即回退为原文），
//! 这里的错误只出现在外围：查找表与配置加载、文档解析与序列化、DOM结构操作。

use std::fmt;

use thiserror::Error;

/// 本地化错误类型
#[derive(Error, Debug, Clone)]
pub enum LocaliserError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 查找表错误
    #[error("查找表错误: {0}")]
    LookupTable(String),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// DOM结构操作错误
    #[error("DOM操作错误: {0}")]
    Dom(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),
}

impl LocaliserError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LocaliserError::Config(_) => ErrorSeverity::Critical,
            LocaliserError::LookupTable(_) => ErrorSeverity::Error,
            LocaliserError::Io(_) => ErrorSeverity::Error,
            LocaliserError::Parse(_) => ErrorSeverity::Error,
            LocaliserError::Serialization(_) => ErrorSeverity::Error,
            LocaliserError::Dom(_) => ErrorSeverity::Warning,
            LocaliserError::InvalidInput(_) => ErrorSeverity::Info,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            LocaliserError::Config(_) => ErrorCategory::Configuration,
            LocaliserError::LookupTable(_) => ErrorCategory::Input,
            LocaliserError::Io(_) => ErrorCategory::Io,
            LocaliserError::Parse(_) => ErrorCategory::Parsing,
            LocaliserError::Serialization(_) => ErrorCategory::Serialization,
            LocaliserError::Dom(_) => ErrorCategory::Document,
            LocaliserError::InvalidInput(_) => ErrorCategory::Input,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self.message(), context);

        match &mut self {
            LocaliserError::Config(ref mut msg)
            | LocaliserError::LookupTable(ref mut msg)
            | LocaliserError::Io(ref mut msg)
            | LocaliserError::Parse(ref mut msg)
            | LocaliserError::Serialization(ref mut msg)
            | LocaliserError::Dom(ref mut msg)
            | LocaliserError::InvalidInput(ref mut msg) => *msg = new_msg,
        }

        self
    }

    /// 不带类别前缀的原始消息
    pub fn message(&self) -> &str {
        match self {
            LocaliserError::Config(msg)
            | LocaliserError::LookupTable(msg)
            | LocaliserError::Io(msg)
            | LocaliserError::Parse(msg)
            | LocaliserError::Serialization(msg)
            | LocaliserError::Dom(msg)
            | LocaliserError::InvalidInput(msg) => msg,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Io,
    Parsing,
    Serialization,
    Document,
}

impl From<std::io::Error> for LocaliserError {
    fn from(error: std::io::Error) -> Self {
        LocaliserError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for LocaliserError {
    fn from(error: serde_json::Error) -> Self {
        LocaliserError::Parse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for LocaliserError {
    fn from(error: toml::de::Error) -> Self {
        LocaliserError::Parse(format!("TOML解析错误: {}", error))
    }
}

impl From<toml::ser::Error> for LocaliserError {
    fn from(error: toml::ser::Error) -> Self {
        LocaliserError::Serialization(format!("TOML序列化错误: {}", error))
    }
}

/// 错误结果类型别名
pub type LocaliserResult<T> = Result<T, LocaliserError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 记录并返回错误
    pub fn log_error<T>(error: LocaliserError) -> LocaliserResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("本地化信息 [{:?}]: {}", error.category(), error),
            ErrorSeverity::Warning => tracing::warn!("本地化警告 [{:?}]: {}", error.category(), error),
            ErrorSeverity::Error => tracing::error!("本地化错误 [{:?}]: {}", error.category(), error),
            ErrorSeverity::Critical => {
                tracing::error!("本地化严重错误 [{:?}]: {}", error.category(), error)
            }
        }

        Err(error)
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> LocaliserError {
        LocaliserError::Config(msg.to_string())
    }

    /// 创建DOM错误
    pub fn dom_error<T: fmt::Display>(msg: T) -> LocaliserError {
        LocaliserError::Dom(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> LocaliserError {
        LocaliserError::InvalidInput(msg.to_string())
    }
}
