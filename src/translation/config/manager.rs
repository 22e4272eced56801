//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::helpers::config_error;
use crate::translation::error::{LocaliserError, LocaliserResult};
use crate::translation::lookup::LookupTable;
use crate::translation::strategy::Strategy;

/// 本地化配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaliserConfig {
    // 基础配置
    pub locale: String,
    pub strategy: Strategy,
    pub boundary_class: String,

    /// 强制生效的语言；多个同时生效时取查找表中靠前的
    pub overrides: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_table_path: Option<String>,

    pub log_level: String,
}

impl Default for LocaliserConfig {
    fn default() -> Self {
        Self {
            locale: constants::DEFAULT_LOCALE.to_string(),
            strategy: Strategy::default(),
            boundary_class: constants::DEFAULT_BOUNDARY_CLASS.to_string(),
            overrides: Vec::new(),
            lookup_table_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl LocaliserConfig {
    /// 验证配置
    pub fn validate(&self) -> LocaliserResult<()> {
        if self.locale.trim().is_empty() {
            return Err(config_error("语言不能为空"));
        }

        if self.boundary_class.is_empty() || self.boundary_class.contains(char::is_whitespace) {
            return Err(config_error(format!(
                "边界类名必须是单个非空的类名: '{}'",
                self.boundary_class
            )));
        }

        if let Some(locale) = self.overrides.iter().find(|l| l.trim().is_empty()) {
            return Err(config_error(format!("覆盖语言不能为空: '{}'", locale)));
        }

        {
            use crate::env::{core, EnvVar};
            core::LogLevel::parse(&self.log_level).map_err(config_error)?;
        }

        Ok(())
    }

    /// 应用环境变量覆盖（使用类型安全环境变量系统）
    ///
    /// 值不合法的变量被忽略并记录警告。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{core, localiser, EnvVar};

        match localiser::Locale::get() {
            Ok(locale) => self.locale = locale,
            Err(e) if localiser::Locale::is_set() => tracing::warn!("{}", e),
            Err(_) => {}
        }

        if localiser::TranslationStrategy::is_set() {
            match localiser::TranslationStrategy::get() {
                Ok(strategy) => self.strategy = strategy,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        match localiser::BoundaryClass::get() {
            Ok(boundary_class) => self.boundary_class = boundary_class,
            Err(e) if localiser::BoundaryClass::is_set() => tracing::warn!("{}", e),
            Err(_) => {}
        }

        match localiser::LookupTablePath::get() {
            Ok(path) => {
                tracing::info!("环境变量覆盖查找表路径: {}", path);
                self.lookup_table_path = Some(path);
            }
            Err(e) if localiser::LookupTablePath::is_set() => tracing::warn!("{}", e),
            Err(_) => {}
        }

        if core::LogLevel::is_set() {
            match core::LogLevel::get() {
                Ok(level) => self.log_level = level,
                Err(e) => tracing::warn!("{}", e),
            }
        }
    }

    /// 加载配置中指定的查找表；未指定时返回空表
    pub fn load_lookup_table(&self) -> LocaliserResult<LookupTable> {
        match &self.lookup_table_path {
            Some(path) => LookupTable::from_path(shellexpand::tilde(path).into_owned()),
            None => {
                tracing::warn!("未配置查找表，所有文本将保持原样");
                Ok(LookupTable::new())
            }
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: LocaliserConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 按搜索路径加载配置，再应用环境变量覆盖并验证
    pub fn new() -> LocaliserResult<Self> {
        let (mut config, source) = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 从指定文件加载配置，再应用环境变量覆盖并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> LocaliserResult<Self> {
        let path = path.as_ref();
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 获取配置
    pub fn get_config(&self) -> &LocaliserConfig {
        &self.config
    }

    pub fn into_config(self) -> LocaliserConfig {
        self.config
    }

    /// 配置来源文件；使用默认配置时为 `None`
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn load_config() -> LocaliserResult<(LocaliserConfig, Option<PathBuf>)> {
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            let candidate = Path::new(&*expanded_path);
            if candidate.exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Ok((Self::load_from_file(candidate)?, Some(candidate.to_path_buf())));
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok((LocaliserConfig::default(), None))
    }

    /// 从指定文件加载配置（不应用环境变量）
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LocaliserResult<LocaliserConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LocaliserError::Config(format!("读取配置文件失败 {}: {}", path.display(), e)))?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| LocaliserError::Config(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| LocaliserError::Config(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> LocaliserResult<()> {
        let config = LocaliserConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| LocaliserError::Config(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| LocaliserError::Config(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
