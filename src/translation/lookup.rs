//! 查找表
//!
//! `locale → (小写源文本 → 译文)` 的静态字典。对引擎而言查找表是不可变的，
//! 重新配置时整体替换；内部使用 `Rc` 共享，克隆开销很小。
//! 语言键保持加载时的顺序，这个顺序决定了多个覆盖标志同时生效时的取舍。

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::translation::error::{LocaliserError, LocaliserResult};

type LocaleEntries = HashMap<String, String>;

/// 翻译查找表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupTable {
    locales: Rc<IndexMap<String, LocaleEntries>>,
}

impl LookupTable {
    /// 创建空查找表
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(json: &str) -> LocaliserResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LocaliserError::LookupTable(format!("JSON查找表解析失败: {}", e)))
    }

    /// 从 TOML 文本加载（每个语言一个表）
    pub fn from_toml_str(content: &str) -> LocaliserResult<Self> {
        toml::from_str(content)
            .map_err(|e| LocaliserError::LookupTable(format!("TOML查找表解析失败: {}", e)))
    }

    /// 按扩展名从文件加载，`.toml` 之外一律按 JSON 解析
    pub fn from_path<P: AsRef<Path>>(path: P) -> LocaliserResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LocaliserError::Io(format!("读取查找表失败 {}: {}", path.display(), e)))?;

        let table = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
        .map_err(|e| e.with_context(path.display()))?;

        tracing::debug!(
            "已加载查找表 {}: {} 个语言",
            path.display(),
            table.locales.len()
        );

        Ok(table)
    }

    /// 添加一条译文（写时复制）
    pub fn insert(&mut self, locale: &str, key: &str, value: &str) -> &mut Self {
        Rc::make_mut(&mut self.locales)
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// 链式构建用的 `insert`
    pub fn with_entry(mut self, locale: &str, key: &str, value: &str) -> Self {
        self.insert(locale, key, value);
        self
    }

    /// 查找译文；`key` 应已转为小写
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales
            .get(locale)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// 按加载顺序列出语言
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// 是否包含指定语言
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// 指定语言的词条数
    pub fn entry_count(&self, locale: &str) -> usize {
        self.locales.get(locale).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}
