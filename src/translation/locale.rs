//! 有效语言解析

use std::collections::HashMap;

use crate::translation::lookup::LookupTable;

/// 语言覆盖标志
///
/// 某个语言的标志为 `true` 时，它会压过订阅的语言值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleOverrides {
    flags: HashMap<String, bool>,
}

impl LocaleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置某个语言的覆盖标志
    pub fn set(&mut self, locale: &str, enabled: bool) -> &mut Self {
        self.flags.insert(locale.to_string(), enabled);
        self
    }

    /// 链式开启覆盖
    pub fn with(mut self, locale: &str) -> Self {
        self.set(locale, true);
        self
    }

    pub fn is_enabled(&self, locale: &str) -> bool {
        self.flags.get(locale).copied().unwrap_or(false)
    }

    /// 标志为 `true` 的语言（无序）
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(locale, _)| locale.as_str())
    }

    pub fn is_empty(&self) -> bool {
        !self.flags.values().any(|enabled| *enabled)
    }
}

impl From<HashMap<String, bool>> for LocaleOverrides {
    fn from(flags: HashMap<String, bool>) -> Self {
        Self { flags }
    }
}

impl<S: Into<String>> FromIterator<S> for LocaleOverrides {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(|locale| (locale.into(), true)).collect(),
        }
    }
}

/// 计算有效语言
///
/// 按查找表的语言顺序取第一个覆盖标志为 `true` 的语言；没有则原样返回
/// `subscribed_locale`。不在查找表中的覆盖标志不起作用，未知的订阅语言也原样通过。
pub fn resolve_locale(
    lookup_table: &LookupTable,
    subscribed_locale: &str,
    overrides: &LocaleOverrides,
) -> String {
    lookup_table
        .locales()
        .find(|locale| overrides.is_enabled(locale))
        .unwrap_or(subscribed_locale)
        .to_string()
}
