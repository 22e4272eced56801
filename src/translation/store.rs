//! 响应式语言存储
//!
//! [`LocaleStore`] 保存当前订阅的语言，值变化时按注册顺序通知订阅者。
//! 克隆得到的是指向同一份状态的新句柄。订阅者以弱引用保存，
//! 丢弃 [`Subscription`] 即取消订阅，失效的条目在下一次通知时清理。
//!
//! [`bind_engine`] 把存储接到翻译引擎上：语言变化时引擎重新计算有效语言
//! （覆盖标志仍然优先）并重新翻译已知文本。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::document::LiveDocument;
use crate::translation::config::constants;
use crate::translation::core::TranslationEngine;

type Callback = Rc<dyn Fn(&str)>;
type CallbackWeak = Weak<dyn Fn(&str)>;

struct StoreInner {
    locale: String,
    version: u64,
    subscribers: Vec<CallbackWeak>,
}

/// 当前语言的共享存储
#[derive(Clone)]
pub struct LocaleStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Default for LocaleStore {
    fn default() -> Self {
        Self::new(constants::DEFAULT_LOCALE)
    }
}

impl std::fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LocaleStore")
            .field("locale", &inner.locale)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl LocaleStore {
    pub fn new(locale: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                locale: locale.to_string(),
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// 当前语言
    pub fn get(&self) -> String {
        self.inner.borrow().locale.clone()
    }

    /// 设置语言；与当前值相同时什么也不做
    pub fn set(&self, locale: &str) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.locale == locale {
                return;
            }
            inner.locale = locale.to_string();
            inner.version += 1;
        }

        self.notify();
    }

    /// 由当前值计算新值
    pub fn update(&self, f: impl FnOnce(&str) -> String) {
        let next = f(&self.inner.borrow().locale);
        self.set(&next);
    }

    /// 订阅语言变化，返回的守卫被丢弃时取消订阅
    #[must_use = "丢弃 Subscription 会立即取消订阅"]
    pub fn subscribe(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        let strong: Callback = Rc::new(callback);
        self.inner.borrow_mut().subscribers.push(Rc::downgrade(&strong));

        Subscription { _callback: strong }
    }

    /// 每次值变化加一
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// 仍然存活的订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        // 先收集再调用，回调里可以再次读写存储
        let (locale, callbacks): (String, Vec<Callback>) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|s| s.strong_count() > 0);
            (
                inner.locale.clone(),
                inner.subscribers.iter().filter_map(Weak::upgrade).collect(),
            )
        };

        tracing::debug!("语言变更为 {}，通知 {} 个订阅者", locale, callbacks.len());

        for callback in callbacks {
            callback(&locale);
        }
    }
}

/// 订阅守卫
pub struct Subscription {
    _callback: Callback,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// 把语言存储接到引擎上
///
/// 语言变化时调用引擎的 `set_locale`（按当前查找表和覆盖标志重新计算有效语言），
/// 再重新翻译所有已记录原文的文本节点。存储和回调都只持有引擎与文档的弱引用。
pub fn bind_engine(
    store: &LocaleStore,
    engine: &Rc<RefCell<TranslationEngine>>,
    document: &Rc<LiveDocument>,
) -> Subscription {
    let engine = Rc::downgrade(engine);
    let document = Rc::downgrade(document);

    store.subscribe(move |locale| {
        let (Some(engine), Some(document)) = (engine.upgrade(), document.upgrade()) else {
            return;
        };

        let Ok(mut engine) = engine.try_borrow_mut() else {
            tracing::warn!("引擎正被占用，忽略语言变更 {}", locale);
            return;
        };

        engine.set_locale(locale);
        engine.retranslate(&document);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale() {
        let store = LocaleStore::default();
        assert_eq!(store.get(), "en");
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_subscribers_fire_on_change_in_order() {
        let store = LocaleStore::new("en");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        let _a = store.subscribe(move |l| first.borrow_mut().push(format!("a:{}", l)));
        let second = seen.clone();
        let _b = store.subscribe(move |l| second.borrow_mut().push(format!("b:{}", l)));

        store.set("fr");
        store.set("fr");

        assert_eq!(*seen.borrow(), vec!["a:fr".to_string(), "b:fr".to_string()]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let store = LocaleStore::new("en");
        let count = Rc::new(RefCell::new(0));

        let counter = count.clone();
        let subscription = store.subscribe(move |_| *counter.borrow_mut() += 1);
        store.set("fr");
        drop(subscription);
        store.set("de");

        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_update_and_clones_share_state() {
        let store = LocaleStore::new("en");
        let handle = store.clone();

        handle.update(|current| format!("{}-GB", current));

        assert_eq!(store.get(), "en-GB");
    }

    #[test]
    fn test_set_from_callback_is_allowed() {
        let store = LocaleStore::new("en");
        let inner = store.clone();
        let _s = store.subscribe(move |l| {
            if l == "xx" {
                inner.set("en");
            }
        });

        store.set("xx");
        assert_eq!(store.get(), "en");
    }
}
