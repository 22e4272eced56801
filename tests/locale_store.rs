//! 语言存储集成测试
//!
//! 存储变化 → 引擎重新计算有效语言 → 重新翻译已知文本

use std::cell::RefCell;
use std::rc::Rc;

use localiser::{bind_engine, LocaleOverrides, LocaleStore, TranslationEngine};

mod common;

use common::{EngineBuilder, HtmlTestHelper as Html, TableFixture};

fn bound_engine(
    html: &str,
    overrides: LocaleOverrides,
) -> (Rc<localiser::LiveDocument>, Rc<RefCell<TranslationEngine>>, LocaleStore) {
    let (document, root) = Html::parse_with_root(html);
    let document = Rc::new(document);
    let store = LocaleStore::new("en");

    let mut engine = EngineBuilder::new(TableFixture::greetings())
        .locale(&store.get())
        .overrides(overrides)
        .build(&root);
    engine.scan_and_start(&document);

    (document, Rc::new(RefCell::new(engine)), store)
}

#[test]
fn test_store_change_retranslates() {
    let (document, engine, store) =
        bound_engine("<div id=\"root\"><p>Hello</p></div>", LocaleOverrides::new());
    let _subscription = bind_engine(&store, &engine, &document);
    let root = engine.borrow().container().clone();

    assert_eq!(Html::content(&root), "Hello");

    store.set("fr");
    assert_eq!(Html::content(&root), "Bonjour");
    assert_eq!(engine.borrow().subscribed_locale(), "fr");

    store.update(|_| "de".to_string());
    assert_eq!(Html::content(&root), "Hallo");
    assert_eq!(store.version(), 2);
}

#[test]
fn test_overrides_still_win() {
    let (document, engine, store) = bound_engine(
        "<div id=\"root\"><p>Hello</p></div>",
        LocaleOverrides::new().with("de"),
    );
    let _subscription = bind_engine(&store, &engine, &document);
    let root = engine.borrow().container().clone();

    assert_eq!(Html::content(&root), "Hallo");

    store.set("fr");

    assert_eq!(engine.borrow().subscribed_locale(), "fr");
    assert_eq!(engine.borrow().effective_locale(), "de");
    assert_eq!(Html::content(&root), "Hallo");
}

#[test]
fn test_dropped_subscription_stops_updates() {
    let (document, engine, store) =
        bound_engine("<div id=\"root\"><p>Hello</p></div>", LocaleOverrides::new());
    let subscription = bind_engine(&store, &engine, &document);
    let root = engine.borrow().container().clone();

    store.set("fr");
    assert_eq!(Html::content(&root), "Bonjour");

    drop(subscription);
    assert_eq!(store.subscriber_count(), 0);

    store.set("de");
    assert_eq!(Html::content(&root), "Bonjour");
    assert_eq!(engine.borrow().subscribed_locale(), "fr");
}

#[test]
fn test_nodes_inserted_after_switch_use_new_locale() {
    let (document, engine, store) =
        bound_engine("<div id=\"root\"></div>", LocaleOverrides::new());
    let _subscription = bind_engine(&store, &engine, &document);
    let root = engine.borrow().container().clone();

    store.set("de");

    let text = document.create_text("world");
    document.append_child(&root, &text).unwrap();
    document.deliver_mutations();

    assert_eq!(Html::text(&text), "Welt");
}

#[test]
fn test_dropped_engine_is_ignored() {
    let (document, engine, store) =
        bound_engine("<div id=\"root\"><p>Hello</p></div>", LocaleOverrides::new());
    let _subscription = bind_engine(&store, &engine, &document);
    let root = engine.borrow().container().clone();

    drop(engine);
    store.set("fr");

    assert_eq!(store.get(), "fr");
    assert_eq!(Html::content(&root), "Hello");
}
