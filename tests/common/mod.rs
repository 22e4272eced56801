// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

#![allow(dead_code)]

use localiser::parsers::html::dom::{find_by_id, text_content, text_of};
use localiser::{EngineOptions, LiveDocument, LocaleOverrides, LookupTable, Strategy, TranslationEngine};
use markup5ever_rcdom::Handle;

/// 测试用查找表
pub struct TableFixture;

impl TableFixture {
    /// en / fr / de 三个语言的小型查找表（顺序固定）
    pub fn greetings() -> LookupTable {
        LookupTable::new()
            .with_entry("en", "hello", "Hello")
            .with_entry("en", "world", "world")
            .with_entry("fr", "hello", "Bonjour")
            .with_entry("fr", "world", "monde")
            .with_entry("fr", "hello world", "Bonjour le monde")
            .with_entry("de", "hello", "Hallo")
            .with_entry("de", "world", "Welt")
    }

    /// 逐字符策略用的查找表
    pub fn letters() -> LookupTable {
        LookupTable::new()
            .with_entry("num", "a", "1")
            .with_entry("num", "b", "2")
            .with_entry("num", "c", "3")
    }

    pub fn json() -> &'static str {
        r#"{
  "en": {"hello": "Hello", "world": "world"},
  "fr": {"hello": "Bonjour", "world": "monde", "hello world": "Bonjour le monde"},
  "de": {"hello": "Hallo", "world": "Welt"}
}"#
    }
}

/// HTML 测试辅助
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 解析文档并取出 id 为 `root` 的容器
    pub fn parse_with_root(html: &str) -> (LiveDocument, Handle) {
        let document = LiveDocument::from_html(html).expect("test HTML should parse");
        let root = find_by_id(document.document(), "root").expect("test HTML should contain #root");
        (document, root)
    }

    pub fn by_id(document: &LiveDocument, id: &str) -> Handle {
        find_by_id(document.document(), id).unwrap_or_else(|| panic!("missing #{}", id))
    }

    /// 元素的第一个子节点（测试里总是文本节点）
    pub fn first_text(node: &Handle) -> Handle {
        node.children.borrow()[0].clone()
    }

    pub fn text(node: &Handle) -> String {
        text_of(node).unwrap_or_default()
    }

    pub fn content(node: &Handle) -> String {
        text_content(node)
    }
}

/// 引擎构建辅助
pub struct EngineBuilder {
    options: EngineOptions,
}

impl EngineBuilder {
    pub fn new(lookup_table: LookupTable) -> Self {
        Self {
            options: EngineOptions {
                lookup_table,
                ..EngineOptions::default()
            },
        }
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.options.locale = locale.to_string();
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    pub fn overrides(mut self, overrides: LocaleOverrides) -> Self {
        self.options.overrides = overrides;
        self
    }

    pub fn boundary_class(mut self, boundary_class: &str) -> Self {
        self.options.boundary_class = boundary_class.to_string();
        self
    }

    pub fn build(self, container: &Handle) -> TranslationEngine {
        TranslationEngine::new(container.clone(), self.options)
    }
}
