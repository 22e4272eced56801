//! 增量文本翻译引擎
//!
//! 引擎是整个翻译系统的组合根：持有容器、查找表、有效语言和策略，
//! 负责首次扫描、变更驱动的增量扫描以及切换语言后的重新翻译。
//!
//! ## 状态
//!
//! ```text
//! Uninitialized ──scan_and_start──▶ Observing ◀──scan_and_start── Stopped
//!                                       │                           ▲
//!                                       └───────────stop────────────┘
//! ```
//!
//! ## 工作流程
//! 1. `scan` / `scan_and_start` 对整个容器做一次先序扫描，首次访问的文本节点记录原文
//! 2. 监听开启后，新插入的节点在下一次变更投递时被扫描
//! 3. `reconfigure` 只更换设置，`retranslate` 再从原文重新计算所有已知节点
//!
//! 引擎写回译文走的是文本内容变更，而监听只订阅结构变更，所以写回不会触发新的扫描。
//!
//! ## 使用示例
//! ```rust
//! use localiser::{LiveDocument, LookupTable, TranslationEngine, EngineOptions};
//! use localiser::parsers::html::dom::find_by_id;
//!
//! let document = LiveDocument::from_html("<div id=\"app\"><p>Hello</p></div>").unwrap();
//! let container = find_by_id(document.document(), "app").unwrap();
//!
//! let options = EngineOptions {
//!     lookup_table: LookupTable::new().with_entry("fr", "hello", "Bonjour"),
//!     locale: "fr".to_string(),
//!     ..EngineOptions::default()
//! };
//!
//! let mut engine = TranslationEngine::new(container.clone(), options);
//! engine.scan_and_start(&document);
//!
//! let text = document.create_text("Hello");
//! document.append_child(&container, &text).unwrap();
//! document.deliver_mutations();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::document::LiveDocument;
use crate::translation::config::{constants, LocaliserConfig};
use crate::translation::locale::{resolve_locale, LocaleOverrides};
use crate::translation::lookup::LookupTable;
use crate::translation::pipeline::{ChangeObserver, ScanSettings, ScanStats, SubtreeScanner};
use crate::translation::snapshot::TextSnapshotStore;
use crate::translation::strategy::Strategy;

/// 引擎生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// 尚未开始监听
    Uninitialized,
    /// 正在监听容器的结构变化
    Observing,
    /// 监听已停止，原文记录保留
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Observing => "observing",
            EngineState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// 引擎构造参数
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// 翻译查找表
    pub lookup_table: LookupTable,
    /// 订阅的语言（覆盖标志生效前）
    pub locale: String,
    /// 语言覆盖标志
    pub overrides: LocaleOverrides,
    /// 翻译策略
    pub strategy: Strategy,
    /// 边界标记类名
    pub boundary_class: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            lookup_table: LookupTable::new(),
            locale: constants::DEFAULT_LOCALE.to_string(),
            overrides: LocaleOverrides::new(),
            strategy: Strategy::default(),
            boundary_class: constants::DEFAULT_BOUNDARY_CLASS.to_string(),
        }
    }
}

impl EngineOptions {
    /// 由配置文件内容和已加载的查找表构造
    pub fn from_config(config: &LocaliserConfig, lookup_table: LookupTable) -> Self {
        Self {
            lookup_table,
            locale: config.locale.clone(),
            overrides: config.overrides.iter().map(String::as_str).collect(),
            strategy: config.strategy,
            boundary_class: config.boundary_class.clone(),
        }
    }
}

/// 引擎与变更回调共享的状态
struct EngineShared {
    settings: ScanSettings,
    snapshots: TextSnapshotStore,
    has_scanned: bool,
    /// 变更回调累计的扫描统计
    observed: ScanStats,
    observed_batches: usize,
}

impl EngineShared {
    fn run<F>(&mut self, document: &LiveDocument, container: &Handle, walk: F) -> ScanStats
    where
        F: FnOnce(&mut SubtreeScanner<'_>),
    {
        let EngineShared {
            settings,
            snapshots,
            ..
        } = self;

        let mut scanner = SubtreeScanner::new(document, container, settings, snapshots);
        walk(&mut scanner);
        scanner.finish()
    }
}

/// 增量文本翻译引擎
///
/// 引擎不是线程安全的：共享状态使用 `Rc<RefCell<_>>`，
/// 所有扫描都在调用线程上同步完成。
pub struct TranslationEngine {
    /// 引擎管理的根节点
    container: Handle,
    /// 设置与原文记录，变更回调也持有一份引用
    shared: Rc<RefCell<EngineShared>>,
    /// 容器结构变化监听
    observer: ChangeObserver,
    state: EngineState,
    /// 覆盖标志生效前的语言
    subscribed_locale: String,
    overrides: LocaleOverrides,
}

impl TranslationEngine {
    /// 创建引擎
    ///
    /// # 参数
    /// - `container`: 引擎管理的根节点，它自身带边界标记时仍会被扫描
    /// - `options`: 查找表、语言、覆盖标志、策略和边界类名
    ///
    /// 创建时只计算有效语言，不做任何翻译。
    pub fn new(container: Handle, options: EngineOptions) -> Self {
        let EngineOptions {
            lookup_table,
            locale,
            overrides,
            strategy,
            boundary_class,
        } = options;

        let effective_locale = resolve_locale(&lookup_table, &locale, &overrides);

        tracing::debug!(
            "创建翻译引擎: locale={}, effective={}, strategy={}",
            locale,
            effective_locale,
            strategy
        );

        Self {
            container,
            shared: Rc::new(RefCell::new(EngineShared {
                settings: ScanSettings {
                    lookup_table,
                    locale: effective_locale,
                    strategy,
                    boundary_class,
                },
                snapshots: TextSnapshotStore::new(),
                has_scanned: false,
                observed: ScanStats::default(),
                observed_batches: 0,
            })),
            observer: ChangeObserver::new(),
            state: EngineState::Uninitialized,
            subscribed_locale: locale,
            overrides,
        }
    }

    // ------------------------------------------------------------------
    // 配置
    // ------------------------------------------------------------------

    /// 更换查找表、订阅语言和覆盖标志，并重新计算有效语言
    ///
    /// 任何状态下都可以调用；不会翻译任何内容，需要时再调用 [`Self::retranslate`]。
    pub fn configure(&mut self, lookup_table: LookupTable, subscribed_locale: &str, overrides: LocaleOverrides) {
        let effective_locale = resolve_locale(&lookup_table, subscribed_locale, &overrides);
        self.subscribed_locale = subscribed_locale.to_string();
        self.overrides = overrides;
        self.reconfigure(lookup_table, &effective_locale);
    }

    /// 直接设置查找表和有效语言
    pub fn reconfigure(&mut self, lookup_table: LookupTable, effective_locale: &str) {
        let mut shared = self.shared.borrow_mut();
        shared.settings.lookup_table = lookup_table;

        if shared.settings.locale != effective_locale {
            tracing::debug!("有效语言: {} -> {}", shared.settings.locale, effective_locale);
            shared.settings.locale = effective_locale.to_string();
        }
    }

    /// 更换订阅语言，覆盖标志仍然优先
    pub fn set_locale(&mut self, subscribed_locale: &str) {
        let lookup_table = self.lookup_table();
        let effective_locale = resolve_locale(&lookup_table, subscribed_locale, &self.overrides);
        self.subscribed_locale = subscribed_locale.to_string();
        self.reconfigure(lookup_table, &effective_locale);
    }

    /// 更换翻译策略；已翻译的内容在下一次扫描或重新翻译时更新
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.shared.borrow_mut().settings.strategy = strategy;
    }

    // ------------------------------------------------------------------
    // 扫描
    // ------------------------------------------------------------------

    /// 对整个容器做一次扫描，不改变监听状态
    pub fn scan(&mut self, document: &LiveDocument) -> ScanStats {
        let container = self.container.clone();
        let stats = {
            let mut shared = self.shared.borrow_mut();
            shared.has_scanned = true;
            shared.run(document, &container, |scanner| scanner.scan(&container))
        };

        tracing::debug!(
            "扫描完成: 访问 {} 个节点，新记录 {} 个原文，改写 {} 处文本",
            stats.nodes_visited,
            stats.originals_captured,
            stats.texts_rewritten
        );

        stats
    }

    /// 扫描容器并开始监听
    ///
    /// 从 `Stopped` 调用时恢复监听，停止期间插入的节点由这次扫描补上；
    /// 已在监听时只重新扫描，不会重复订阅。
    pub fn scan_and_start(&mut self, document: &LiveDocument) -> ScanStats {
        let stats = self.scan(document);

        if self.state != EngineState::Observing || !self.observer.is_active() {
            self.start_observing(document);
            self.transition(EngineState::Observing);
        }

        stats
    }

    /// 用当前设置从原文重新计算所有已记录的文本节点
    ///
    /// 首次扫描之前调用不做任何事。不会记录新的原文。
    pub fn retranslate(&mut self, document: &LiveDocument) -> ScanStats {
        let container = self.container.clone();
        let mut shared = self.shared.borrow_mut();

        if !shared.has_scanned {
            tracing::debug!("尚未扫描，跳过重新翻译");
            return ScanStats::default();
        }

        let stats = shared.run(document, &container, |scanner| scanner.retranslate(&container));

        tracing::debug!(
            "重新翻译完成: locale={}, 改写 {} 处文本",
            shared.settings.locale,
            stats.texts_rewritten
        );

        stats
    }

    /// 停止监听；任何状态下都可以安全调用，原文记录保留
    pub fn stop(&mut self) {
        self.observer.stop();

        if self.state == EngineState::Observing {
            self.transition(EngineState::Stopped);
        }
    }

    fn start_observing(&mut self, document: &LiveDocument) {
        let shared = Rc::clone(&self.shared);
        let container = Rc::downgrade(&self.container);
        let boundary_class = self.shared.borrow().settings.boundary_class.clone();

        self.observer.start(document, &self.container, &boundary_class, move |nodes, document| {
            let Some(container) = container.upgrade() else {
                return;
            };

            let Ok(mut shared) = shared.try_borrow_mut() else {
                tracing::warn!("引擎状态正被占用，跳过 {} 个新插入节点", nodes.len());
                return;
            };

            let stats = shared.run(document, &container, |scanner| scanner.scan_nodes(nodes));
            shared.observed.merge(&stats);
            shared.observed_batches += 1;

            tracing::debug!(
                "增量扫描: {} 个新节点，新记录 {} 个原文",
                nodes.len(),
                stats.originals_captured
            );
        });
    }

    fn transition(&mut self, next: EngineState) {
        tracing::info!("翻译引擎状态: {} -> {}", self.state, next);
        self.state = next;
    }

    // ------------------------------------------------------------------
    // 访问器
    // ------------------------------------------------------------------

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn container(&self) -> &Handle {
        &self.container
    }

    /// 当前用于翻译的语言
    pub fn effective_locale(&self) -> String {
        self.shared.borrow().settings.locale.clone()
    }

    /// 覆盖标志生效前的语言
    pub fn subscribed_locale(&self) -> &str {
        &self.subscribed_locale
    }

    pub fn overrides(&self) -> &LocaleOverrides {
        &self.overrides
    }

    pub fn strategy(&self) -> Strategy {
        self.shared.borrow().settings.strategy
    }

    pub fn boundary_class(&self) -> String {
        self.shared.borrow().settings.boundary_class.clone()
    }

    /// 当前查找表（共享底层数据）
    pub fn lookup_table(&self) -> LookupTable {
        self.shared.borrow().settings.lookup_table.clone()
    }

    /// 节点被首次访问时的原文
    pub fn original_text(&self, node: &Handle) -> Option<String> {
        self.shared.borrow().snapshots.get(node).map(str::to_string)
    }

    pub fn has_snapshot(&self, node: &Handle) -> bool {
        self.shared.borrow().snapshots.has(node)
    }

    /// 已记录原文的存活文本节点数
    pub fn snapshot_count(&self) -> usize {
        self.shared.borrow().snapshots.len()
    }

    /// 变更回调累计的扫描统计和批次数
    pub fn observed_stats(&self) -> (ScanStats, usize) {
        let shared = self.shared.borrow();
        (shared.observed, shared.observed_batches)
    }
}

impl Drop for TranslationEngine {
    fn drop(&mut self) {
        self.observer.stop();
    }
}
