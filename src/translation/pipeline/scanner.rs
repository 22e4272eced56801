//! 子树扫描器
//!
//! 先序遍历（子节点从左到右），对每个节点分类处理：
//!
//! | 节点 | 处理 |
//! |---|---|
//! | 注释 | 跳过，不下降 |
//! | 带边界标记的元素（非容器本身） | 跳过，不下降 |
//! | 其他元素、片段 | 下降到子节点 |
//! | 文本 | 捕获原文（仅首次），按策略计算并写回 |
//!
//! 重新翻译走同样的路径，但只处理已经有原文记录的文本节点，永不捕获。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use crate::document::LiveDocument;
use crate::parsers::html::dom::{has_class, text_of};
use crate::translation::lookup::LookupTable;
use crate::translation::snapshot::TextSnapshotStore;
use crate::translation::strategy::Strategy;

/// 扫描时使用的翻译设置
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub lookup_table: LookupTable,
    pub locale: String,
    pub strategy: Strategy,
    pub boundary_class: String,
}

/// 扫描统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub nodes_visited: usize,
    pub boundaries_skipped: usize,
    pub comments_skipped: usize,
    pub originals_captured: usize,
    pub texts_rewritten: usize,
}

impl ScanStats {
    /// 累加另一次扫描的统计
    pub fn merge(&mut self, other: &ScanStats) {
        self.nodes_visited += other.nodes_visited;
        self.boundaries_skipped += other.boundaries_skipped;
        self.comments_skipped += other.comments_skipped;
        self.originals_captured += other.originals_captured;
        self.texts_rewritten += other.texts_rewritten;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// 捕获并翻译
    Capture,
    /// 只重算已有原文的节点
    Retranslate,
}

/// 子树扫描器
pub struct SubtreeScanner<'a> {
    document: &'a LiveDocument,
    container: &'a Handle,
    settings: &'a ScanSettings,
    snapshots: &'a mut TextSnapshotStore,
    stats: ScanStats,
}

impl<'a> SubtreeScanner<'a> {
    /// `container` 是引擎管理的根，只有它可以带着边界标记被扫描
    pub fn new(
        document: &'a LiveDocument,
        container: &'a Handle,
        settings: &'a ScanSettings,
        snapshots: &'a mut TextSnapshotStore,
    ) -> Self {
        Self {
            document,
            container,
            settings,
            snapshots,
            stats: ScanStats::default(),
        }
    }

    /// 扫描并翻译 `root` 及其后代
    pub fn scan(&mut self, root: &Handle) {
        self.walk(root, ScanMode::Capture);
    }

    /// 扫描一组节点（例如一批新插入的节点）
    pub fn scan_nodes(&mut self, nodes: &[Handle]) {
        for node in nodes {
            self.walk(node, ScanMode::Capture);
        }
    }

    /// 用当前设置重算 `root` 下所有已有原文的文本节点
    pub fn retranslate(&mut self, root: &Handle) {
        self.walk(root, ScanMode::Retranslate);
    }

    /// 结束扫描并返回统计
    pub fn finish(self) -> ScanStats {
        self.stats
    }

    fn walk(&mut self, node: &Handle, mode: ScanMode) {
        self.stats.nodes_visited += 1;

        match node.data {
            NodeData::Comment { .. } => {
                self.stats.comments_skipped += 1;
            }
            NodeData::Text { .. } => match mode {
                ScanMode::Capture => self.capture_and_translate(node),
                ScanMode::Retranslate => {
                    if self.snapshots.has(node) {
                        self.translate_text_node(node);
                    }
                }
            },
            NodeData::Element { .. } => {
                if self.is_boundary(node) {
                    self.stats.boundaries_skipped += 1;
                    return;
                }
                self.walk_children(node, mode);
            }
            NodeData::Document => self.walk_children(node, mode),
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    fn walk_children(&mut self, node: &Handle, mode: ScanMode) {
        let children: Vec<Handle> = node.children.borrow().clone();
        for child in &children {
            self.walk(child, mode);
        }
    }

    fn is_boundary(&self, node: &Handle) -> bool {
        !Rc::ptr_eq(node, self.container) && has_class(node, &self.settings.boundary_class)
    }

    fn capture_and_translate(&mut self, node: &Handle) {
        if self.snapshots.capture(node) {
            self.stats.originals_captured += 1;
        }

        self.translate_text_node(node);
    }

    fn translate_text_node(&mut self, node: &Handle) {
        let Some(original) = self.snapshots.get(node) else {
            return;
        };

        let translated = self.settings.strategy.apply(
            original,
            &self.settings.locale,
            &self.settings.lookup_table,
        );

        if text_of(node).as_deref() != Some(translated.as_str()) {
            self.document.set_text(node, &translated);
            self.stats.texts_rewritten += 1;
        }
    }
}
