//! 原文快照存储
//!
//! 记录每个文本节点第一次被访问时的内容，之后所有翻译都从这份原文计算，
//! 反复切换语言也不会在译文上再翻译。
//!
//! 条目以节点地址为键，只保存 `Weak` 引用：存储不会延长节点的生命周期。
//! 持有的 `Weak` 会保留节点的内存分配，所以条目存在期间该地址不会被新节点复用；
//! 节点被丢弃后条目即失效，查询时视为不存在，并在后续捕获时被批量清理，
//! 清理之后新节点即使落在同一地址也会被当作全新节点捕获。

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node};

use crate::parsers::html::dom::text_of;

/// 触发清理失效条目的最小条目数
const MIN_SWEEP_THRESHOLD: usize = 64;

struct Snapshot {
    node: Weak<Node>,
    original: String,
}

impl Snapshot {
    fn is_live(&self) -> bool {
        self.node.strong_count() > 0
    }
}

/// 文本节点 → 原文 的非持有关联
pub struct TextSnapshotStore {
    entries: HashMap<usize, Snapshot>,
    sweep_at: usize,
}

impl Default for TextSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSnapshotStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }

    /// 若尚无记录，保存节点当前文本作为原文
    ///
    /// 返回是否新捕获。非文本节点不会被记录。
    pub fn capture(&mut self, node: &Handle) -> bool {
        if self.has(node) {
            return false;
        }

        let Some(text) = text_of(node) else {
            return false;
        };

        if self.entries.len() >= self.sweep_at {
            self.sweep();
        }

        self.entries.insert(
            node_key(node),
            Snapshot {
                node: Rc::downgrade(node),
                original: text,
            },
        );

        true
    }

    /// 节点的原文
    pub fn get(&self, node: &Handle) -> Option<&str> {
        self.entries
            .get(&node_key(node))
            .filter(|snapshot| snapshot.is_live())
            .map(|snapshot| snapshot.original.as_str())
    }

    /// 节点是否已有原文记录
    pub fn has(&self, node: &Handle) -> bool {
        self.get(node).is_some()
    }

    /// 仍然存活的条目数
    pub fn len(&self) -> usize {
        self.entries.values().filter(|s| s.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 丢弃节点已被释放的条目，释放它们持有的内存分配
    fn sweep(&mut self) {
        let before = self.entries.len();
        self.entries.retain(|_, snapshot| snapshot.is_live());
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP_THRESHOLD);

        tracing::trace!(
            "快照清理: {} -> {} 个条目",
            before,
            self.entries.len()
        );
    }
}

fn node_key(node: &Handle) -> usize {
    Rc::as_ptr(node) as usize
}
