//! 变更记录与订阅选项

use std::fmt;

use markup5ever_rcdom::Handle;

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// 子节点列表变化（插入、移除、替换）
    ChildList,
    /// 文本节点内容变化
    CharacterData,
}

/// 单条结构或内容变更
#[derive(Clone)]
pub struct MutationRecord {
    /// 变更类型
    pub kind: MutationKind,
    /// 子节点列表变更时为父节点，内容变更时为文本节点本身
    pub target: Handle,
    /// 新插入的节点（按插入顺序）
    pub added_nodes: Vec<Handle>,
    /// 被移除的节点
    pub removed_nodes: Vec<Handle>,
    /// 内容变更前的文本
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(target: Handle, added_nodes: Vec<Handle>, removed_nodes: Vec<Handle>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes,
            removed_nodes,
            old_value: None,
        }
    }

    pub fn character_data(target: Handle, old_value: String) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            old_value: Some(old_value),
        }
    }
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationRecord")
            .field("kind", &self.kind)
            .field("added_nodes", &self.added_nodes.len())
            .field("removed_nodes", &self.removed_nodes.len())
            .field("old_value", &self.old_value)
            .finish()
    }
}

/// 订阅选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    /// 接收子节点列表变化
    pub child_list: bool,
    /// 接收文本内容变化
    pub character_data: bool,
    /// 同时接收目标所有后代上的变化
    pub subtree: bool,
}

impl ObserveOptions {
    /// 只关心结构变化（整棵子树），不关心文本内容
    pub fn structure() -> Self {
        Self {
            child_list: true,
            character_data: false,
            subtree: true,
        }
    }

    /// 是否接收该类型的变更
    pub fn accepts(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
        }
    }
}
