//! # 可变文档模块
//!
//! 在 rcdom 树之上提供一个"活"的文档：所有结构操作和文本写入都经过
//! [`LiveDocument`]，由它生成 [`MutationRecord`] 并排入已注册观察者的队列。
//! 记录不会立即回调，而是在调用 [`LiveDocument::deliver_mutations`] 时成批投递，
//! 相当于宿主环境的微任务检查点。
//!
//! # 模块组织
//!
//! - `mutation` - 变更记录与订阅选项
//! - `observer` - 变更观察者

pub mod mutation;
pub mod observer;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::{format_tendril, StrTendril};
use html5ever::tree_builder::{create_element, TreeSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

pub use mutation::{MutationKind, MutationRecord, ObserveOptions};
pub use observer::MutationObserver;

use crate::parsers::html::dom::{get_parent_node, html_to_dom, is_inclusive_ancestor};
use crate::parsers::html::serializer::{serialize_children, serialize_document};
use crate::translation::error::helpers::dom_error;
use crate::translation::error::LocaliserResult;
use observer::ObserverShared;

/// 一次投递检查点中允许的最大轮数，防止观察者回调互相触发形成死循环
const MAX_DELIVERY_ROUNDS: usize = 64;

/// 可观察的 HTML 文档
pub struct LiveDocument {
    dom: RcDom,
    observers: RefCell<Vec<Weak<ObserverShared>>>,
}

impl LiveDocument {
    /// 包装已解析的 DOM
    pub fn from_dom(dom: RcDom) -> Self {
        Self {
            dom,
            observers: RefCell::new(Vec::new()),
        }
    }

    /// 从字节解析文档
    pub fn parse(data: &[u8], document_encoding: &str) -> LocaliserResult<Self> {
        Ok(Self::from_dom(html_to_dom(data, document_encoding)?))
    }

    /// 从 UTF-8 字符串解析文档
    pub fn from_html(html: &str) -> LocaliserResult<Self> {
        Self::parse(html.as_bytes(), "utf-8")
    }

    /// 文档根节点
    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// 按指定编码序列化整个文档
    pub fn serialize(&self, document_encoding: &str) -> LocaliserResult<Vec<u8>> {
        serialize_document(&self.dom.document, document_encoding)
    }

    /// 序列化节点的子节点
    pub fn inner_html(&self, node: &Handle) -> LocaliserResult<String> {
        serialize_children(node)
    }

    // ------------------------------------------------------------------
    // 节点工厂
    // ------------------------------------------------------------------

    /// 创建游离的文本节点
    pub fn create_text(&self, text: &str) -> Handle {
        Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from_slice(text)),
        })
    }

    /// 创建游离的注释节点
    pub fn create_comment(&self, text: &str) -> Handle {
        self.dom.create_comment(StrTendril::from_slice(text))
    }

    /// 创建游离的元素
    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> Handle {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: format_tendril!("{}", value),
            })
            .collect();

        create_element(
            &self.dom,
            QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs,
        )
    }

    /// 创建文档片段；插入片段时移动的是它的子节点
    pub fn create_fragment(&self) -> Handle {
        Node::new(NodeData::Document)
    }

    // ------------------------------------------------------------------
    // 结构变更
    // ------------------------------------------------------------------

    /// 追加子节点；已有父节点的节点会被移动
    pub fn append_child(&self, parent: &Handle, child: &Handle) -> LocaliserResult<()> {
        self.insert_before(parent, child, None)
    }

    /// 在 `reference` 之前插入；`reference` 为 `None` 时追加到末尾
    pub fn insert_before(
        &self,
        parent: &Handle,
        child: &Handle,
        reference: Option<&Handle>,
    ) -> LocaliserResult<()> {
        check_insertion(parent, child)?;

        if let Some(reference) = reference {
            if index_of(parent, reference).is_none() {
                return Err(dom_error("参考节点不是父节点的子节点"));
            }
            if Rc::ptr_eq(reference, child) {
                return Ok(());
            }
        }

        let nodes = self.take_for_insertion(child);
        if nodes.is_empty() {
            return Ok(());
        }

        {
            // 移动可能改变了参考节点的下标，因此在摘除之后再定位
            let mut children = parent.children.borrow_mut();
            let index = reference
                .and_then(|r| children.iter().position(|c| Rc::ptr_eq(c, r)))
                .unwrap_or(children.len());

            for (offset, node) in nodes.iter().enumerate() {
                node.parent.set(Some(Rc::downgrade(parent)));
                children.insert(index + offset, node.clone());
            }
        }

        self.queue_record(MutationRecord::child_list(parent.clone(), nodes, Vec::new()));
        Ok(())
    }

    /// 移除子节点并返回它
    pub fn remove_child(&self, parent: &Handle, child: &Handle) -> LocaliserResult<Handle> {
        let index = index_of(parent, child).ok_or_else(|| dom_error("节点不是父节点的子节点"))?;

        let removed = parent.children.borrow_mut().remove(index);
        removed.parent.set(None);

        self.queue_record(MutationRecord::child_list(
            parent.clone(),
            Vec::new(),
            vec![removed.clone()],
        ));

        Ok(removed)
    }

    /// 用 `new_child` 替换 `old_child`，返回被替换的节点
    pub fn replace_child(
        &self,
        parent: &Handle,
        new_child: &Handle,
        old_child: &Handle,
    ) -> LocaliserResult<Handle> {
        check_insertion(parent, new_child)?;
        if index_of(parent, old_child).is_none() {
            return Err(dom_error("被替换的节点不是父节点的子节点"));
        }
        if Rc::ptr_eq(new_child, old_child) {
            return Ok(old_child.clone());
        }

        let nodes = self.take_for_insertion(new_child);

        {
            let mut children = parent.children.borrow_mut();
            let index = children
                .iter()
                .position(|c| Rc::ptr_eq(c, old_child))
                .ok_or_else(|| dom_error("被替换的节点不是父节点的子节点"))?;

            children.remove(index);
            old_child.parent.set(None);

            for (offset, node) in nodes.iter().enumerate() {
                node.parent.set(Some(Rc::downgrade(parent)));
                children.insert(index + offset, node.clone());
            }
        }

        self.queue_record(MutationRecord::child_list(
            parent.clone(),
            nodes,
            vec![old_child.clone()],
        ));

        Ok(old_child.clone())
    }

    /// 覆盖文本节点内容；非文本节点被忽略
    pub fn set_text(&self, node: &Handle, text: &str) {
        let NodeData::Text { contents } = &node.data else {
            tracing::warn!("忽略对非文本节点的文本写入");
            return;
        };

        let old_value = {
            let mut contents = contents.borrow_mut();
            let old_value = contents.to_string();
            *contents = StrTendril::from_slice(text);
            old_value
        };

        self.queue_record(MutationRecord::character_data(node.clone(), old_value));
    }

    // ------------------------------------------------------------------
    // 观察者
    // ------------------------------------------------------------------

    /// 投递所有待处理的变更记录，直到没有新的记录产生
    ///
    /// 返回本次检查点中回调被调用的次数。
    pub fn deliver_mutations(&self) -> usize {
        let mut invocations = 0;

        for _ in 0..MAX_DELIVERY_ROUNDS {
            let observers = self.live_observers();
            let mut delivered_any = false;

            for observer in observers {
                let batch = observer.take_pending();
                if batch.is_empty() {
                    continue;
                }

                delivered_any = true;
                invocations += 1;
                observer.invoke(&batch, self);
            }

            if !delivered_any {
                return invocations;
            }
        }

        tracing::warn!("变更投递超过 {} 轮仍未稳定，剩余记录留待下次投递", MAX_DELIVERY_ROUNDS);
        invocations
    }

    /// 当前仍存活的观察者数量
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    pub(crate) fn register_observer(&self, observer: &Rc<ObserverShared>) {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);

        let already_registered = observers
            .iter()
            .any(|o| std::ptr::eq(o.as_ptr(), Rc::as_ptr(observer)));
        if !already_registered {
            observers.push(Rc::downgrade(observer));
        }
    }

    fn live_observers(&self) -> Vec<Rc<ObserverShared>> {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    }

    fn queue_record(&self, record: MutationRecord) {
        for observer in self.live_observers() {
            observer.enqueue(&record);
        }
    }

    /// 取出待插入的节点：片段交出全部子节点，普通节点先从旧父节点摘除
    fn take_for_insertion(&self, node: &Handle) -> Vec<Handle> {
        if let NodeData::Document = node.data {
            let nodes: Vec<Handle> = std::mem::take(&mut *node.children.borrow_mut());
            for child in &nodes {
                child.parent.set(None);
            }
            if !nodes.is_empty() {
                self.queue_record(MutationRecord::child_list(node.clone(), Vec::new(), nodes.clone()));
            }
            return nodes;
        }

        if let Some(old_parent) = get_parent_node(node) {
            if let Err(e) = self.remove_child(&old_parent, node) {
                tracing::warn!("从旧父节点摘除失败，按游离节点插入: {}", e);
                node.parent.set(None);
            }
        }

        vec![node.clone()]
    }
}

fn index_of(parent: &Handle, child: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|c| Rc::ptr_eq(c, child))
}

fn check_insertion(parent: &Handle, child: &Handle) -> LocaliserResult<()> {
    match parent.data {
        NodeData::Element { .. } | NodeData::Document => {}
        _ => return Err(dom_error("只有元素或片段可以包含子节点")),
    }

    if is_inclusive_ancestor(child, parent) {
        return Err(dom_error("不能把节点插入到它自身或其后代中"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_by_id, text_of};

    fn setup() -> (LiveDocument, Handle) {
        let doc = LiveDocument::from_html("<div id=\"root\"><p id=\"p\">one</p></div>").unwrap();
        let root = find_by_id(doc.document(), "root").unwrap();
        (doc, root)
    }

    fn recorder(doc: &LiveDocument, target: &Handle, options: ObserveOptions) -> (MutationObserver, Rc<RefCell<Vec<MutationRecord>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let observer = MutationObserver::new(move |records, _| sink.borrow_mut().extend_from_slice(records));
        observer.observe(doc, target, options);
        (observer, seen)
    }

    #[test]
    fn test_append_and_remove_child() {
        let (doc, root) = setup();
        let text = doc.create_text("two");

        doc.append_child(&root, &text).unwrap();
        assert_eq!(root.children.borrow().len(), 2);
        assert!(Rc::ptr_eq(&get_parent_node(&text).unwrap(), &root));

        let removed = doc.remove_child(&root, &text).unwrap();
        assert!(Rc::ptr_eq(&removed, &text));
        assert!(get_parent_node(&text).is_none());
        assert!(doc.remove_child(&root, &text).is_err());
    }

    #[test]
    fn test_insert_before_keeps_order() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let first = doc.create_text("zero");

        doc.insert_before(&root, &first, Some(&p)).unwrap();

        let children = root.children.borrow();
        assert_eq!(text_of(&children[0]).as_deref(), Some("zero"));
        assert!(Rc::ptr_eq(&children[1], &p));
    }

    #[test]
    fn test_cannot_insert_into_text_or_descendant() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let text = p.children.borrow()[0].clone();

        assert!(doc.append_child(&text, &doc.create_text("x")).is_err());
        assert!(doc.append_child(&p, &root).is_err());
    }

    #[test]
    fn test_records_delivered_in_batches() {
        let (doc, root) = setup();
        let (_observer, seen) = recorder(&doc, &root, ObserveOptions::structure());

        doc.append_child(&root, &doc.create_text("a")).unwrap();
        doc.append_child(&root, &doc.create_text("b")).unwrap();
        assert!(seen.borrow().is_empty());

        assert_eq!(doc.deliver_mutations(), 1);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(doc.deliver_mutations(), 0);
    }

    #[test]
    fn test_subtree_and_character_data_filtering() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let text = p.children.borrow()[0].clone();

        let (_structure, structure_seen) = recorder(&doc, &root, ObserveOptions::structure());
        let (_direct, direct_seen) = recorder(
            &doc,
            &root,
            ObserveOptions {
                child_list: true,
                character_data: false,
                subtree: false,
            },
        );
        let (_content, content_seen) = recorder(
            &doc,
            &root,
            ObserveOptions {
                child_list: false,
                character_data: true,
                subtree: true,
            },
        );

        doc.append_child(&p, &doc.create_text("deep")).unwrap();
        doc.set_text(&text, "changed");
        doc.deliver_mutations();

        assert_eq!(structure_seen.borrow().len(), 1);
        assert!(direct_seen.borrow().is_empty());
        assert_eq!(content_seen.borrow().len(), 1);
        assert_eq!(content_seen.borrow()[0].old_value.as_deref(), Some("one"));
    }

    #[test]
    fn test_fragment_insertion_moves_children() {
        let (doc, root) = setup();
        let fragment = doc.create_fragment();
        doc.append_child(&fragment, &doc.create_text("a")).unwrap();
        doc.append_child(&fragment, &doc.create_text("b")).unwrap();

        let (_observer, seen) = recorder(&doc, &root, ObserveOptions::structure());
        doc.append_child(&root, &fragment).unwrap();
        doc.deliver_mutations();

        assert!(fragment.children.borrow().is_empty());
        assert_eq!(root.children.borrow().len(), 3);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].added_nodes.len(), 2);
    }

    #[test]
    fn test_moving_node_records_removal_and_addition() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let text = p.children.borrow()[0].clone();

        let (_observer, seen) = recorder(&doc, &root, ObserveOptions::structure());
        doc.append_child(&root, &text).unwrap();
        doc.deliver_mutations();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].removed_nodes.len(), 1);
        assert_eq!(seen[1].added_nodes.len(), 1);
        assert!(p.children.borrow().is_empty());
    }

    #[test]
    fn test_stale_parent_pointer_does_not_block_insertion() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let text = doc.create_text("loose");
        text.parent.set(Some(Rc::downgrade(&p)));

        doc.append_child(&root, &text).unwrap();

        assert!(Rc::ptr_eq(&get_parent_node(&text).unwrap(), &root));
        assert_eq!(p.children.borrow().len(), 1);
        assert_eq!(root.children.borrow().len(), 2);
    }

    #[test]
    fn test_replace_child() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let span = doc.create_element("span", &[("class", "fresh")]);

        let (_observer, seen) = recorder(&doc, &root, ObserveOptions::structure());
        let old = doc.replace_child(&root, &span, &p).unwrap();
        doc.deliver_mutations();

        assert!(Rc::ptr_eq(&old, &p));
        assert!(Rc::ptr_eq(&root.children.borrow()[0], &span));
        assert_eq!(seen.borrow()[0].added_nodes.len(), 1);
        assert_eq!(seen.borrow()[0].removed_nodes.len(), 1);
    }

    #[test]
    fn test_disconnect_and_drop_stop_delivery() {
        let (doc, root) = setup();
        let (observer, seen) = recorder(&doc, &root, ObserveOptions::structure());

        observer.disconnect();
        observer.disconnect();
        doc.append_child(&root, &doc.create_text("a")).unwrap();
        assert_eq!(doc.deliver_mutations(), 0);
        assert!(seen.borrow().is_empty());
        assert!(!observer.is_observing());

        drop(observer);
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn test_take_records_empties_queue() {
        let (doc, root) = setup();
        let (observer, seen) = recorder(&doc, &root, ObserveOptions::structure());

        doc.append_child(&root, &doc.create_comment("note")).unwrap();
        assert_eq!(observer.take_records().len(), 1);
        assert_eq!(doc.deliver_mutations(), 0);
        assert!(seen.borrow().is_empty());
    }
}
