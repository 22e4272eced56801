//! 容器变更监听
//!
//! 只订阅子节点列表变化（含整棵子树），从不订阅文本内容变化：
//! 引擎自己写回译文不会再触发扫描。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::document::{LiveDocument, MutationKind, MutationObserver, MutationRecord, ObserveOptions};
use crate::parsers::html::dom::{get_parent_node, has_class};

/// 容器结构变化的监听器
#[derive(Default)]
pub struct ChangeObserver {
    observer: Option<MutationObserver>,
}

impl ChangeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始监听 `container`
    ///
    /// 每批记录中，目标本身或它到容器之间的祖先带有边界标记的记录被忽略（容器自身除外），
    /// 其余记录新插入的节点按顺序交给 `on_added`。已在监听时先断开旧订阅。
    pub fn start<F>(
        &mut self,
        document: &LiveDocument,
        container: &Handle,
        boundary_class: &str,
        mut on_added: F,
    ) where
        F: FnMut(&[Handle], &LiveDocument) + 'static,
    {
        self.stop();

        let root = Rc::downgrade(container);
        let boundary_class = boundary_class.to_string();

        let observer = MutationObserver::new(move |records: &[MutationRecord], document| {
            let Some(root) = root.upgrade() else {
                return;
            };

            let added = collect_added_nodes(records, &root, &boundary_class);
            if added.is_empty() {
                return;
            }

            tracing::debug!("检测到 {} 个新插入节点", added.len());
            on_added(&added, document);
        });

        observer.observe(document, container, ObserveOptions::structure());
        self.observer = Some(observer);
    }

    /// 断开订阅；可重复调用
    pub fn stop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    pub fn is_active(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(MutationObserver::is_observing)
    }
}

impl Drop for ChangeObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn collect_added_nodes(records: &[MutationRecord], root: &Handle, boundary_class: &str) -> Vec<Handle> {
    records
        .iter()
        .filter(|record| record.kind == MutationKind::ChildList)
        .filter(|record| !within_boundary(&record.target, root, boundary_class))
        .flat_map(|record| record.added_nodes.iter().cloned())
        .collect()
}

/// 从 `node` 向上直到容器（不含），是否经过带边界标记的元素
fn within_boundary(node: &Handle, root: &Handle, boundary_class: &str) -> bool {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, root) {
            return false;
        }
        if has_class(&candidate, boundary_class) {
            return true;
        }
        current = get_parent_node(&candidate);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::find_by_id;
    use std::cell::RefCell;

    fn setup() -> (LiveDocument, Handle) {
        let doc = LiveDocument::from_html(
            "<div id=\"root\" class=\"localisation-boundary\"><p id=\"p\"></p><div id=\"b\" class=\"localisation-boundary\"></div></div>",
        )
        .unwrap();
        let root = find_by_id(doc.document(), "root").unwrap();
        (doc, root)
    }

    fn start(doc: &LiveDocument, root: &Handle) -> (ChangeObserver, Rc<RefCell<Vec<Handle>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut observer = ChangeObserver::new();
        observer.start(doc, root, "localisation-boundary", move |nodes, _| {
            sink.borrow_mut().extend_from_slice(nodes)
        });
        (observer, seen)
    }

    #[test]
    fn test_added_nodes_reported() {
        let (doc, root) = setup();
        let p = find_by_id(doc.document(), "p").unwrap();
        let (observer, seen) = start(&doc, &root);

        doc.append_child(&root, &doc.create_text("a")).unwrap();
        doc.append_child(&p, &doc.create_text("b")).unwrap();
        doc.deliver_mutations();

        assert!(observer.is_active());
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_records_inside_boundary_ignored() {
        let (doc, root) = setup();
        let boundary = find_by_id(doc.document(), "b").unwrap();
        let (_observer, seen) = start(&doc, &root);

        doc.append_child(&boundary, &doc.create_text("hidden")).unwrap();
        doc.deliver_mutations();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_records_below_nested_boundary_ignored() {
        let (doc, root) = setup();
        let boundary = find_by_id(doc.document(), "b").unwrap();
        let inner = doc.create_element("div", &[]);
        doc.append_child(&boundary, &inner).unwrap();
        let (_observer, seen) = start(&doc, &root);

        doc.append_child(&inner, &doc.create_text("hidden")).unwrap();
        doc.deliver_mutations();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_text_writes_not_observed() {
        let (doc, root) = setup();
        let text = doc.create_text("a");
        doc.append_child(&root, &text).unwrap();

        let (_observer, seen) = start(&doc, &root);
        doc.set_text(&text, "b");

        assert_eq!(doc.deliver_mutations(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (doc, root) = setup();
        let (mut observer, seen) = start(&doc, &root);

        observer.stop();
        observer.stop();
        doc.append_child(&root, &doc.create_text("a")).unwrap();
        doc.deliver_mutations();

        assert!(!observer.is_active());
        assert!(seen.borrow().is_empty());
    }
}
