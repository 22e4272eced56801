//! 变更观察者
//!
//! 观察者把感兴趣的变更记录排入自己的待投递队列，由
//! [`LiveDocument::deliver_mutations`] 在检查点统一成批回调。
//! 文档只持有观察者的弱引用：丢弃 [`MutationObserver`] 即等同于断开。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node};

use super::mutation::{MutationRecord, ObserveOptions};
use super::LiveDocument;
use crate::parsers::html::dom::is_inclusive_ancestor;

type MutationCallback = dyn FnMut(&[MutationRecord], &LiveDocument);

struct Registration {
    target: Weak<Node>,
    options: ObserveOptions,
}

pub(crate) struct ObserverShared {
    callback: RefCell<Box<MutationCallback>>,
    registrations: RefCell<Vec<Registration>>,
    pending: RefCell<Vec<MutationRecord>>,
}

impl ObserverShared {
    /// 该观察者是否接收这条记录
    fn is_interested(&self, record: &MutationRecord) -> bool {
        self.registrations.borrow().iter().any(|registration| {
            if !registration.options.accepts(record.kind) {
                return false;
            }

            let Some(target) = registration.target.upgrade() else {
                return false;
            };

            if Rc::ptr_eq(&target, &record.target) {
                return true;
            }

            registration.options.subtree && is_inclusive_ancestor(&target, &record.target)
        })
    }

    pub(crate) fn enqueue(&self, record: &MutationRecord) {
        if self.is_interested(record) {
            self.pending.borrow_mut().push(record.clone());
        }
    }

    pub(crate) fn take_pending(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub(crate) fn invoke(&self, records: &[MutationRecord], document: &LiveDocument) {
        match self.callback.try_borrow_mut() {
            Ok(mut callback) => callback(records, document),
            Err(_) => tracing::warn!("观察者回调重入，丢弃 {} 条变更记录", records.len()),
        }
    }
}

/// 文档子树变更观察者
pub struct MutationObserver {
    shared: Rc<ObserverShared>,
}

impl MutationObserver {
    /// 创建观察者，回调在每次投递时收到一批记录
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&[MutationRecord], &LiveDocument) + 'static,
    {
        Self {
            shared: Rc::new(ObserverShared {
                callback: RefCell::new(Box::new(callback)),
                registrations: RefCell::new(Vec::new()),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    /// 开始观察 `target`；对同一目标重复调用会替换选项
    pub fn observe(&self, document: &LiveDocument, target: &Handle, options: ObserveOptions) {
        {
            let mut registrations = self.shared.registrations.borrow_mut();
            registrations.retain(|r| r.target.strong_count() > 0);

            match registrations
                .iter_mut()
                .find(|r| r.target.upgrade().is_some_and(|t| Rc::ptr_eq(&t, target)))
            {
                Some(existing) => existing.options = options,
                None => registrations.push(Registration {
                    target: Rc::downgrade(target),
                    options,
                }),
            }
        }

        document.register_observer(&self.shared);
    }

    /// 停止观察并丢弃尚未投递的记录；可重复调用
    pub fn disconnect(&self) {
        self.shared.registrations.borrow_mut().clear();
        self.shared.pending.borrow_mut().clear();
    }

    /// 取走尚未投递的记录
    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.shared.take_pending()
    }

    /// 是否还有有效的观察目标
    pub fn is_observing(&self) -> bool {
        self.shared
            .registrations
            .borrow()
            .iter()
            .any(|r| r.target.strong_count() > 0)
    }
}
