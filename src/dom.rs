use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::observe::{AttributeSource, Subscription};

#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

struct DocumentInner {
    root: RefCell<Option<Element>>,
    observers: RefCell<Vec<Registration>>,
    pending: RefCell<Vec<(u64, MutationRecord)>>,
    next_observer_id: Cell<u64>,
}

type MutationCallback = Rc<dyn Fn(&[MutationRecord])>;

struct Registration {
    id: u64,
    target: Weak<ElementNode>,
    options: ObserveOptions,
    callback: MutationCallback,
}

/// Which changes an observer is told about.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    /// Attribute names to report; empty reports every attribute.
    pub attribute_filter: Vec<String>,
    /// Also report changes on descendants of the target.
    pub subtree: bool,
}

impl ObserveOptions {
    /// Changes to one attribute of the target element itself.
    pub fn attribute(name: &str) -> Self {
        Self {
            attribute_filter: vec![name.to_string()],
            subtree: false,
        }
    }

    fn wants(&self, name: &str) -> bool {
        self.attribute_filter.is_empty() || self.attribute_filter.iter().any(|f| f == name)
    }
}

#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: Element,
    pub attribute_name: String,
    pub old_value: Option<String>,
}

#[derive(Clone)]
pub struct Element {
    node: Rc<ElementNode>,
}

struct ElementNode {
    tag: String,
    document: Weak<DocumentInner>,
    parent: Weak<ElementNode>,
    attributes: RefCell<BTreeMap<String, String>>,
    children: RefCell<Vec<Element>>,
}

impl Document {
    /// A document whose root is an empty `<html>` element.
    pub fn new() -> Self {
        let doc = Self::detached();
        let root = Element::create("html", Rc::downgrade(&doc.inner), Weak::new());
        *doc.inner.root.borrow_mut() = Some(root);
        doc
    }

    /// A document without a root element, as seen outside a browser page.
    pub fn detached() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                root: RefCell::new(None),
                observers: RefCell::new(Vec::new()),
                pending: RefCell::new(Vec::new()),
                next_observer_id: Cell::new(1),
            }),
        }
    }

    pub fn document_element(&self) -> anyhow::Result<Element> {
        self.inner
            .root
            .borrow()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("document has no root element"))
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    pub fn pending_records(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Delivers queued mutation records, one batch per observer in
    /// registration order, until the queue stays empty. Returns the number of
    /// batches delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let pending = std::mem::take(&mut *self.inner.pending.borrow_mut());
            if pending.is_empty() {
                return delivered;
            }

            let ids: Vec<u64> = self.inner.observers.borrow().iter().map(|r| r.id).collect();
            for id in ids {
                let records: Vec<MutationRecord> = pending
                    .iter()
                    .filter(|(owner, _)| *owner == id)
                    .map(|(_, record)| record.clone())
                    .collect();
                if records.is_empty() {
                    continue;
                }
                // An earlier callback in this pass may have released this observer.
                let callback = self
                    .inner
                    .observers
                    .borrow()
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.callback.clone());
                if let Some(callback) = callback {
                    callback(&records);
                    delivered += 1;
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentInner {
    fn register(
        self: &Rc<Self>,
        target: &Element,
        options: ObserveOptions,
        callback: MutationCallback,
    ) -> Subscription {
        let id = self.next_observer_id.get();
        self.next_observer_id.set(id + 1);
        self.observers.borrow_mut().push(Registration {
            id,
            target: Rc::downgrade(&target.node),
            options,
            callback,
        });
        tracing::debug!(observer = id, element = %target.tag_name(), "observer registered");

        let document = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(document) = document.upgrade() {
                document.unregister(id);
            }
        })
    }

    fn unregister(&self, id: u64) {
        self.observers.borrow_mut().retain(|r| r.id != id);
        self.pending.borrow_mut().retain(|(owner, _)| *owner != id);
        tracing::debug!(observer = id, "observer released");
    }

    fn record(&self, target: &Element, name: &str, old_value: Option<String>) {
        let observers = self.observers.borrow();
        let mut pending = self.pending.borrow_mut();
        for registration in observers.iter() {
            let Some(observed) = registration.target.upgrade() else {
                continue;
            };
            let in_scope = Rc::ptr_eq(&observed, &target.node)
                || (registration.options.subtree && target.is_descendant_of(&observed));
            if in_scope && registration.options.wants(name) {
                pending.push((
                    registration.id,
                    MutationRecord {
                        target: target.clone(),
                        attribute_name: name.to_string(),
                        old_value: old_value.clone(),
                    },
                ));
            }
        }
    }
}

impl Element {
    fn create(tag: &str, document: Weak<DocumentInner>, parent: Weak<ElementNode>) -> Self {
        Self {
            node: Rc::new(ElementNode {
                tag: tag.to_string(),
                document,
                parent,
                attributes: RefCell::new(BTreeMap::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.node.tag
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.node.attributes.borrow().get(name).cloned()
    }

    /// Sets `name`. A record is queued even when the value is unchanged.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let old = self
            .node
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.notify(name, old);
    }

    /// Removes `name`. Removing an absent attribute queues nothing.
    pub fn remove_attribute(&self, name: &str) {
        let old = self.node.attributes.borrow_mut().remove(name);
        if old.is_some() {
            self.notify(name, old);
        }
    }

    pub fn append_child(&self, tag: &str) -> Element {
        let child = Element::create(tag, self.node.document.clone(), Rc::downgrade(&self.node));
        self.node.children.borrow_mut().push(child.clone());
        child
    }

    pub fn children(&self) -> Vec<Element> {
        self.node.children.borrow().clone()
    }

    pub fn observe(
        &self,
        options: ObserveOptions,
        callback: impl Fn(&[MutationRecord]) + 'static,
    ) -> Subscription {
        match self.node.document.upgrade() {
            Some(document) => document.register(self, options, Rc::new(callback)),
            None => Subscription::inert(),
        }
    }

    fn notify(&self, name: &str, old_value: Option<String>) {
        if let Some(document) = self.node.document.upgrade() {
            document.record(self, name, old_value);
        }
    }

    fn is_descendant_of(&self, ancestor: &Rc<ElementNode>) -> bool {
        let mut current = self.node.parent.upgrade();
        while let Some(node) = current {
            if Rc::ptr_eq(&node, ancestor) {
                return true;
            }
            current = node.parent.upgrade();
        }
        false
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.node.tag)
            .field("attributes", &*self.node.attributes.borrow())
            .finish()
    }
}

impl AttributeSource for Element {
    fn read(&self, key: &str) -> Option<String> {
        self.get_attribute(key)
    }

    fn subscribe(&self, key: &str, on_change: Box<dyn Fn()>) -> Subscription {
        self.observe(ObserveOptions::attribute(key), move |_| on_change())
    }
}
