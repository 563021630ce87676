//! Chain: singly linked bucket list for the separate-chaining table.
//!
//! Nodes live in a per-chain `SlotMap` arena and link to their successor
//! through generational keys, so the list is walked and relinked in safe
//! code. The table only sees insert, key lookup, key removal, length and
//! forward traversal; the node layout stays private to this module.

use crate::entry::Entry;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

#[derive(Debug)]
struct Node<V> {
    entry: Entry<V>,
    next: Option<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct Chain<V> {
    nodes: SlotMap<NodeKey, Node<V>>,
    head: Option<NodeKey>,
}

impl<V> Chain<V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepend a new entry. Does not check for an existing key.
    pub(crate) fn insert(&mut self, key: String, value: V) {
        let node = Node {
            entry: Entry::new(key, value),
            next: self.head,
        };
        self.head = Some(self.nodes.insert(node));
    }

    fn find_node(&self, key: &str) -> Option<NodeKey> {
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            if node.entry.key == key {
                return Some(k);
            }
            cursor = node.next;
        }
        None
    }

    pub(crate) fn get(&self, key: &str) -> Option<&V> {
        self.find_node(key).map(|k| &self.nodes[k].entry.value)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.find_node(key)?;
        Some(&mut self.nodes[k].entry.value)
    }

    /// Unlink the node holding `key`; `None` reports that nothing was removed.
    pub(crate) fn remove(&mut self, key: &str) -> Option<V> {
        let mut prev: Option<NodeKey> = None;
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            let next = node.next;
            if node.entry.key == key {
                match prev {
                    None => self.head = next,
                    Some(p) => self.nodes[p].next = next,
                }
                return self.nodes.remove(k).map(|n| n.entry.value);
            }
            prev = Some(k);
            cursor = next;
        }
        None
    }

    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }
}

/// Forward traversal from the head.
pub(crate) struct Iter<'a, V> {
    nodes: &'a SlotMap<NodeKey, Node<V>>,
    cursor: Option<NodeKey>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node.entry.as_pair())
    }
}

/// Owning traversal used when a resize drains old chains.
pub(crate) struct IntoIter<V> {
    nodes: SlotMap<NodeKey, Node<V>>,
    cursor: Option<NodeKey>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.remove(self.cursor?)?;
        self.cursor = node.next;
        Some(node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<V> IntoIterator for Chain<V> {
    type Item = Entry<V>;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            nodes: self.nodes,
            cursor: self.head,
        }
    }
}
