//! Recency ordering for LRU eviction
//!
//! A doubly linked list stored in a `Vec` arena. Nodes are addressed by a
//! [`NodeId`] handle that the owner keeps next to each entry, so touching,
//! unlinking and popping the least recently used key are all O(1).
//! Freed slots are recycled through a free list.

/// Handle to a node in a [`RecencyList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K> {
    key: Option<K>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered sequence of keys: least recently used at the head,
/// most recently used at the tail.
#[derive(Debug)]
pub struct RecencyList<K> {
    nodes: Vec<Node<K>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K> RecencyList<K> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `key` at the tail (most recently used)
    pub fn push_back(&mut self, key: K) -> NodeId {
        let node = Node {
            key: Some(key),
            prev: self.tail,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;

        NodeId(idx)
    }

    /// Move an existing node to the tail without reallocating it
    pub fn move_to_back(&mut self, id: NodeId) {
        let idx = id.0;
        if self.tail == Some(idx) {
            return;
        }

        self.detach(idx);

        self.nodes[idx].prev = self.tail;
        self.nodes[idx].next = None;
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    /// Remove the head (least recently used) and return its key
    pub fn pop_front(&mut self) -> Option<K> {
        let idx = self.head?;
        self.release(idx)
    }

    /// Unlink a node and return its key
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        self.release(id.0)
    }

    /// Key at the head, i.e. the next eviction victim
    pub fn front(&self) -> Option<&K> {
        self.head.and_then(|idx| self.nodes[idx].key.as_ref())
    }

    /// Key at the tail, i.e. the most recently used one
    pub fn back(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.nodes[idx].key.as_ref())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Keys from least to most recently used
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn release(&mut self, idx: usize) -> Option<K> {
        let key = self.nodes.get_mut(idx)?.key.take()?;
        self.detach(idx);
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
        self.free.push(idx);
        self.len -= 1;
        Some(key)
    }

    // Unlink `idx` from its neighbours, leaving its own links stale.
    fn detach(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
    }
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.list.nodes[idx];
        self.cursor = node.next;
        node.key.as_ref()
    }
}
