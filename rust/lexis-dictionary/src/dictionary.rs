//! Arena-backed compressed trie.
//!
//! Every node owns the label of the edge leading to it (the run of symbols
//! consumed from its parent) and a list of attached values. Children are kept
//! in fixed-size buckets of [`BUCKET_SIZE`] slots, allocated on first use, so
//! a sparse node over a wide alphabet stays small.
//!
//! An insert diverging in the middle of a label materializes an intermediate
//! node holding the common prefix and re-parents the old node under it. A
//! removal prunes childless non-key nodes and merges a non-key node with its
//! only child, so the tree stays compressed in both directions.

use std::mem;
use std::num::NonZeroU32;

use crate::alphabet::Alphabet;

/// Number of child slots per bucket.
pub const BUCKET_SIZE: usize = 16;

type ChildBucket = [Option<NodeId>; BUCKET_SIZE];

/// Handle of a node in a [`Dictionary`] arena.
///
/// Handles stay valid until the node is removed; a later insert may reuse the
/// slot of a removed node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(NonZeroU32::MIN);

    fn from_index(index: usize) -> NodeId {
        NodeId(NonZeroU32::MIN.saturating_add(index as u32))
    }

    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

struct Node<V> {
    label: Box<[u8]>,
    buckets: Box<[Option<Box<ChildBucket>>]>,
    values: Vec<V>,
    is_key: bool,
    parent: Option<NodeId>,
}

impl<V> Node<V> {
    fn new(bucket_count: usize, label: &[u8], parent: Option<NodeId>) -> Node<V> {
        Node {
            label: label.into(),
            buckets: (0..bucket_count).map(|_| None).collect(),
            values: Vec::new(),
            is_key: false,
            parent,
        }
    }

    fn reset(&mut self, label: &[u8], parent: Option<NodeId>) {
        self.label = label.into();
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.values.clear();
        self.is_key = false;
        self.parent = parent;
    }

    #[inline]
    fn child(&self, slot: usize) -> Option<NodeId> {
        self.buckets[slot / BUCKET_SIZE]
            .as_ref()
            .and_then(|bucket| bucket[slot % BUCKET_SIZE])
    }

    fn set_child(&mut self, slot: usize, child: Option<NodeId>) {
        let entry = &mut self.buckets[slot / BUCKET_SIZE];
        match child {
            Some(_) => {
                let bucket = entry.get_or_insert_with(|| Box::new([None; BUCKET_SIZE]));
                bucket[slot % BUCKET_SIZE] = child;
            }
            None => {
                let emptied = match entry {
                    Some(bucket) => {
                        bucket[slot % BUCKET_SIZE] = None;
                        bucket.iter().all(Option::is_none)
                    }
                    None => false,
                };
                if emptied {
                    *entry = None;
                }
            }
        }
    }

    /// Children in slot order.
    fn children(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.buckets
            .iter()
            .flatten()
            .flat_map(|bucket| bucket.iter().flatten().copied())
    }
}

/// Compressed prefix tree mapping byte keys over an [`Alphabet`] to lists of
/// values.
///
/// A key may carry several values (`append`) or exactly one (`insert`). A key
/// may also exist with an empty value list, e.g. after
/// [`append_to_node`](Dictionary::append_to_node) or after its values were
/// drained through [`values_mut`](Dictionary::values_mut).
///
/// Key comparison is byte-exact.
pub struct Dictionary<V> {
    alphabet: Alphabet,
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    len: usize,
}

impl<V> Dictionary<V> {
    pub fn new(alphabet: Alphabet) -> Dictionary<V> {
        let root = Node::new(Self::bucket_count(&alphabet), &[], None);
        Dictionary {
            alphabet,
            nodes: vec![root],
            free: Vec::new(),
            len: 0,
        }
    }

    fn bucket_count(alphabet: &Alphabet) -> usize {
        alphabet.size().div_ceil(BUCKET_SIZE)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Removes every key, keeping the alphabet.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].reset(&[], None);
        self.free.clear();
        self.len = 0;
    }

    /// Materializes the path for `key` and marks its terminal node as a key,
    /// without attaching a value.
    ///
    /// Returns `None`, leaving the dictionary untouched, when `key` holds a
    /// symbol outside the alphabet.
    pub fn append_to_node(&mut self, key: &[u8]) -> Option<NodeId> {
        if !self.alphabet.accepts(key) {
            return None;
        }

        let mut node = NodeId::ROOT;
        let mut rest = key;
        while let Some(&symbol) = rest.first() {
            let slot = self.slot(symbol);
            let Some(child) = self.node(node).child(slot) else {
                let child = self.alloc(rest, Some(node));
                self.node_mut(node).set_child(slot, Some(child));
                node = child;
                break;
            };

            let label = &self.node(child).label;
            let common = common_prefix_len(label, rest);
            node = if common < label.len() {
                self.split(node, slot, child, common)
            } else {
                child
            };
            rest = &rest[common..];
        }

        let terminal = self.node_mut(node);
        if !terminal.is_key {
            terminal.is_key = true;
            self.len += 1;
        }
        Some(node)
    }

    /// Attaches `value` to `key`, after any values already there.
    pub fn append(&mut self, key: &[u8], value: V) -> bool {
        match self.append_to_node(key) {
            Some(node) => {
                self.node_mut(node).values.push(value);
                true
            }
            None => false,
        }
    }

    /// Makes `value` the only value of `key`.
    pub fn insert(&mut self, key: &[u8], value: V) -> bool {
        match self.append_to_node(key) {
            Some(node) => {
                let values = &mut self.node_mut(node).values;
                values.clear();
                values.push(value);
                true
            }
            None => false,
        }
    }

    /// Removes `key` and returns its values, or `None` when it is not a key.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<V>> {
        let node = self.last_node(key)?;
        let entry = self.node_mut(node);
        if !entry.is_key {
            return None;
        }
        entry.is_key = false;
        let values = mem::take(&mut entry.values);
        self.len -= 1;
        self.compact(node);
        Some(values)
    }

    pub fn is_in(&self, key: &[u8]) -> bool {
        self.last_node(key)
            .is_some_and(|node| self.node(node).is_key)
    }

    /// First value of `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.get_all(key).and_then(|values| values.first())
    }

    pub fn get_all(&self, key: &[u8]) -> Option<&[V]> {
        let node = self.node(self.last_node(key)?);
        node.is_key.then_some(node.values.as_slice())
    }

    pub fn get_all_mut(&mut self, key: &[u8]) -> Option<&mut Vec<V>> {
        let node = self.last_node(key)?;
        let node = self.node_mut(node);
        if node.is_key {
            Some(&mut node.values)
        } else {
            None
        }
    }

    pub fn is_key(&self, node: NodeId) -> bool {
        self.node(node).is_key
    }

    pub fn values(&self, node: NodeId) -> &[V] {
        &self.node(node).values
    }

    pub fn values_mut(&mut self, node: NodeId) -> &mut Vec<V> {
        &mut self.node_mut(node).values
    }

    /// Node whose path spells exactly `key`, key or not.
    pub fn last_node(&self, key: &[u8]) -> Option<NodeId> {
        self.last_node_from(NodeId::ROOT, key)
    }

    /// Continues a walk from `start` along `key`. The walk fails when `key`
    /// ends in the middle of an edge label.
    pub fn last_node_from(&self, start: NodeId, key: &[u8]) -> Option<NodeId> {
        let mut node = start;
        let mut rest = key;
        while let Some(&symbol) = rest.first() {
            let child = self.node(node).child(self.alphabet.index(symbol)?)?;
            let label = &self.node(child).label;
            if !rest.starts_with(label) {
                return None;
            }
            rest = &rest[label.len()..];
            node = child;
        }
        Some(node)
    }

    /// Top of the subtree holding every key starting with `prefix`.
    fn prefix_node(&self, prefix: &[u8]) -> Option<NodeId> {
        let mut node = NodeId::ROOT;
        let mut rest = prefix;
        while let Some(&symbol) = rest.first() {
            let child = self.node(node).child(self.alphabet.index(symbol)?)?;
            let label = &self.node(child).label;
            let common = common_prefix_len(label, rest);
            if common == rest.len() {
                return Some(child);
            }
            if common < label.len() {
                return None;
            }
            rest = &rest[common..];
            node = child;
        }
        Some(node)
    }

    /// Full key spelled by the path to `node`.
    pub fn key_of(&self, node: NodeId) -> Vec<u8> {
        let mut labels = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let entry = self.node(id);
            labels.push(&entry.label[..]);
            current = entry.parent;
        }
        labels.into_iter().rev().flatten().copied().collect()
    }

    /// Pre-order traversal of every key with its values. The callback returns
    /// `false` to stop; the return value tells whether the walk completed.
    pub fn visit_down<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[u8], &[V]) -> bool,
    {
        self.walk_down(NodeId::ROOT, Vec::new(), &mut f)
    }

    /// Post-order traversal of every key with its values: children are
    /// reported before their parent.
    pub fn visit_up<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[u8], &[V]) -> bool,
    {
        let mut path = Vec::new();
        let mut stack = vec![(NodeId::ROOT, 0usize, false)];
        while let Some((id, base, expanded)) = stack.pop() {
            let node = self.node(id);
            path.truncate(base);
            path.extend_from_slice(&node.label);
            if expanded {
                if node.is_key && !f(&path, &node.values) {
                    return false;
                }
                continue;
            }
            stack.push((id, base, true));
            let depth = path.len();
            stack.extend(node.children().rev().map(|child| (child, depth, false)));
        }
        true
    }

    /// Pre-order traversal of every key starting with `prefix`, the key equal
    /// to `prefix` included.
    pub fn visit_prefix<F>(&self, prefix: &[u8], mut f: F) -> bool
    where
        F: FnMut(&[u8], &[V]) -> bool,
    {
        let Some(top) = self.prefix_node(prefix) else {
            return true;
        };
        let base = self
            .node(top)
            .parent
            .map(|parent| self.key_of(parent))
            .unwrap_or_default();
        self.walk_down(top, base, &mut f)
    }

    /// Consumes the dictionary, handing every key's values to `cleanup`,
    /// children before parents.
    pub fn teardown<F>(mut self, mut cleanup: F)
    where
        F: FnMut(Vec<V>),
    {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children());
        }
        // Reversed pre-order with children pushed last puts every child
        // ahead of its parent.
        for id in order.into_iter().rev() {
            let node = self.node_mut(id);
            if node.is_key {
                cleanup(mem::take(&mut node.values));
            }
        }
    }

    fn walk_down<F>(&self, top: NodeId, mut path: Vec<u8>, f: &mut F) -> bool
    where
        F: FnMut(&[u8], &[V]) -> bool,
    {
        let mut stack = vec![(top, path.len())];
        while let Some((id, base)) = stack.pop() {
            let node = self.node(id);
            path.truncate(base);
            path.extend_from_slice(&node.label);
            if node.is_key && !f(&path, &node.values) {
                return false;
            }
            let depth = path.len();
            stack.extend(node.children().rev().map(|child| (child, depth)));
        }
        true
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.index()]
    }

    /// Slot of a symbol already validated against the alphabet.
    #[inline]
    fn slot(&self, symbol: u8) -> usize {
        self.alphabet.index(symbol).unwrap_or_default()
    }

    fn alloc(&mut self, label: &[u8], parent: Option<NodeId>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.node_mut(id).reset(label, parent);
            return id;
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes
            .push(Node::new(Self::bucket_count(&self.alphabet), label, parent));
        id
    }

    fn release(&mut self, id: NodeId) {
        self.node_mut(id).reset(&[], None);
        self.free.push(id);
    }

    /// Splits the edge `parent -> child` after `at` label symbols and returns
    /// the intermediate node.
    fn split(&mut self, parent: NodeId, slot: usize, child: NodeId, at: usize) -> NodeId {
        let label = mem::take(&mut self.node_mut(child).label);
        let (head, tail) = label.split_at(at);
        let mid = self.alloc(head, Some(parent));
        let tail_slot = self.slot(tail[0]);

        let old = self.node_mut(child);
        old.label = tail.into();
        old.parent = Some(mid);
        self.node_mut(mid).set_child(tail_slot, Some(child));
        self.node_mut(parent).set_child(slot, Some(mid));
        mid
    }

    /// Restores compression upwards from a node that just stopped being a key.
    fn compact(&mut self, mut id: NodeId) {
        while id != NodeId::ROOT {
            let node = self.node(id);
            let Some(parent) = node.parent else {
                return;
            };
            if node.is_key {
                return;
            }
            let slot = self.slot(node.label[0]);
            let (first, second) = {
                let mut children = node.children();
                (children.next(), children.next())
            };

            match (first, second) {
                (None, _) => {
                    self.node_mut(parent).set_child(slot, None);
                    self.release(id);
                    id = parent;
                }
                (Some(only), None) => {
                    let head = mem::take(&mut self.node_mut(id).label);
                    let child = self.node_mut(only);
                    let mut label = Vec::with_capacity(head.len() + child.label.len());
                    label.extend_from_slice(&head);
                    label.extend_from_slice(&child.label);
                    child.label = label.into();
                    child.parent = Some(parent);
                    self.node_mut(parent).set_child(slot, Some(only));
                    self.release(id);
                    return;
                }
                _ => return,
            }
        }
    }
}

impl<V> std::fmt::Debug for Dictionary<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("alphabet", &self.alphabet)
            .field("len", &self.len)
            .field("nodes", &self.node_count())
            .finish()
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn collect_down<V: Clone>(dict: &Dictionary<V>) -> Vec<(Vec<u8>, Vec<V>)> {
        let mut out = Vec::new();
        dict.visit_down(|key, values| {
            out.push((key.to_vec(), values.to_vec()));
            true
        });
        out
    }

    #[test]
    fn test_append_and_get() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        assert!(dict.append(b"string1", 1));
        assert!(dict.append(b"string2", 2));
        assert!(dict.append(b"str_to_int", 3));

        assert_eq!(dict.get(b"string1"), Some(&1));
        assert_eq!(dict.get(b"string2"), Some(&2));
        assert_eq!(dict.get(b"str_to_int"), Some(&3));
        assert_eq!(dict.get(b"string"), None);
        assert_eq!(dict.get(b"str"), None);
        assert!(!dict.is_in(b"strin"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_append_accumulates_insert_replaces() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        dict.append(b"key", 1);
        dict.append(b"key", 2);
        assert_eq!(dict.get_all(b"key"), Some(&[1, 2][..]));

        dict.insert(b"key", 7);
        assert_eq!(dict.get_all(b"key"), Some(&[7][..]));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_split_keeps_both_keys() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        dict.append(b"abcdef", 1);
        let before = dict.node_count();
        dict.append(b"abcxyz", 2);
        // One intermediate node for "abc" plus the new leaf.
        assert_eq!(dict.node_count(), before + 2);
        dict.append(b"abc", 3);
        assert_eq!(dict.node_count(), before + 2);

        assert_eq!(dict.get(b"abcdef"), Some(&1));
        assert_eq!(dict.get(b"abcxyz"), Some(&2));
        assert_eq!(dict.get(b"abc"), Some(&3));
        assert!(dict.last_node(b"ab").is_none());
        assert!(dict.last_node(b"abc").is_some());
    }

    #[test]
    fn test_rejects_foreign_symbols() {
        let mut dict = Dictionary::new(Alphabet::DIGITS);
        assert!(dict.append(b"123", 1u64));
        let nodes = dict.node_count();
        assert!(!dict.append(b"12a", 2));
        assert!(dict.append_to_node(b"1x3").is_none());
        assert_eq!(dict.node_count(), nodes);
        assert_eq!(dict.get(b"12a"), None);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_empty_key_is_root() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        assert!(!dict.is_in(b""));
        dict.append(b"", "sentinel");
        assert!(dict.is_in(b""));
        assert_eq!(dict.last_node(b""), Some(NodeId::ROOT));
        assert_eq!(collect_down(&dict), vec![(Vec::new(), vec!["sentinel"])]);
        assert_eq!(dict.remove(b""), Some(vec!["sentinel"]));
        assert!(dict.is_empty());
        assert_eq!(dict.node_count(), 1);
    }

    #[test]
    fn test_append_to_node_creates_empty_key() {
        let mut dict: Dictionary<u64> = Dictionary::new(Alphabet::DIGITS);
        let node = dict.append_to_node(b"42").unwrap();
        assert!(dict.is_key(node));
        assert!(dict.is_in(b"42"));
        assert_eq!(dict.get(b"42"), None);
        assert_eq!(dict.get_all(b"42"), Some(&[][..]));

        dict.values_mut(node).push(9);
        assert_eq!(dict.values(node), &[9]);
        assert_eq!(dict.key_of(node), b"42");
    }

    #[test]
    fn test_remove_prunes_and_merges() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        dict.append(b"team", 1);
        dict.append(b"tea", 2);
        dict.append(b"ten", 3);
        let full = dict.node_count();

        assert_eq!(dict.remove(b"te"), None);
        assert_eq!(dict.remove(b"tea"), Some(vec![2]));
        assert_eq!(dict.get(b"team"), Some(&1));
        assert_eq!(dict.get(b"ten"), Some(&3));
        // "tea" merged into "m".
        assert_eq!(dict.node_count(), full - 1);

        assert_eq!(dict.remove(b"ten"), Some(vec![3]));
        // "te" merged into "am", "n" released.
        assert_eq!(dict.node_count(), 2);
        assert_eq!(dict.get(b"team"), Some(&1));
        assert_eq!(collect_down(&dict), vec![(b"team".to_vec(), vec![1])]);

        assert_eq!(dict.remove(b"team"), Some(vec![1]));
        assert_eq!(dict.node_count(), 1);
        assert!(dict.is_empty());
        assert_eq!(dict.remove(b"team"), None);
    }

    #[test]
    fn test_visit_orders() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        for (i, key) in ["b", "a", "ab", "abc", "ac"].iter().enumerate() {
            dict.append(key.as_bytes(), i);
        }

        let down: Vec<Vec<u8>> = collect_down(&dict).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            down,
            vec![b"a".to_vec(), b"ab".to_vec(), b"abc".to_vec(), b"ac".to_vec(), b"b".to_vec()]
        );

        let mut up = Vec::new();
        dict.visit_up(|key, _| {
            up.push(key.to_vec());
            true
        });
        assert_eq!(
            up,
            vec![b"abc".to_vec(), b"ab".to_vec(), b"ac".to_vec(), b"a".to_vec(), b"b".to_vec()]
        );

        let mut seen = 0;
        let completed = dict.visit_down(|_, _| {
            seen += 1;
            seen < 2
        });
        assert!(!completed);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_visit_prefix() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        dict.append(b"string1", 1);
        dict.append(b"string2", 2);
        dict.append(b"str_to_int", 3);
        dict.append(b"other", 4);

        let mut found = Vec::new();
        dict.visit_prefix(b"str", |key, values| {
            found.push((key.to_vec(), values[0]));
            true
        });
        assert_eq!(found.len(), 3);
        assert!(found.contains(&(b"str_to_int".to_vec(), 3)));

        // Prefix ending inside an edge label.
        let mut found = Vec::new();
        dict.visit_prefix(b"stri", |key, _| {
            found.push(key.to_vec());
            true
        });
        assert_eq!(found, vec![b"string1".to_vec(), b"string2".to_vec()]);

        let mut exact = Vec::new();
        dict.visit_prefix(b"other", |key, _| {
            exact.push(key.to_vec());
            true
        });
        assert_eq!(exact, vec![b"other".to_vec()]);

        let mut none = 0;
        dict.visit_prefix(b"strings", |_, _| {
            none += 1;
            true
        });
        dict.visit_prefix(b"x", |_, _| {
            none += 1;
            true
        });
        assert_eq!(none, 0);

        let mut all = 0;
        dict.visit_prefix(b"", |_, _| {
            all += 1;
            true
        });
        assert_eq!(all, 4);
    }

    #[test]
    fn test_teardown_visits_children_first() {
        let mut dict = Dictionary::new(Alphabet::DIGITS);
        dict.append(b"1", 1);
        dict.append(b"12", 12);
        dict.append(b"123", 123);
        dict.append(b"2", 2);

        let mut released = Vec::new();
        dict.teardown(|values| released.extend(values));
        let pos = |v: i32| released.iter().position(|&x| x == v).unwrap();
        assert_eq!(released.len(), 4);
        assert!(pos(123) < pos(12));
        assert!(pos(12) < pos(1));
    }

    #[test]
    fn test_clear() {
        let mut dict = Dictionary::new(Alphabet::BYTES);
        dict.append(b"a", 1);
        dict.append(b"b", 2);
        dict.clear();
        assert!(dict.is_empty());
        assert_eq!(dict.node_count(), 1);
        assert_eq!(dict.get(b"a"), None);
        dict.append(b"a", 3);
        assert_eq!(dict.get(b"a"), Some(&3));
    }

    #[test]
    fn test_random_against_hashmap() {
        let mut rng = fastrand::Rng::with_seed(4711);
        let mut dict = Dictionary::new(Alphabet::DIGITS);
        let mut reference = HashMap::<Vec<u8>, u64>::new();

        for step in 0..20_000u64 {
            let key = rng.u64(..5000).to_string().into_bytes();
            if rng.u8(..4) == 0 {
                let expected = reference.remove(&key).map(|v| vec![v]);
                assert_eq!(dict.remove(&key), expected);
            } else {
                dict.insert(&key, step);
                reference.insert(key, step);
            }
        }

        assert_eq!(dict.len(), reference.len());
        for (key, value) in &reference {
            assert_eq!(dict.get(key), Some(value));
        }

        let mut visited = 0;
        let mut previous: Option<Vec<u8>> = None;
        dict.visit_down(|key, values| {
            assert_eq!(reference.get(key), values.first());
            if let Some(prev) = &previous {
                assert!(prev.as_slice() < key);
            }
            previous = Some(key.to_vec());
            visited += 1;
            true
        });
        assert_eq!(visited, reference.len());

        for key in reference.keys().cloned().collect::<Vec<_>>() {
            dict.remove(&key);
        }
        assert!(dict.is_empty());
        assert_eq!(dict.node_count(), 1);
    }
}
