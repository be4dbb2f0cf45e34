//! Defines `Node` and `NodeBuilder` for the resolver trie.

use std::cmp::Ordering;

use linked_hash_map::LinkedHashMap;
use log::trace;

use crate::error::{ConflictError, Result};
use crate::pattern::Pattern;
use crate::resolver::segment::{is_plain, SegmentKey, Shape};
use crate::resolver::ConflictPolicy;

/// A value registered under a dispatch key, stored at the node its pattern ends on.
#[derive(Debug)]
pub struct Leaf<T> {
    dispatch_key: String,
    value: T,
    parameter_names: Vec<String>,
    pattern: Pattern,
    shape: Shape,
    plain: bool,
    registration: usize,
}

impl<T> Leaf<T> {
    pub(crate) fn new(dispatch_key: &str, value: T, pattern: Pattern, registration: usize) -> Self {
        let parameter_names = pattern
            .variable_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        let shape = Shape::of(&pattern);
        let plain = is_plain(&pattern);

        Leaf {
            dispatch_key: dispatch_key.to_owned(),
            value,
            parameter_names,
            pattern,
            shape,
            plain,
            registration,
        }
    }

    /// The dispatch key the value was registered under.
    pub fn dispatch_key(&self) -> &str {
        &self.dispatch_key
    }

    /// The registered value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Variable names collected along the insertion path, in order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// The compiled pattern this value was registered with.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// True if the leaf can be bound by segment position alone.
    pub(crate) fn is_plain(&self) -> bool {
        self.plain
    }

    /// Position of this registration among all `add` calls on the builder.
    pub(crate) fn registration(&self) -> usize {
        self.registration
    }
}

/// A frozen member of the resolver trie.
///
/// Children are kept in `SegmentKey` order, so literal edges are always tried before the
/// shared `Param` edge, which is tried before `CatchAll`.
#[derive(Debug)]
pub struct Node<T> {
    key: SegmentKey,
    leaves: LinkedHashMap<String, Vec<Leaf<T>>>,
    children: Vec<Node<T>>,
}

/// Candidate leaf node reached by a walk, along with how it was reached.
pub(crate) struct Visit<'n, T> {
    pub(crate) node: &'n Node<T>,
    /// Indexes of the path segments consumed by `Param` edges, in order.
    pub(crate) params: Vec<usize>,
    /// True when the node was reached without consuming the path in the usual way (a catch-all
    /// or an empty trailing segment); its leaves must be checked with the full matcher.
    pub(crate) verify: bool,
}

impl<T> Node<T> {
    /// The edge leading to this node.
    pub fn key(&self) -> &SegmentKey {
        &self.key
    }

    /// Leaves registered under `dispatch_key`, in registration order.
    pub fn leaves(&self, dispatch_key: &str) -> &[Leaf<T>] {
        self.leaves
            .get(dispatch_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Child nodes in traversal order.
    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    /// True if at least one value is registered at this node.
    pub fn is_leaf(&self) -> bool {
        !self.leaves.is_empty()
    }

    /// Walks the sub-trie below this node depth first, reporting every node `segments` can end
    /// on. All branches are explored.
    pub(crate) fn traverse<'n, F>(
        &'n self,
        segments: &[&str],
        trailing_separator: bool,
        case_sensitive: bool,
        visit: &mut F,
    ) where
        F: FnMut(Visit<'n, T>),
    {
        trace!(" starting trie traversal over {} segments", segments.len());
        self.inner_traverse(segments, 0, &mut vec![], trailing_separator, case_sensitive, visit);
    }

    fn inner_traverse<'n, F>(
        &'n self,
        segments: &[&str],
        pos: usize,
        params: &mut Vec<usize>,
        trailing_separator: bool,
        case_sensitive: bool,
        visit: &mut F,
    ) where
        F: FnMut(Visit<'n, T>),
    {
        if pos == segments.len() {
            if self.is_leaf() {
                trace!(" reached node {:?} with the path exhausted", self.key);
                visit(Visit {
                    node: self,
                    params: params.clone(),
                    verify: false,
                });
            }

            for child in &self.children {
                let empty_segment = child.key == SegmentKey::Param && trailing_separator;
                if (child.key == SegmentKey::CatchAll || empty_segment) && child.is_leaf() {
                    trace!(" reached node {:?} on an empty remainder", child.key);
                    visit(Visit {
                        node: child,
                        params: params.clone(),
                        verify: true,
                    });
                }
            }
            return;
        }

        for child in &self.children {
            match child.key {
                SegmentKey::CatchAll => {
                    if child.is_leaf() {
                        trace!(" catch-all consumed segments {}..", pos);
                        visit(Visit {
                            node: child,
                            params: params.clone(),
                            verify: true,
                        });
                    }
                }
                SegmentKey::Param => {
                    params.push(pos);
                    child.inner_traverse(
                        segments,
                        pos + 1,
                        params,
                        trailing_separator,
                        case_sensitive,
                        visit,
                    );
                    params.pop();
                }
                SegmentKey::Literal(_) => {
                    if child.key.is_match(segments[pos], case_sensitive) {
                        child.inner_traverse(
                            segments,
                            pos + 1,
                            params,
                            trailing_separator,
                            case_sensitive,
                            visit,
                        );
                    }
                }
            }
        }
    }
}

/// Constructs a `Node` which is sorted and immutable.
#[derive(Debug)]
pub struct NodeBuilder<T> {
    key: SegmentKey,
    leaves: LinkedHashMap<String, Vec<Leaf<T>>>,
    children: Vec<NodeBuilder<T>>,
}

impl<T> NodeBuilder<T> {
    /// Creates a new `NodeBuilder` reached through `key`.
    pub fn new(key: SegmentKey) -> Self {
        NodeBuilder {
            key,
            leaves: LinkedHashMap::new(),
            children: vec![],
        }
    }

    /// The edge leading to the node under construction.
    pub fn key(&self) -> &SegmentKey {
        &self.key
    }

    /// Borrow the child reached through `key`, creating it if absent.
    pub fn child_or_insert(&mut self, key: SegmentKey) -> &mut NodeBuilder<T> {
        match self.children.iter().position(|n| n.key == key) {
            Some(i) => &mut self.children[i],
            None => {
                trace!(" adding child {:?} to {:?}", key, self.key);
                self.children.push(NodeBuilder::new(key));
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }

    /// Stores `leaf` under its dispatch key, applying `policy` if a leaf of the same shape is
    /// already present.
    pub(crate) fn add_leaf(&mut self, leaf: Leaf<T>, policy: ConflictPolicy) -> Result<()> {
        let existing = match self.leaves.get_mut(leaf.dispatch_key()) {
            Some(existing) => existing,
            None => {
                trace!(" adding `{} {}`", leaf.dispatch_key, leaf.pattern.source());
                self.leaves.insert(leaf.dispatch_key.clone(), vec![leaf]);
                return Ok(());
            }
        };

        if let Some(clash) = existing.iter().find(|l| l.shape == leaf.shape) {
            if policy == ConflictPolicy::Strict {
                return Err(ConflictError {
                    dispatch_key: leaf.dispatch_key,
                    pattern: leaf.pattern.source().to_owned(),
                    existing: clash.pattern.source().to_owned(),
                }
                .into());
            }
        }

        if policy == ConflictPolicy::Lax {
            if let Some(same) = existing
                .iter_mut()
                .find(|l| l.pattern.source() == leaf.pattern.source())
            {
                trace!(
                    " replacing value of `{} {}`",
                    same.dispatch_key,
                    same.pattern.source()
                );
                same.value = leaf.value;
                return Ok(());
            }
        }

        trace!(" adding `{} {}`", leaf.dispatch_key, leaf.pattern.source());
        existing.push(leaf);
        Ok(())
    }

    /// Finalizes and sorts all internal data, including all children.
    pub fn finalize(mut self) -> Node<T> {
        self.children.sort();

        let mut children = self
            .children
            .drain(..)
            .map(NodeBuilder::finalize)
            .collect::<Vec<Node<T>>>();
        children.shrink_to_fit();

        for (_, leaves) in self.leaves.iter_mut() {
            leaves.shrink_to_fit();
        }

        Node {
            key: self.key,
            leaves: self.leaves,
            children,
        }
    }
}

impl<T> Ord for NodeBuilder<T> {
    fn cmp(&self, other: &NodeBuilder<T>) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<T> PartialOrd for NodeBuilder<T> {
    fn partial_cmp(&self, other: &NodeBuilder<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for NodeBuilder<T> {
    fn eq(&self, other: &NodeBuilder<T>) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for NodeBuilder<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pattern::compile;

    fn leaf(dispatch_key: &str, text: &str, value: u32) -> Leaf<u32> {
        Leaf::new(dispatch_key, value, compile(text, true).unwrap(), value as usize)
    }

    fn visits<'n>(
        root: &'n Node<u32>,
        segments: &[&str],
        trailing: bool,
    ) -> Vec<(&'n SegmentKey, Vec<usize>, bool)> {
        let mut out = vec![];
        root.traverse(segments, trailing, true, &mut |v: Visit<'n, u32>| {
            out.push((v.node.key(), v.params, v.verify))
        });
        out
    }

    #[test]
    fn finalize_sorts_children() {
        let mut root: NodeBuilder<u32> = NodeBuilder::new(SegmentKey::Literal(String::new()));
        root.child_or_insert(SegmentKey::CatchAll);
        root.child_or_insert(SegmentKey::Param);
        root.child_or_insert(SegmentKey::Literal("b".to_owned()));
        root.child_or_insert(SegmentKey::Literal("a".to_owned()));
        root.child_or_insert(SegmentKey::Param);
        assert_eq!(root.children.len(), 4);

        let root = root.finalize();
        let keys: Vec<&SegmentKey> = root.children().iter().map(Node::key).collect();
        assert_eq!(
            keys,
            vec![
                &SegmentKey::Literal("a".to_owned()),
                &SegmentKey::Literal("b".to_owned()),
                &SegmentKey::Param,
                &SegmentKey::CatchAll,
            ]
        );
    }

    #[test]
    fn traversal_explores_every_branch() {
        let mut root = NodeBuilder::new(SegmentKey::Literal(String::new()));
        {
            let a = root.child_or_insert(SegmentKey::Literal("a".to_owned()));
            a.child_or_insert(SegmentKey::Literal("b".to_owned()))
                .add_leaf(leaf("GET", "/a/b", 1), ConflictPolicy::Strict)
                .unwrap();
            a.child_or_insert(SegmentKey::Param)
                .add_leaf(leaf("GET", "/a/{x}", 2), ConflictPolicy::Strict)
                .unwrap();
            a.child_or_insert(SegmentKey::CatchAll)
                .add_leaf(leaf("GET", "/a/**", 3), ConflictPolicy::Strict)
                .unwrap();
        }
        let root = root.finalize();

        let found = visits(&root, &["a", "b"], false);
        assert_eq!(
            found,
            vec![
                (&SegmentKey::Literal("b".to_owned()), vec![], false),
                (&SegmentKey::Param, vec![1], false),
                (&SegmentKey::CatchAll, vec![], true),
            ]
        );

        let found = visits(&root, &["a"], false);
        assert_eq!(found, vec![(&SegmentKey::CatchAll, vec![], true)]);

        let found = visits(&root, &["a"], true);
        assert_eq!(
            found,
            vec![
                (&SegmentKey::Param, vec![], true),
                (&SegmentKey::CatchAll, vec![], true),
            ]
        );

        assert!(visits(&root, &["b"], false).is_empty());
    }

    #[test]
    fn strict_leaves_reject_same_shape() {
        let mut node = NodeBuilder::new(SegmentKey::Param);
        node.add_leaf(leaf("GET", "/a/{x}", 1), ConflictPolicy::Strict)
            .unwrap();
        node.add_leaf(leaf("POST", "/a/{x}", 2), ConflictPolicy::Strict)
            .unwrap();
        node.add_leaf(leaf("GET", "/a/{x}/", 3), ConflictPolicy::Strict)
            .unwrap();

        match node.add_leaf(leaf("GET", "/a/{y}", 4), ConflictPolicy::Strict) {
            Err(Error::Conflict(e)) => {
                assert_eq!(e.existing, "/a/{x}");
                assert_eq!(e.pattern, "/a/{y}");
            }
            other => panic!("expected conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn lax_leaves_replace_or_coexist() {
        let mut node = NodeBuilder::new(SegmentKey::Param);
        node.add_leaf(leaf("GET", "/a/{x}", 1), ConflictPolicy::Lax)
            .unwrap();
        node.add_leaf(leaf("GET", "/a/{x}", 2), ConflictPolicy::Lax)
            .unwrap();
        node.add_leaf(leaf("GET", "/a/{y}", 3), ConflictPolicy::Lax)
            .unwrap();

        let node = node.finalize();
        let values: Vec<u32> = node.leaves("GET").iter().map(|l| *l.value()).collect();
        assert_eq!(values, vec![2, 3]);
        assert_eq!(node.leaves("GET")[0].registration(), 1);
        assert!(node.leaves("PUT").is_empty());
    }
}
