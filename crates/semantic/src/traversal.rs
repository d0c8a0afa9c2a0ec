// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Tree traversal
//!
//! Both walkers keep their work on an explicit stack, so a walk can stop
//! between any two steps without unwinding recursion.
//!
//! - [`PostOrder`] visits every descendant deepest-first, then the node.
//! - [`SmartWalk`] yields enter/exit events and lets a [`WalkPolicy`]
//!   decide the logical children of a node, the context each child runs
//!   in, and whether later siblings wait for the first one to finish.
//!
//! `SmartWalk` is driven by the caller: it handles each event (possibly
//! awaiting catalog I/O) and may update the policy's state between events.
//! A child context is computed only when the child is about to be entered,
//! so delayed siblings observe everything their left siblings produced.
//!
//! ```
//! use sqlmodel_semantic::traversal::{DefaultPolicy, SmartWalk, WalkEvent};
//! # use sqlmodel_semantic::QueryModel;
//! # use sqlmodel_syntax::{Dialect, SyntaxKind, SyntaxTreeBuilder, TextRange};
//! # let mut b = SyntaxTreeBuilder::new("x");
//! # b.start_node(SyntaxKind::Command);
//! # b.token(SyntaxKind::Text, TextRange::new(0, 1));
//! # b.finish_node();
//! # let model = QueryModel::build(std::sync::Arc::new(b.finish().unwrap()), Dialect::Generic).unwrap();
//! let tree = model.tree();
//! let mut walk = SmartWalk::new(tree, tree.root(), 0u32, DefaultPolicy, || false);
//! let mut entered = 0;
//! while let Some(event) = walk.next_event() {
//!     if let WalkEvent::Enter(_, _) = event {
//!         entered += 1;
//!     }
//! }
//! assert_eq!(entered, tree.len());
//! ```

use crate::node::{NodeId, NodeTree};

/// Deepest-first iterator over a subtree
pub struct PostOrder<'a> {
    tree: &'a NodeTree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrder<'a> {
    pub fn new(tree: &'a NodeTree, root: NodeId) -> Self {
        Self {
            tree,
            stack: vec![(root, false)],
        }
    }
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some((node, expanded)) = self.stack.pop() {
            if expanded {
                return Some(node);
            }
            self.stack.push((node, true));
            for &child in self.tree.children(node).iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Decisions a [`SmartWalk`] delegates to its owner
pub trait WalkPolicy<C: Clone> {
    /// Children to visit, in order; structural children by default
    fn logical_children(&self, tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
        tree.children(node).to_vec()
    }

    /// Visit the first child now and the rest only after its subtree is done
    fn delays_rest_of_children(&self, _tree: &NodeTree, _node: NodeId) -> bool {
        false
    }

    /// Context a child runs in
    fn child_context(&self, _tree: &NodeTree, _parent: NodeId, _child: NodeId, context: &C) -> C {
        context.clone()
    }
}

/// Policy visiting structural children with the parent's context
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl<C: Clone> WalkPolicy<C> for DefaultPolicy {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent<C> {
    Enter(NodeId, C),
    Exit(NodeId, C),
}

enum Frame<C> {
    Visit(NodeId, C),
    Expand(NodeId, C),
    Exit(NodeId, C),
    /// Delayed siblings: `children[next..]` of `parent`
    Rest {
        parent: NodeId,
        children: Vec<NodeId>,
        next: usize,
        context: C,
    },
}

/// Context-aware walk with caller-driven events
pub struct SmartWalk<'a, C, P, F> {
    tree: &'a NodeTree,
    stack: Vec<Frame<C>>,
    policy: P,
    is_canceled: F,
    canceled: bool,
}

impl<'a, C, P, F> SmartWalk<'a, C, P, F>
where
    C: Clone,
    P: WalkPolicy<C>,
    F: Fn() -> bool,
{
    pub fn new(tree: &'a NodeTree, root: NodeId, context: C, policy: P, is_canceled: F) -> Self {
        Self {
            tree,
            stack: vec![Frame::Visit(root, context)],
            policy,
            is_canceled,
            canceled: false,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Policy state may be updated between events
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    /// The walk stopped because cancellation was requested
    pub fn was_canceled(&self) -> bool {
        self.canceled
    }

    pub fn next_event(&mut self) -> Option<WalkEvent<C>> {
        loop {
            if (self.is_canceled)() {
                self.canceled = true;
                self.stack.clear();
                return None;
            }
            match self.stack.pop()? {
                Frame::Visit(node, context) => {
                    self.stack.push(Frame::Exit(node, context.clone()));
                    self.stack.push(Frame::Expand(node, context.clone()));
                    return Some(WalkEvent::Enter(node, context));
                }
                Frame::Expand(node, context) => {
                    let children = self.policy.logical_children(self.tree, node);
                    if children.is_empty() {
                        continue;
                    }
                    if self.policy.delays_rest_of_children(self.tree, node) {
                        self.stack.push(Frame::Rest {
                            parent: node,
                            children,
                            next: 0,
                            context,
                        });
                    } else {
                        for &child in children.iter().rev() {
                            let child_context =
                                self.policy.child_context(self.tree, node, child, &context);
                            self.stack.push(Frame::Visit(child, child_context));
                        }
                    }
                }
                Frame::Rest {
                    parent,
                    children,
                    next,
                    context,
                } => {
                    let child = children[next];
                    let child_context = self.policy.child_context(self.tree, parent, child, &context);
                    if next + 1 < children.len() {
                        self.stack.push(Frame::Rest {
                            parent,
                            children,
                            next: next + 1,
                            context,
                        });
                    }
                    self.stack.push(Frame::Visit(child, child_context));
                }
                Frame::Exit(node, context) => return Some(WalkEvent::Exit(node, context)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_syntax::{SyntaxKind, SyntaxNodeId, TextRange};
    use std::cell::Cell;
    use std::collections::HashMap;

    // root(0..30) -> a(0..10) -> a1(0..5)
    //             -> b(10..20)
    //             -> c(20..30)
    fn tree() -> (NodeTree, [NodeId; 4]) {
        let mut tree = NodeTree::new(SyntaxKind::Query, TextRange::new(0, 30), SyntaxNodeId(0));
        let root = tree.root();
        let a = tree
            .add_child(root, SyntaxKind::CteDefinition, TextRange::new(0, 10), SyntaxNodeId(1))
            .unwrap();
        let a1 = tree
            .add_child(a, SyntaxKind::Select, TextRange::new(0, 5), SyntaxNodeId(2))
            .unwrap();
        let b = tree
            .add_child(root, SyntaxKind::CteDefinition, TextRange::new(10, 20), SyntaxNodeId(3))
            .unwrap();
        let c = tree
            .add_child(root, SyntaxKind::Select, TextRange::new(20, 30), SyntaxNodeId(4))
            .unwrap();
        (tree, [a, a1, b, c])
    }

    #[test]
    fn test_post_order() {
        let (tree, [a, a1, b, c]) = tree();
        let order: Vec<_> = PostOrder::new(&tree, tree.root()).collect();
        assert_eq!(order, vec![a1, a, b, c, tree.root()]);
    }

    #[test]
    fn test_enter_exit_nesting() {
        let (tree, [a, a1, b, c]) = tree();
        let root = tree.root();
        let mut walk = SmartWalk::new(&tree, root, (), DefaultPolicy, || false);
        let mut events = Vec::new();
        while let Some(event) = walk.next_event() {
            events.push(event);
        }
        use WalkEvent::*;
        assert_eq!(
            events,
            vec![
                Enter(root, ()),
                Enter(a, ()),
                Enter(a1, ()),
                Exit(a1, ()),
                Exit(a, ()),
                Enter(b, ()),
                Exit(b, ()),
                Enter(c, ()),
                Exit(c, ()),
                Exit(root, ()),
            ]
        );
    }

    /// Each child sees the number of siblings that exited before it was entered
    #[derive(Default)]
    struct CountingPolicy {
        delay: bool,
        exited: usize,
    }

    impl WalkPolicy<usize> for CountingPolicy {
        fn delays_rest_of_children(&self, tree: &NodeTree, node: NodeId) -> bool {
            self.delay && node == tree.root()
        }

        fn child_context(&self, _: &NodeTree, _: NodeId, _: NodeId, _: &usize) -> usize {
            self.exited
        }
    }

    fn contexts(delay: bool) -> HashMap<NodeId, usize> {
        let (tree, _) = tree();
        let root = tree.root();
        let policy = CountingPolicy {
            delay,
            ..CountingPolicy::default()
        };
        let mut walk = SmartWalk::new(&tree, root, 0, policy, || false);
        let mut seen = HashMap::new();
        while let Some(event) = walk.next_event() {
            match event {
                WalkEvent::Enter(node, ctx) => {
                    seen.insert(node, ctx);
                }
                WalkEvent::Exit(node, _) => {
                    if tree.node(node).parent() == Some(root) {
                        walk.policy_mut().exited += 1;
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn test_delayed_children_see_left_siblings() {
        let (_, [a, _, b, c]) = tree();
        let seen = contexts(true);
        assert_eq!(seen[&a], 0);
        assert_eq!(seen[&b], 1);
        assert_eq!(seen[&c], 2);
    }

    #[test]
    fn test_eager_children_share_initial_state() {
        let (_, [a, _, b, c]) = tree();
        let seen = contexts(false);
        assert_eq!(seen[&a], 0);
        assert_eq!(seen[&b], 0);
        assert_eq!(seen[&c], 0);
    }

    #[test]
    fn test_cancellation_stops_walk() {
        let (tree, _) = tree();
        let steps = Cell::new(0);
        let mut walk = SmartWalk::new(&tree, tree.root(), (), DefaultPolicy, || {
            steps.set(steps.get() + 1);
            steps.get() > 3
        });
        let mut events = 0;
        while walk.next_event().is_some() {
            events += 1;
        }
        assert!(walk.was_canceled());
        assert!(events < 10);
    }
}
