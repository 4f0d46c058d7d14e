use std::cmp::{Ordering, max};
use std::sync::Arc;

use crate::data_structures::OrderedIndex;
use crate::error::InvariantError;

// =============================================================================
// AVL TREE INVARIANTS & REBALANCING
// =============================================================================
//
// INVARIANTS (hold after every insert returns):
// 1. In-order traversal is non-decreasing. Equal keys route right on insert.
// 2. node.height == 1 + max(height(left), height(right)), empty subtree = 0
// 3. |height(left) - height(right)| <= 1 at every node
//
// Insert descends recursively and rebalances on the unwind path. At most one
// of the four cases fires per insert: once a subtree is rotated its height is
// back to what it was before the insert, so no ancestor sees a change.
//
// Left-Left (key routed left at N and left at L) - rotate right at N:
//
//            N                 L
//           / \               / \
//          L   C    ───►     A   N
//         / \                   / \
//        A   B                 B   C
//
// Left-Right (key routed left at N and right at L) - rotate left at L,
// then right at N:
//
//            N                 N                 B
//           / \               / \              /   \
//          L   C    ───►     B   C   ───►     L     N
//         / \               /                / \   / \
//        A   B             L                A  b1 b2  C
//           / \           / \
//          b1 b2         A   b1  (b2 moves under N)
//
// Right-Right and Right-Left mirror these.
//
// OWNERSHIP:
// Children are `Arc` handles and every mutation goes through `Arc::make_mut`.
// A tree with a single owner never shares a node, so make_mut hands back the
// node itself and rotations only move handles. When a tree value has been
// cloned (ConcurrentAvlTree publishes versions this way) make_mut copies the
// nodes on the insert path and leaves the shared version untouched.
//
// =============================================================================

type Link<K> = Option<Arc<AvlNode<K>>>;

#[derive(Clone)]
struct AvlNode<K> {
    key: K,
    height: usize,
    left: Link<K>,
    right: Link<K>,
}

impl<K> AvlNode<K> {
    fn leaf(key: K) -> Self {
        AvlNode {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    #[inline]
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

#[inline]
fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

/// Ties go right, both on descent and when picking a rotation case.
#[inline]
fn routes_left<K: Ord>(key: &K, node_key: &K) -> bool {
    key < node_key
}

// ============================================================================
// Rotations
// ============================================================================

/// Rotate right at `root`: its left child becomes the subtree root and the
/// child's right subtree is re-parented under the old root.
fn rotate_right<K: Clone>(mut root: Arc<AvlNode<K>>) -> Arc<AvlNode<K>> {
    let Some(mut pivot) = Arc::make_mut(&mut root).left.take() else {
        return root;
    };

    let node = Arc::make_mut(&mut root);
    node.left = Arc::make_mut(&mut pivot).right.take();
    node.update_height();

    let pivot_node = Arc::make_mut(&mut pivot);
    pivot_node.right = Some(root);
    pivot_node.update_height();
    pivot
}

/// Rotate left at `root`, mirror of [`rotate_right`].
fn rotate_left<K: Clone>(mut root: Arc<AvlNode<K>>) -> Arc<AvlNode<K>> {
    let Some(mut pivot) = Arc::make_mut(&mut root).right.take() else {
        return root;
    };

    let node = Arc::make_mut(&mut root);
    node.right = Arc::make_mut(&mut pivot).left.take();
    node.update_height();

    let pivot_node = Arc::make_mut(&mut pivot);
    pivot_node.left = Some(root);
    pivot_node.update_height();
    pivot
}

/// Insert `key` below `link` and return the (possibly new) subtree root.
///
fn insert_into<K: Ord + Clone>(link: Link<K>, key: K) -> Arc<AvlNode<K>> {
    let Some(mut root) = link else {
        return Arc::new(AvlNode::leaf(key));
    };

    let node = Arc::make_mut(&mut root);

    if routes_left(&key, &node.key) {
        // The case is picked from the child the key passes through. If that
        // child gets rotated its height does not grow and no case fires here.
        let outer = node
            .left
            .as_ref()
            .is_none_or(|left| routes_left(&key, &left.key));

        node.left = Some(insert_into(node.left.take(), key));
        node.update_height();

        if node.balance_factor() > 1 {
            if !outer {
                // Left-Right
                node.left = node.left.take().map(rotate_left);
            }
            // Left-Left, or the second half of Left-Right
            return rotate_right(root);
        }
    } else {
        let outer = node
            .right
            .as_ref()
            .is_none_or(|right| !routes_left(&key, &right.key));

        node.right = Some(insert_into(node.right.take(), key));
        node.update_height();

        if node.balance_factor() < -1 {
            if !outer {
                // Right-Left
                node.right = node.right.take().map(rotate_right);
            }
            // Right-Right, or the second half of Right-Left
            return rotate_left(root);
        }
    }

    root
}

/// Returns the checked height of the subtree.
fn check_subtree<K>(link: &Link<K>, depth: usize) -> Result<usize, InvariantError> {
    let Some(node) = link else {
        return Ok(0);
    };

    let left = check_subtree(&node.left, depth + 1)?;
    let right = check_subtree(&node.right, depth + 1)?;

    if left.abs_diff(right) > 1 {
        return Err(InvariantError::Unbalanced { depth, left, right });
    }

    let actual = 1 + max(left, right);
    if node.height != actual {
        return Err(InvariantError::StaleHeight {
            depth,
            cached: node.height,
            actual,
        });
    }

    Ok(actual)
}

// ============================================================================
// AvlTree
// ============================================================================

/// A height-balanced binary search tree.
///
/// Equal keys are not rejected: they route to the right subtree and are
/// stored as separate nodes, so `insert` always adds a node.
///
/// # Example
///
/// ```
/// use ordex_core::AvlTree;
///
/// let mut tree = AvlTree::new();
/// for key in [30, 20, 10] {
///     tree.insert(key);
/// }
///
/// assert_eq!(tree.root_key(), Some(&20));
/// assert!(tree.search(&10));
/// assert!(!tree.search(&15));
/// ```
///
pub struct AvlTree<K> {
    root: Link<K>,
    len: usize,
}

impl<K> AvlTree<K> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        AvlTree { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn root_key(&self) -> Option<&K> {
        self.root.as_ref().map(|node| &node.key)
    }

    /// In-order iterator over the keys.
    pub fn iter(&self) -> AvlIter<'_, K> {
        AvlIter::new(&self.root)
    }
}

impl<K: Ord> AvlTree<K> {
    /// Check whether `key` is present.
    ///
    /// Iterative descent, `O(height)`.
    ///
    pub fn search(&self, key: &K) -> bool {
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return true,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }

        false
    }

    pub fn validate(&self) -> Result<(), InvariantError> {
        check_subtree(&self.root, 0)?;

        let mut counted = 0;
        let mut previous: Option<&K> = None;
        for key in self.iter() {
            if previous.is_some_and(|prev| key < prev) {
                return Err(InvariantError::Unordered { position: counted });
            }
            previous = Some(key);
            counted += 1;
        }

        if counted != self.len {
            return Err(InvariantError::LengthMismatch {
                reported: self.len,
                counted,
            });
        }

        Ok(())
    }
}

impl<K: Ord + Clone> AvlTree<K> {
    /// Insert a key, rebalancing on the way back up.
    ///
    pub fn insert(&mut self, key: K) {
        self.root = Some(insert_into(self.root.take(), key));
        self.len += 1;
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.iter().cloned().collect()
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

// Cloning shares every node. The clone and the original diverge on the
// next insert into either of them, through make_mut path copying.
impl<K> Clone for AvlTree<K> {
    fn clone(&self) -> Self {
        AvlTree {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K: Ord + Clone> OrderedIndex<K> for AvlTree<K> {
    fn insert(&mut self, key: K) -> bool {
        AvlTree::insert(self, key);
        true
    }

    fn search(&self, key: &K) -> bool {
        AvlTree::search(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn to_vec(&self) -> Vec<K> {
        AvlTree::to_vec(self)
    }

    fn validate(&self) -> Result<(), InvariantError> {
        AvlTree::validate(self)
    }
}

impl<'a, K> IntoIterator for &'a AvlTree<K> {
    type Item = &'a K;
    type IntoIter = AvlIter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// AvlIter - in-order traversal with an explicit stack
// ============================================================================

pub struct AvlIter<'a, K> {
    stack: Vec<&'a AvlNode<K>>,
}

impl<'a, K> AvlIter<'a, K> {
    fn new(root: &'a Link<K>) -> Self {
        let mut iter = AvlIter { stack: Vec::new() };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a AvlNode<K>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for AvlIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.key)
    }
}
