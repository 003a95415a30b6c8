use crate::arena::{Entry, TypedArena};
use crate::red_black_tree::cursor::Cursor;
use crate::red_black_tree::node::{Color, Node};
use log::{debug, trace};
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::mem;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An ordered collection implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree that colors every node red or black.
/// The root is black, no red node has a red child, and every path from a node down to an absent
/// child crosses the same number of black nodes, which bounds the height of the tree by
/// `2 * log2(n + 1)`.
///
/// Nodes live in a `TypedArena` and link to their parent and children through arena handles. An
/// absent link is `Entry::NIL`, which is always treated as a black node without children.
///
/// Duplicate values are allowed. A value that compares greater than or equal to a node is placed
/// in its right subtree. When duplicates exist, which physical copy `remove` affects is
/// unspecified.
///
/// # Examples
///
/// ```
/// use ordered_tree::OrderedTree;
///
/// let mut tree = OrderedTree::new();
/// tree.insert(3);
/// tree.insert(1);
/// tree.insert(2);
///
/// assert_eq!(tree.len(), 3);
/// assert!(tree.contains(&2));
/// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&1, &2, &3]);
///
/// assert!(tree.remove(&2));
/// assert!(!tree.remove(&2));
/// ```
#[derive(Clone)]
pub struct OrderedTree<T> {
    pub(super) nodes: TypedArena<Node<T>>,
    pub(super) root: Entry,
}

impl<T> OrderedTree<T> {
    /// Constructs a new, empty `OrderedTree<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<u32> = OrderedTree::new();
    /// ```
    pub fn new() -> Self {
        OrderedTree {
            nodes: TypedArena::new(),
            root: Entry::NIL,
        }
    }

    /// Constructs a new, empty `OrderedTree<T>` that can hold `capacity` values before its node
    /// storage has to grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<u32> = OrderedTree::with_capacity(1024);
    /// assert!(tree.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedTree {
            nodes: TypedArena::with_capacity(capacity),
            root: Entry::NIL,
        }
    }

    fn color(&self, entry: Entry) -> Color {
        self.nodes.get(entry).map_or(Color::Black, |node| node.color)
    }

    fn set_color(&mut self, entry: Entry, color: Color) {
        if let Some(node) = self.nodes.get_mut(entry) {
            node.color = color;
        }
    }

    fn parent(&self, entry: Entry) -> Entry {
        self.nodes.get(entry).map_or(Entry::NIL, |node| node.parent)
    }

    fn set_parent(&mut self, entry: Entry, parent: Entry) {
        if let Some(node) = self.nodes.get_mut(entry) {
            node.parent = parent;
        }
    }

    fn child(&self, entry: Entry, side: Side) -> Entry {
        self.nodes.get(entry).map_or(Entry::NIL, |node| match side {
            Side::Left => node.left,
            Side::Right => node.right,
        })
    }

    fn set_child(&mut self, entry: Entry, side: Side, child: Entry) {
        let node = &mut self.nodes[entry];
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    // Side of `entry` under its parent. Only meaningful for a non-root node.
    fn side_of(&self, entry: Entry) -> Side {
        if self.child(self.parent(entry), Side::Left) == entry {
            Side::Left
        } else {
            Side::Right
        }
    }

    // Puts `new` where `old` used to hang under `parent`, or makes it the root.
    fn replace_child(&mut self, parent: Entry, old: Entry, new: Entry) {
        if parent.is_nil() {
            self.root = new;
        } else if self.child(parent, Side::Left) == old {
            self.set_child(parent, Side::Left, new);
        } else {
            self.set_child(parent, Side::Right, new);
        }
        self.set_parent(new, parent);
    }

    // Rotates the subtree rooted at `entry` towards `side`: the child on the opposite side takes
    // the place of `entry`, which becomes its child on `side`. Values and colors are untouched.
    fn rotate(&mut self, entry: Entry, side: Side) {
        trace!("Rotating {:?} around {:?}.", side, entry);
        let pivot = self.child(entry, side.opposite());
        let inner = self.child(pivot, side);

        self.set_child(entry, side.opposite(), inner);
        self.set_parent(inner, entry);

        let parent = self.parent(entry);
        self.replace_child(parent, entry, pivot);

        self.set_child(pivot, side, entry);
        self.set_parent(entry, pivot);
    }

    pub(super) fn minimum(&self, mut entry: Entry) -> Entry {
        loop {
            let left = self.child(entry, Side::Left);
            if left.is_nil() {
                return entry;
            }
            entry = left;
        }
    }

    fn maximum(&self, mut entry: Entry) -> Entry {
        loop {
            let right = self.child(entry, Side::Right);
            if right.is_nil() {
                return entry;
            }
            entry = right;
        }
    }

    // In-order successor of `entry`, or `Entry::NIL` after the maximum.
    pub(super) fn successor(&self, mut entry: Entry) -> Entry {
        let right = self.child(entry, Side::Right);
        if !right.is_nil() {
            return self.minimum(right);
        }

        let mut parent = self.parent(entry);
        while !parent.is_nil() && self.child(parent, Side::Right) == entry {
            entry = parent;
            parent = self.parent(entry);
        }
        parent
    }

    fn find<V>(&self, key: &V) -> Entry
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(node) = self.nodes.get(curr) {
            curr = match key.cmp(node.value.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return curr,
            };
        }
        Entry::NIL
    }

    fn insert_fixup(&mut self, mut entry: Entry) {
        while self.color(self.parent(entry)) == Color::Red {
            // A red parent is never the root, so the grandparent exists.
            let parent = self.parent(entry);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.color(uncle) == Color::Red {
                trace!("Insert fixup at {:?}: recoloring red uncle.", entry);
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                entry = grandparent;
                continue;
            }

            if entry == self.child(parent, side.opposite()) {
                trace!("Insert fixup at {:?}: straightening inner child.", entry);
                entry = parent;
                self.rotate(entry, side);
            }

            trace!("Insert fixup at {:?}: rotating grandparent.", entry);
            let parent = self.parent(entry);
            let grandparent = self.parent(parent);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    // `entry` may be `Entry::NIL`, so its parent is passed in explicitly.
    fn remove_fixup(&mut self, mut entry: Entry, mut parent: Entry) {
        while entry != self.root && self.color(entry) == Color::Black {
            let side = if self.child(parent, Side::Left) == entry {
                Side::Left
            } else {
                Side::Right
            };
            let mut sibling = self.child(parent, side.opposite());

            if self.color(sibling) == Color::Red {
                trace!("Remove fixup under {:?}: rotating red sibling.", parent);
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());
            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                trace!("Remove fixup under {:?}: recoloring sibling.", parent);
                self.set_color(sibling, Color::Red);
                entry = parent;
                parent = self.parent(entry);
                continue;
            }

            if self.color(far) == Color::Black {
                trace!("Remove fixup under {:?}: straightening sibling.", parent);
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.child(parent, side.opposite());
            }

            trace!("Remove fixup under {:?}: rotating parent.", parent);
            let parent_color = self.color(parent);
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far = self.child(sibling, side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            entry = self.root;
            parent = Entry::NIL;
        }

        self.set_color(entry, Color::Black);
    }

    // Removes the value held by `entry` and returns it. A node with two children keeps its place
    // and receives the value of its in-order successor, which is spliced out instead.
    pub(super) fn delete_entry(&mut self, entry: Entry) -> T {
        let spliced = if self.nodes[entry].has_both_children() {
            self.minimum(self.child(entry, Side::Right))
        } else {
            entry
        };
        let promoted = match self.child(spliced, Side::Left) {
            left if !left.is_nil() => left,
            _ => self.child(spliced, Side::Right),
        };
        let parent = self.parent(spliced);
        self.replace_child(parent, spliced, promoted);

        let Node { value, color, .. } = self.nodes.free(spliced);
        let removed = if spliced == entry {
            value
        } else {
            mem::replace(&mut self.nodes[entry].value, value)
        };

        if color == Color::Black {
            self.remove_fixup(promoted, parent);
        }
        removed
    }

    /// Inserts a value into the tree. Duplicates are kept: inserting a value that is already
    /// present adds another copy.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T)
    where
        T: Ord,
    {
        let mut parent = Entry::NIL;
        let mut curr = self.root;
        let mut side = Side::Left;
        while let Some(node) = self.nodes.get(curr) {
            parent = curr;
            if value < node.value {
                side = Side::Left;
                curr = node.left;
            } else {
                side = Side::Right;
                curr = node.right;
            }
        }

        let entry = self.nodes.allocate(Node::new(value, parent));
        if parent.is_nil() {
            self.root = entry;
        } else {
            self.set_child(parent, side, entry);
        }
        self.insert_fixup(entry);
    }

    /// Removes one copy of a value from the tree. Returns `true` if a value comparing equal was
    /// found and removed, and `false` if the tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let entry = self.find(key);
        if entry.is_nil() {
            return false;
        }
        self.delete_entry(entry);
        true
    }

    /// Checks if a value exists in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(String::from("b"));
    /// assert!(!tree.contains("a"));
    /// assert!(tree.contains("b"));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        !self.find(key).is_nil()
    }

    /// Returns the number of values in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<u32> = OrderedTree::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clears the tree, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        debug!("Clearing tree with {} values.", self.len());
        self.nodes.clear();
        self.root = Entry::NIL;
    }

    /// Returns the minimum value of the tree. Returns `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(3);
    /// assert_eq!(tree.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.nodes.get(self.minimum(self.root)).map(|node| &node.value)
    }

    /// Returns the maximum value of the tree. Returns `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(3);
    /// assert_eq!(tree.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.nodes.get(self.maximum(self.root)).map(|node| &node.value)
    }

    fn subtree_height(&self, entry: Entry) -> usize {
        match self.nodes.get(entry) {
            None => 0,
            Some(node) => {
                1 + cmp::max(self.subtree_height(node.left), self.subtree_height(node.right))
            },
        }
    }

    /// Returns the number of nodes on the longest path from the root down to a leaf. An empty
    /// tree has height zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// for value in 0..1000 {
    ///     tree.insert(value);
    /// }
    /// assert!(tree.height() <= 2 * 10);
    /// ```
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Renders the tree level by level for debugging. Every node is written as `(value,color)`
    /// where color is `B` or `R`, and every absent child of a rendered node as `(nil)`. The exact
    /// format is not guaranteed to be stable.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    /// assert_eq!(tree.dump(), "(1,B)\n(nil)(2,R)\n");
    /// ```
    pub fn dump(&self) -> String
    where
        T: fmt::Display,
    {
        let mut ret = String::new();
        let mut level = vec![self.root];
        loop {
            let mut next_level = Vec::with_capacity(level.len() * 2);
            let mut has_children = false;
            for &entry in &level {
                match self.nodes.get(entry) {
                    Some(node) => {
                        ret.push_str(&format!("({},{})", node.value, node.color.abbreviation()));
                        has_children |= !node.is_leaf();
                        next_level.push(node.left);
                        next_level.push(node.right);
                    },
                    None => ret.push_str("(nil)"),
                }
            }
            ret.push('\n');

            if !has_children {
                return ret;
            }
            level = next_level;
        }
    }

    /// Returns an iterator over the tree. The iterator lazily yields values in ascending order
    /// and every call starts again from the minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(3);
    /// tree.insert(1);
    ///
    /// let mut iterator = tree.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            next: self.minimum(self.root),
            remaining: self.len(),
        }
    }

    /// Returns a cursor over the tree that can remove the value it last produced without losing
    /// its place.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    /// tree.insert(3);
    ///
    /// let mut cursor = tree.cursor();
    /// assert_eq!(cursor.advance(), Ok(&1));
    /// assert_eq!(cursor.advance(), Ok(&2));
    /// assert_eq!(cursor.remove_current(), Ok(2));
    /// assert_eq!(cursor.advance(), Ok(&3));
    ///
    /// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&1, &3]);
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        Cursor::new(self)
    }
}

impl<'a, T> IntoIterator for &'a OrderedTree<T>
where
    T: 'a,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `OrderedTree<T>`.
///
/// This iterator traverses the values of the tree in-order and yields immutable references.
pub struct Iter<'a, T> {
    tree: &'a OrderedTree<T>,
    next: Entry,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let node = tree.nodes.get(self.next)?;
        self.next = tree.successor(self.next);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> where T: 'a {}

impl<T> Default for OrderedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OrderedTree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// Returns the black height of the subtree, counting nil.
#[cfg(test)]
fn check_subtree<T>(tree: &OrderedTree<T>, entry: Entry) -> usize {
    let node = match tree.nodes.get(entry) {
        None => return 1,
        Some(node) => node,
    };
    if node.color == Color::Red {
        assert_eq!(tree.color(node.left), Color::Black);
        assert_eq!(tree.color(node.right), Color::Black);
    }
    for &child in &[node.left, node.right] {
        if !child.is_nil() {
            assert_eq!(tree.parent(child), entry);
        }
    }

    let left_height = check_subtree(tree, node.left);
    let right_height = check_subtree(tree, node.right);
    assert_eq!(left_height, right_height);
    left_height + if node.color == Color::Black { 1 } else { 0 }
}

// Panics unless every red black invariant holds and values are in order.
#[cfg(test)]
pub(super) fn check_invariants<T>(tree: &OrderedTree<T>)
where
    T: Ord,
{
    assert_eq!(tree.color(tree.root), Color::Black);
    assert!(tree.parent(tree.root).is_nil());
    check_subtree(tree, tree.root);

    let values = tree.iter().collect::<Vec<&T>>();
    assert_eq!(values.len(), tree.len());
    assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));

    let bound = 2.0 * ((tree.len() + 1) as f64).log2();
    assert!(tree.height() as f64 <= bound);
}
