use crate::arena::Entry;
use crate::red_black_tree::tree::OrderedTree;
use crate::red_black_tree::{Error, Result};

/// A cursor over an `OrderedTree<T>` that can remove the value it last produced.
///
/// The cursor starts before the minimum. Each call to `advance` produces the next value in
/// ascending order, and `remove_current` removes the value most recently produced while keeping
/// the cursor positioned so that the following `advance` produces the value that came after it.
///
/// The cursor mutably borrows the tree, so no other access to the tree can interleave with it.
///
/// # Examples
///
/// ```
/// use ordered_tree::OrderedTree;
/// use ordered_tree::red_black_tree::Error;
///
/// let mut tree = OrderedTree::new();
/// for value in 1..=6 {
///     tree.insert(value);
/// }
///
/// let mut cursor = tree.cursor();
/// while let Ok(&value) = cursor.advance() {
///     if value % 2 == 0 {
///         cursor.remove_current().unwrap();
///     }
/// }
/// assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
///
/// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&1, &3, &5]);
/// ```
pub struct Cursor<'a, T> {
    tree: &'a mut OrderedTree<T>,
    // `None` before the first advance. After a removal this is the node that holds the value
    // following the removed one.
    current: Option<Entry>,
    removed: bool,
}

impl<'a, T> Cursor<'a, T> {
    pub(super) fn new(tree: &'a mut OrderedTree<T>) -> Self {
        Cursor {
            tree,
            current: None,
            removed: false,
        }
    }

    fn next_entry(&self) -> Entry {
        match self.current {
            None => self.tree.minimum(self.tree.root),
            Some(entry) if self.removed => entry,
            Some(entry) => self.tree.successor(entry),
        }
    }

    /// Moves the cursor to the next value in ascending order and returns it. Returns
    /// `Error::IterationExhausted` once every value has been produced, including when the tree
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    /// use ordered_tree::red_black_tree::Error;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    ///
    /// let mut cursor = tree.cursor();
    /// assert_eq!(cursor.advance(), Ok(&1));
    /// assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
    /// ```
    pub fn advance(&mut self) -> Result<&T> {
        let next = self.next_entry();
        self.current = Some(next);
        self.removed = false;
        self.tree
            .nodes
            .get(next)
            .map(|node| &node.value)
            .ok_or(Error::IterationExhausted)
    }

    /// Removes the value most recently produced by `advance` and returns it. Returns
    /// `Error::InvalidIteratorState` if nothing has been produced yet, if that value was already
    /// removed, or if the cursor is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    /// use ordered_tree::red_black_tree::Error;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    ///
    /// let mut cursor = tree.cursor();
    /// assert_eq!(cursor.remove_current(), Err(Error::InvalidIteratorState));
    /// assert_eq!(cursor.advance(), Ok(&1));
    /// assert_eq!(cursor.remove_current(), Ok(1));
    /// assert_eq!(cursor.remove_current(), Err(Error::InvalidIteratorState));
    /// assert_eq!(cursor.advance(), Ok(&2));
    /// ```
    pub fn remove_current(&mut self) -> Result<T> {
        let entry = match self.current {
            Some(entry) if !self.removed && !entry.is_nil() => entry,
            _ => return Err(Error::InvalidIteratorState),
        };

        // A node with two children receives its successor's value and stays in place, otherwise
        // the node is spliced out and its successor is found before the tree is restructured.
        let next = if self.tree.nodes[entry].has_both_children() {
            entry
        } else {
            self.tree.successor(entry)
        };
        let value = self.tree.delete_entry(entry);

        self.current = Some(next);
        self.removed = true;
        Ok(value)
    }

    /// Returns `true` if the next call to `advance` would produce a value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    ///
    /// let mut cursor = tree.cursor();
    /// assert!(cursor.has_next());
    /// cursor.advance().unwrap();
    /// assert!(!cursor.has_next());
    /// ```
    pub fn has_next(&self) -> bool {
        !self.next_entry().is_nil()
    }

    /// Moves the cursor back before the minimum value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    ///
    /// let mut cursor = tree.cursor();
    /// assert_eq!(cursor.advance(), Ok(&1));
    /// assert_eq!(cursor.advance(), Ok(&2));
    /// cursor.reset();
    /// assert_eq!(cursor.advance(), Ok(&1));
    /// ```
    pub fn reset(&mut self) {
        self.current = None;
        self.removed = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::red_black_tree::tree::check_invariants;
    use crate::red_black_tree::{Error, OrderedTree};
    use rand::{Rng, SeedableRng, XorShiftRng};

    fn tree_of(values: &[u32]) -> OrderedTree<u32> {
        let mut tree = OrderedTree::new();
        for &value in values {
            tree.insert(value);
        }
        tree
    }

    #[test]
    fn test_advance_empty() {
        let mut tree: OrderedTree<u32> = OrderedTree::new();
        let mut cursor = tree.cursor();
        assert!(!cursor.has_next());
        assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
        assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
    }

    #[test]
    fn test_remove_before_advance() {
        let mut tree = tree_of(&[1]);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.remove_current(), Err(Error::InvalidIteratorState));
    }

    #[test]
    fn test_remove_after_exhausted() {
        let mut tree = tree_of(&[1]);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.advance(), Ok(&1));
        assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
        assert_eq!(cursor.remove_current(), Err(Error::InvalidIteratorState));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_middle() {
        let mut tree = tree_of(&[1, 2, 3]);
        {
            let mut cursor = tree.cursor();
            assert_eq!(cursor.advance(), Ok(&1));
            assert_eq!(cursor.advance(), Ok(&2));
            assert_eq!(cursor.remove_current(), Ok(2));
            check_invariants(&*cursor.tree);
            assert!(cursor.has_next());
            assert_eq!(cursor.advance(), Ok(&3));
            assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
        }
        assert_eq!(tree.iter().cloned().collect::<Vec<u32>>(), vec![1, 3]);
    }

    #[test]
    fn test_remove_last_value() {
        let mut tree = tree_of(&[1, 2, 3]);
        let mut cursor = tree.cursor();
        cursor.advance().unwrap();
        cursor.advance().unwrap();
        assert_eq!(cursor.advance(), Ok(&3));
        assert_eq!(cursor.remove_current(), Ok(3));
        assert!(!cursor.has_next());
        assert_eq!(cursor.advance(), Err(Error::IterationExhausted));
    }

    #[test]
    fn test_remove_every_value() {
        let values = (0..100).map(|x| x * 7 % 100).collect::<Vec<u32>>();
        let mut tree = tree_of(&values);
        let mut produced = Vec::new();
        {
            let mut cursor = tree.cursor();
            while let Ok(&value) = cursor.advance() {
                produced.push(value);
                assert_eq!(cursor.remove_current(), Ok(value));
                check_invariants(&*cursor.tree);
            }
        }
        assert_eq!(produced, (0..100).collect::<Vec<u32>>());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut tree = tree_of(&[1, 2]);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.advance(), Ok(&1));
        assert_eq!(cursor.advance(), Ok(&2));
        cursor.reset();
        assert_eq!(cursor.advance(), Ok(&1));
    }

    #[test]
    fn test_random_removal_keeps_invariants() {
        let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
        let mut copied = 0;
        let mut spliced = 0;

        for _ in 0..300 {
            let len = rng.gen_range(1, 40);
            let values = (0..len)
                .map(|_| rng.gen_range(0, 20))
                .collect::<Vec<u32>>();
            let modulus = rng.gen_range(2, 5);
            let mut tree = tree_of(&values);

            let mut expected = values.clone();
            expected.sort();
            let mut produced = Vec::new();
            {
                let mut cursor = tree.cursor();
                while let Ok(&value) = cursor.advance() {
                    produced.push(value);
                    if value % modulus != 0 {
                        continue;
                    }

                    let current = cursor.current.unwrap();
                    if cursor.tree.nodes[current].has_both_children() {
                        copied += 1;
                    } else {
                        spliced += 1;
                    }
                    assert_eq!(cursor.remove_current(), Ok(value));
                    check_invariants(&*cursor.tree);
                }
            }

            assert_eq!(produced, expected);
            expected.retain(|value| value % modulus != 0);
            assert_eq!(tree.iter().cloned().collect::<Vec<u32>>(), expected);
        }

        assert!(copied > 0);
        assert!(spliced > 0);
    }
}
