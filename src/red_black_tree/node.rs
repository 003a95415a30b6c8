use crate::arena::Entry;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn abbreviation(self) -> &'static str {
        match self {
            Color::Red => "R",
            Color::Black => "B",
        }
    }
}

/// A struct representing an internal node of a red black tree.
///
/// Links are arena handles; `Entry::NIL` stands for an absent child or, on the root, an absent
/// parent.
#[derive(Clone)]
pub struct Node<T> {
    pub value: T,
    pub color: Color,
    pub parent: Entry,
    pub left: Entry,
    pub right: Entry,
}

impl<T> Node<T> {
    pub fn new(value: T, parent: Entry) -> Self {
        Node {
            value,
            color: Color::Red,
            parent,
            left: Entry::NIL,
            right: Entry::NIL,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_nil() && self.right.is_nil()
    }

    pub fn has_both_children(&self) -> bool {
        !self.left.is_nil() && !self.right.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Node};
    use crate::arena::Entry;

    #[test]
    fn test_new_node_is_red_leaf() {
        let node = Node::new(1, Entry::NIL);
        assert_eq!(node.color, Color::Red);
        assert!(node.is_leaf());
        assert!(!node.has_both_children());
        assert!(node.parent.is_nil());
    }

    #[test]
    fn test_abbreviation() {
        assert_eq!(Color::Red.abbreviation(), "R");
        assert_eq!(Color::Black.abbreviation(), "B");
    }
}
