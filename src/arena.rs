//! Fast, but limited allocator with index handles and a reserved nil slot.

use std::mem;
use std::ops::{Index, IndexMut};

/// A handle to an object allocated in a `TypedArena<T>`.
///
/// `Entry::NIL` is reserved: it is never returned by `allocate` and never refers to an object, so
/// linked structures can use it in place of an absent link.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    index: usize,
}

impl Entry {
    /// The reserved handle that never refers to an allocated object.
    pub const NIL: Entry = Entry { index: 0 };

    /// Returns `true` if this is the reserved `Entry::NIL` handle.
    pub fn is_nil(self) -> bool {
        self.index == 0
    }
}

#[derive(Clone)]
enum Block<T> {
    Nil,
    Occupied(T),
    Vacant(Option<usize>),
}

/// A fast, but limited allocator that only allocates a single type of object.
///
/// All objects inside the arena will be destroyed when the typed arena is destroyed. Freed slots
/// are threaded onto a free list and handed out again by later allocations, so handles stay small
/// and stable for the lifetime of the object they refer to. The first slot is reserved for
/// `Entry::NIL`. The underlying container is simply a `Vec` and the arena uses no unsafe code.
///
/// # Examples
///
/// ```
/// use ordered_tree::arena::TypedArena;
///
/// let mut arena = TypedArena::new();
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// ```
#[derive(Clone)]
pub struct TypedArena<T> {
    head: Option<usize>,
    blocks: Vec<Block<T>>,
    size: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::new();
    /// assert!(arena.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new, empty `TypedArena<T>` with room for `capacity` objects before the
    /// underlying storage has to grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let arena: TypedArena<u32> = TypedArena::with_capacity(1024);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut blocks = Vec::with_capacity(capacity + 1);
        blocks.push(Block::Nil);
        TypedArena {
            head: None,
            blocks,
            size: 0,
        }
    }

    /// Allocates an object in the typed arena and returns an `Entry`. The `Entry` can later be
    /// used to retrieve mutable and immutable references to the object, and to deallocate it.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert!(!x.is_nil());
    /// ```
    pub fn allocate(&mut self, value: T) -> Entry {
        self.size += 1;

        match self.head.take() {
            None => {
                self.blocks.push(Block::Occupied(value));
                Entry {
                    index: self.blocks.len() - 1,
                }
            },
            Some(index) => {
                let vacant_block = mem::replace(&mut self.blocks[index], Block::Occupied(value));
                match vacant_block {
                    Block::Vacant(next) => {
                        self.head = next;
                        Entry { index }
                    },
                    _ => panic!("Expected a vacant block on the free list."),
                }
            },
        }
    }

    /// Deallocates an object in the typed arena and returns the object.
    ///
    /// # Panics
    ///
    /// Panics if entry is `Entry::NIL` or corresponds to an invalid or vacant block.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// assert_eq!(arena.get(x), None);
    /// ```
    pub fn free(&mut self, entry: Entry) -> T {
        match self.blocks.get(entry.index) {
            Some(Block::Occupied(_)) => {},
            Some(Block::Vacant(_)) => panic!("Error: attempting to free vacant block."),
            Some(Block::Nil) | None => panic!("Error: attempting to free invalid block."),
        }
        let old_block = mem::replace(
            &mut self.blocks[entry.index],
            Block::Vacant(self.head.take()),
        );
        self.head = Some(entry.index);
        self.size -= 1;
        match old_block {
            Block::Occupied(value) => value,
            _ => unreachable!(),
        }
    }

    /// Returns an immutable reference to an object in the typed arena. Returns `None` if the entry
    /// does not correspond to a live object.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::{Entry, TypedArena};
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// assert_eq!(arena.get(Entry::NIL), None);
    /// ```
    pub fn get(&self, entry: Entry) -> Option<&T> {
        match self.blocks.get(entry.index) {
            Some(Block::Occupied(ref value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the typed arena. Returns `None` if the entry
    /// does not correspond to a live object.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get_mut(x), Some(&mut 0));
    /// ```
    pub fn get_mut(&mut self, entry: Entry) -> Option<&mut T> {
        match self.blocks.get_mut(entry.index) {
            Some(Block::Occupied(ref mut value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of live objects in the typed arena.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the typed arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Destroys every object in the typed arena. Previously returned entries become invalid.
    pub fn clear(&mut self) {
        self.blocks.truncate(1);
        self.head = None;
        self.size = 0;
    }
}

impl<T> Default for TypedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(entry).expect("Error: entry out of bounds.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(entry).expect("Error: entry out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::Entry;
    use super::TypedArena;

    #[test]
    #[should_panic]
    fn test_free_invalid_block() {
        let mut arena: TypedArena<u32> = TypedArena::new();
        arena.free(Entry { index: 1 });
    }

    #[test]
    #[should_panic]
    fn test_free_nil() {
        let mut arena = TypedArena::new();
        arena.allocate(0);
        arena.free(Entry::NIL);
    }

    #[test]
    #[should_panic]
    fn test_free_vacant_block() {
        let mut arena = TypedArena::new();
        let entry = arena.allocate(0);
        arena.free(entry);
        arena.free(entry);
    }

    #[test]
    fn test_allocate() {
        let mut arena = TypedArena::new();
        assert_eq!(arena.allocate(0), Entry { index: 1 });
        assert_eq!(arena.allocate(0), Entry { index: 2 });
        assert_eq!(arena.allocate(0), Entry { index: 3 });
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_free_reuses_slots() {
        let mut arena = TypedArena::new();
        let a = arena.allocate(0);
        let b = arena.allocate(1);
        assert_eq!(arena.free(a), 0);
        assert_eq!(arena.free(b), 1);
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(2), b);
        assert_eq!(arena.allocate(3), a);
        assert_eq!(arena.allocate(4), Entry { index: 3 });
    }

    #[test]
    fn test_get_nil() {
        let mut arena = TypedArena::new();
        arena.allocate(0);
        assert!(Entry::NIL.is_nil());
        assert_eq!(arena.get(Entry::NIL), None);
        assert_eq!(arena.get_mut(Entry::NIL), None);
    }

    #[test]
    fn test_get_vacant_block() {
        let mut arena = TypedArena::new();
        let entry = arena.allocate(0);
        arena.free(entry);
        assert_eq!(arena.get(entry), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = TypedArena::new();
        let entry = arena.allocate(0);
        *arena.get_mut(entry).unwrap() = 1;
        assert_eq!(arena.get(entry), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut arena = TypedArena::with_capacity(16);
        let entry = arena.allocate(0);
        arena.allocate(1);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.get(entry), None);
        assert_eq!(arena.allocate(2), Entry { index: 1 });
    }
}
