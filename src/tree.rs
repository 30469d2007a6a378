use crate::avl::Tree;
use parking_lot::{RwLock, RwLockReadGuard};
use std::{
    borrow::Borrow,
    fmt::{self, Debug, Formatter, Write},
    ptr,
};

/// An ordered set of unique values kept in an AVL tree behind a
/// single reader/writer lock.
///
/// Every method takes `&self`, so an `AvlTree` can be shared between
/// threads with an `Arc`. Read only operations (search, min, max,
/// index, rank, depth, the walks) take the lock shared and may run
/// concurrently, mutations (insert, delete, reverse, truncate) take
/// it exclusively. The lock is held for the whole operation
/// including rebalancing, so no caller ever observes a partially
/// rebalanced tree. There is no finer grained locking, writers
/// serialize on the whole tree.
///
/// Values are ordered by their `Ord` implementation. A value that
/// compares equal to one already present replaces it, the count is
/// unchanged.
///
/// # Examples
/// ```
/// use rwavl::tree::AvlTree;
///
/// let t = AvlTree::new();
/// for i in [5, 2, 9, 0, 3] {
///     t.insert(i);
/// }
///
/// assert_eq!(t.len(), 5);
/// assert_eq!(t.search(&3), Some(3));
/// assert_eq!(t.search(&4), None);
/// assert_eq!(t.index(0), Some(0));
/// assert_eq!(t.index(4), Some(9));
/// assert_eq!(t.depth(), Some(2));
///
/// assert!(t.delete(&3));
/// assert!(!t.delete(&3));
/// assert_eq!(t.snapshot(), vec![0, 2, 5, 9]);
/// ```
pub struct AvlTree<T> {
    inner: RwLock<Tree<T>>,
}

impl<T> Default for AvlTree<T> {
    fn default() -> AvlTree<T> {
        AvlTree::new()
    }
}

impl<T: Clone> Clone for AvlTree<T> {
    fn clone(&self) -> Self {
        AvlTree {
            inner: RwLock::new(self.read().clone()),
        }
    }
}

impl<T: PartialEq> PartialEq for AvlTree<T> {
    fn eq(&self, other: &AvlTree<T>) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        // lock in address order so two threads comparing the same pair
        // in opposite directions take the locks consistently
        let (t0, t1) = if (self as *const Self) < (other as *const Self) {
            let t0 = self.read();
            (t0, other.read())
        } else {
            let t1 = other.read();
            (self.read(), t1)
        };
        t0.len() == t1.len() && t0.iter().zip(t1.iter()).all(|(v0, v1)| v0 == v1)
    }
}

impl<T: Eq> Eq for AvlTree<T> {}

impl<T: Debug> Debug for AvlTree<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_set().entries(self.read().iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut t = Tree::new();
        for v in iter {
            t.insert(v);
        }
        AvlTree {
            inner: RwLock::new(t),
        }
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let t = self.inner.get_mut();
        for v in iter {
            t.insert(v);
        }
    }
}

impl<T> AvlTree<T> {
    // shared access never queues behind a waiting writer, so a walk
    // callback may call read only methods on the tree it is walking
    fn read(&self) -> RwLockReadGuard<'_, Tree<T>> {
        self.inner.read_recursive()
    }

    /// Create a new empty tree
    pub fn new() -> Self {
        AvlTree {
            inner: RwLock::new(Tree::new()),
        }
    }

    /// the number of elements in the tree, O(1)
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// true if the tree currently presents its elements in descending
    /// order, i.e. `reverse` has been called an odd number of times
    /// since it was created or truncated.
    pub fn is_reversed(&self) -> bool {
        self.read().is_mirrored()
    }

    /// The number of edges on the longest path from the root to a
    /// leaf. A tree with one element has depth 0, an empty tree has
    /// no depth and returns None.
    pub fn depth(&self) -> Option<usize> {
        self.read().depth()
    }

    /// Mirror the tree by swapping the children of every node. The in
    /// order sequence, and therefore `index`, `snapshot` and the
    /// walks, runs in the opposite direction afterwards. The tree
    /// remembers its orientation, so insert, delete and search keep
    /// working on a reversed tree, and reversing again restores the
    /// original view. `find_min` and `find_max` always follow the
    /// ordering of T. O(N).
    ///
    /// # Examples
    /// ```
    /// use rwavl::tree::AvlTree;
    ///
    /// let t: AvlTree<i32> = (1..=5).collect();
    /// t.reverse();
    /// assert_eq!(t.snapshot(), vec![5, 4, 3, 2, 1]);
    /// t.insert(6);
    /// assert_eq!(t.index(0), Some(6));
    /// assert_eq!(t.find_min(), Some(1));
    /// t.reverse();
    /// assert_eq!(t.snapshot(), vec![1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn reverse(&self) {
        self.inner.write().reverse()
    }

    /// Remove every element. The nodes are released when the old
    /// root is dropped, and the orientation resets to ascending.
    pub fn truncate(&self) {
        self.inner.write().clear()
    }

    /// Call `visit(i, depth, value)` for every element in order, where
    /// i counts the calls made so far (and so is the rank of value)
    /// and depth is the distance of the element's node from the
    /// root. If `visit` returns false the walk stops, the rest of
    /// the right subtree and everything after it is skipped. Returns
    /// true if every element was visited.
    ///
    /// The value reference is only valid for the duration of the
    /// call. The read lock is held throughout the walk, `visit` may
    /// call read only methods (len, search, index, ...) on the same
    /// tree, but calling a mutating method from `visit` deadlocks.
    ///
    /// # Examples
    /// ```
    /// use rwavl::tree::AvlTree;
    ///
    /// let t: AvlTree<i32> = (1..=7).collect();
    /// let mut seen = Vec::new();
    /// let done = t.walk_in_order(|_, _, v| {
    ///     seen.push(*v);
    ///     *v < 3
    /// });
    /// assert!(!done);
    /// assert_eq!(seen, vec![1, 2, 3]);
    /// ```
    pub fn walk_in_order<F>(&self, visit: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        self.read().walk_in_order(visit)
    }

    /// Like `walk_in_order`, but each node is visited before its
    /// children. Stopping at a node skips its whole subtree.
    pub fn walk_pre_order<F>(&self, visit: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        self.read().walk_pre_order(visit)
    }

    /// Like `walk_in_order`, but each node is visited after both of
    /// its subtrees. Stopping at a node skips its remaining
    /// ancestors and their unvisited subtrees.
    pub fn walk_post_order<F>(&self, visit: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        self.read().walk_post_order(visit)
    }

    /// Write the tree structure to `w` for debugging, one element
    /// per line in order, indented by depth, with the cached height
    /// of its node. The format is not stable.
    pub fn dump<W: Write>(&self, w: &mut W) -> fmt::Result
    where
        T: Debug,
    {
        self.read().dump(w)
    }

    /// Copy every element out in order under a single read lock.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.read().iter().cloned().collect()
    }

    /// The smallest element, or None if the tree is empty.
    pub fn find_min(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read().first().cloned()
    }

    /// The largest element, or None if the tree is empty.
    pub fn find_max(&self) -> Option<T>
    where
        T: Clone,
    {
        self.read().last().cloned()
    }

    /// The element at position i of the in order sequence, or None if
    /// i >= len. Subtree sizes are cached in the nodes, so this runs
    /// in O(log(N)).
    pub fn index(&self, i: usize) -> Option<T>
    where
        T: Clone,
    {
        self.read().nth(i).cloned()
    }
}

impl<T: Ord> AvlTree<T> {
    /// Insert value into the tree. If an equal value is already
    /// present it is replaced and returned, and the length does not
    /// change. O(log(N)).
    ///
    /// # Examples
    /// ```
    /// use rwavl::tree::AvlTree;
    ///
    /// let t = AvlTree::new();
    /// assert_eq!(t.insert(String::from("a")), None);
    /// assert_eq!(t.insert(String::from("a")), Some(String::from("a")));
    /// assert_eq!(t.len(), 1);
    /// ```
    pub fn insert(&self, value: T) -> Option<T> {
        self.inner.write().insert(value)
    }

    /// Remove the element equal to q, which may be any borrowed form
    /// of T. Returns true if it was found. O(log(N)).
    pub fn delete<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        self.remove(q).is_some()
    }

    /// Remove and return the element equal to q. O(log(N)).
    pub fn remove<Q>(&self, q: &Q) -> Option<T>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        self.inner.write().remove(q)
    }

    /// Remove and return the smallest element.
    pub fn delete_at_head(&self) -> Option<T> {
        self.inner.write().pop_first()
    }

    /// Remove and return the largest element.
    pub fn delete_at_tail(&self) -> Option<T> {
        self.inner.write().pop_last()
    }

    /// lookup the element equal to q and return a copy of it. If it
    /// doesn't exist return None. Runs in O(log(N)) time and constant
    /// space.
    pub fn search<Q>(&self, q: &Q) -> Option<T>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q> + Clone,
    {
        self.read().get(q).cloned()
    }

    /// lookup the element equal to q and apply f to it while the
    /// read lock is held.
    ///
    /// # Examples
    /// ```
    /// use rwavl::tree::AvlTree;
    ///
    /// let t: AvlTree<String> = ["x", "yy", "zzz"].iter().map(|s| s.to_string()).collect();
    /// assert_eq!(t.search_with("yy", |s| s.len()), Some(2));
    /// assert_eq!(t.search_with("w", |s| s.len()), None);
    /// ```
    pub fn search_with<Q, R, F>(&self, q: &Q, f: F) -> Option<R>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
        F: FnOnce(&T) -> R,
    {
        self.read().get(q).map(f)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        self.read().get(q).is_some()
    }

    /// The in order position of the element equal to q, the inverse
    /// of `index`. O(log(N)).
    pub fn rank<Q>(&self, q: &Q) -> Option<usize>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        self.read().rank(q)
    }
}

impl<T: Ord + Debug> AvlTree<T> {
    #[allow(dead_code)]
    pub(crate) fn invariant(&self) {
        self.read().invariant()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::AvlTree;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl<T: Serialize> Serialize for AvlTree<T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.read().iter())
        }
    }

    impl<'de, T> Deserialize<'de> for AvlTree<T>
    where
        T: Deserialize<'de> + Ord,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(Vec::<T>::deserialize(deserializer)?.into_iter().collect())
        }
    }
}
