use arrayvec::ArrayVec;
use std::{
    borrow::Borrow,
    cmp::{max, Ordering},
    fmt::{self, Debug, Write},
    iter::FusedIterator,
    mem,
};

// an avl tree of height h holds at least fib(h + 2) - 1 nodes, no
// address space is big enough to need more than this
pub(crate) const MAX_DEPTH: usize = 96;

type Link<T> = Option<Box<Node<T>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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

#[derive(Clone)]
pub(crate) struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    size: usize,
    height: u32,
}

fn height<T>(t: &Link<T>) -> u32 {
    t.as_ref().map_or(0, |n| n.height)
}

fn size<T>(t: &Link<T>) -> usize {
    t.as_ref().map_or(0, |n| n.size)
}

fn oriented(o: Ordering, mirrored: bool) -> Ordering {
    if mirrored {
        o.reverse()
    } else {
        o
    }
}

impl<T> Node<T> {
    fn leaf(value: T) -> Box<Self> {
        Box::new(Node {
            value,
            left: None,
            right: None,
            size: 1,
            height: 1,
        })
    }

    fn child(&self, side: Side) -> &Link<T> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Link<T> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn fix(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
        self.size = 1 + size(&self.left) + size(&self.right);
    }

    fn balance_factor(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

//         y               x
//        / \             / \
//       x   T3    =>   T1   y
//      / \                 / \
//    T1   T2             T2   T3
fn rotate_right<T>(mut y: Box<Node<T>>) -> Box<Node<T>> {
    match y.left.take() {
        None => {
            debug_assert!(false, "rotate right without a left child");
            y
        }
        Some(mut x) => {
            y.left = x.right.take();
            y.fix();
            x.right = Some(y);
            x.fix();
            x
        }
    }
}

//       x                   y
//      / \                 / \
//    T1   y       =>      x   T3
//        / \             / \
//      T2   T3         T1   T2
fn rotate_left<T>(mut x: Box<Node<T>>) -> Box<Node<T>> {
    match x.right.take() {
        None => {
            debug_assert!(false, "rotate left without a right child");
            x
        }
        Some(mut y) => {
            x.right = y.left.take();
            x.fix();
            y.left = Some(x);
            y.fix();
            y
        }
    }
}

/// recompute the cached height and size of n, then restore the
/// balance of the subtree rooted at n with at most one single or
/// double rotation, returning the new subtree root. The children of
/// n must already be balanced, and their heights may differ by at
/// most 2.
fn bal<T>(mut n: Box<Node<T>>) -> Box<Node<T>> {
    n.fix();
    let bf = n.balance_factor();
    debug_assert!(bf.abs() <= 2, "tree heights wrong {}", bf);
    if bf > 1 {
        if n.left.as_ref().map_or(false, |l| l.balance_factor() < 0) {
            trace_log!(case = "left-right", height = n.height, "rebalance");
            n.left = n.left.take().map(rotate_left);
        } else {
            trace_log!(case = "left-left", height = n.height, "rebalance");
        }
        rotate_right(n)
    } else if bf < -1 {
        if n.right.as_ref().map_or(false, |r| r.balance_factor() > 0) {
            trace_log!(case = "right-left", height = n.height, "rebalance");
            n.right = n.right.take().map(rotate_right);
        } else {
            trace_log!(case = "right-right", height = n.height, "rebalance");
        }
        rotate_left(n)
    } else {
        n
    }
}

fn rebalance<T>(slot: &mut Link<T>) {
    if let Some(n) = slot.take() {
        *slot = Some(bal(n))
    }
}

fn insert_at<T: Ord>(slot: &mut Link<T>, value: T, mirrored: bool) -> Option<T> {
    let n = match slot {
        None => {
            *slot = Some(Node::leaf(value));
            return None;
        }
        Some(n) => n,
    };
    let prev = match oriented(value.cmp(&n.value), mirrored) {
        Ordering::Equal => Some(mem::replace(&mut n.value, value)),
        Ordering::Less => insert_at(&mut n.left, value, mirrored),
        Ordering::Greater => insert_at(&mut n.right, value, mirrored),
    };
    rebalance(slot);
    prev
}

// remove the outermost node on `side` of the subtree in slot
fn pop_edge<T>(slot: &mut Link<T>, side: Side) -> Option<T> {
    let n = slot.as_mut()?;
    if n.child(side).is_some() {
        let v = pop_edge(n.child_mut(side), side);
        rebalance(slot);
        v
    } else {
        unlink(slot)
    }
}

// detach the node in slot and return its value, promoting a child or
// the in order successor into its place
fn unlink<T>(slot: &mut Link<T>) -> Option<T> {
    let mut n = slot.take()?;
    match (n.left.take(), n.right.take()) {
        (None, child) | (child, None) => {
            *slot = child;
            Some(n.value)
        }
        (left, mut right) => {
            n.left = left;
            match pop_edge(&mut right, Side::Left) {
                Some(successor) => {
                    n.right = right;
                    let value = mem::replace(&mut n.value, successor);
                    *slot = Some(bal(n));
                    Some(value)
                }
                None => {
                    debug_assert!(false, "non empty right subtree without a leftmost node");
                    n.right = right;
                    *slot = Some(n);
                    None
                }
            }
        }
    }
}

fn remove_at<T, Q>(slot: &mut Link<T>, q: &Q, mirrored: bool) -> Option<T>
where
    Q: ?Sized + Ord,
    T: Borrow<Q>,
{
    let n = slot.as_mut()?;
    let removed = match oriented(q.cmp(n.value.borrow()), mirrored) {
        Ordering::Equal => return unlink(slot),
        Ordering::Less => remove_at(&mut n.left, q, mirrored),
        Ordering::Greater => remove_at(&mut n.right, q, mirrored),
    };
    if removed.is_some() {
        rebalance(slot)
    }
    removed
}

fn mirror<T>(slot: &mut Link<T>) {
    if let Some(n) = slot {
        mirror(&mut n.left);
        mirror(&mut n.right);
        mem::swap(&mut n.left, &mut n.right);
    }
}

fn walk_in<T, F>(t: &Link<T>, depth: usize, i: &mut usize, f: &mut F) -> bool
where
    F: FnMut(usize, usize, &T) -> bool,
{
    match t {
        None => true,
        Some(n) => {
            if !walk_in(&n.left, depth + 1, i, f) {
                return false;
            }
            let idx = *i;
            *i += 1;
            f(idx, depth, &n.value) && walk_in(&n.right, depth + 1, i, f)
        }
    }
}

fn walk_pre<T, F>(t: &Link<T>, depth: usize, i: &mut usize, f: &mut F) -> bool
where
    F: FnMut(usize, usize, &T) -> bool,
{
    match t {
        None => true,
        Some(n) => {
            let idx = *i;
            *i += 1;
            f(idx, depth, &n.value)
                && walk_pre(&n.left, depth + 1, i, f)
                && walk_pre(&n.right, depth + 1, i, f)
        }
    }
}

fn walk_post<T, F>(t: &Link<T>, depth: usize, i: &mut usize, f: &mut F) -> bool
where
    F: FnMut(usize, usize, &T) -> bool,
{
    match t {
        None => true,
        Some(n) => {
            if !(walk_post(&n.left, depth + 1, i, f) && walk_post(&n.right, depth + 1, i, f)) {
                return false;
            }
            let idx = *i;
            *i += 1;
            f(idx, depth, &n.value)
        }
    }
}

fn dump_node<T: Debug, W: Write>(t: &Link<T>, depth: usize, w: &mut W) -> fmt::Result {
    match t {
        None => Ok(()),
        Some(n) => {
            dump_node(&n.left, depth + 1, w)?;
            writeln!(w, "{:indent$}{:?} (h={})", "", n.value, n.height, indent = depth * 2)?;
            dump_node(&n.right, depth + 1, w)
        }
    }
}

/// In order iterator over the values of a tree. Runs in O(N) total
/// time and O(log(N)) space.
pub(crate) struct Iter<'a, T> {
    stack: ArrayVec<&'a Node<T>, MAX_DEPTH>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, t: &'a Link<T>) {
        let mut cur = t.as_deref();
        while let Some(n) = cur {
            self.stack.push(n);
            cur = n.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let n = self.stack.pop()?;
        self.push_left(&n.right);
        self.remaining -= 1;
        Some(&n.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// An owned, unsynchronized avl tree of unique values. The in order
/// sequence is ascending, or descending when the tree is mirrored.
#[derive(Clone)]
pub(crate) struct Tree<T> {
    root: Link<T>,
    len: usize,
    mirrored: bool,
}

impl<T> Default for Tree<T> {
    fn default() -> Tree<T> {
        Tree::new()
    }
}

impl<T> Tree<T> {
    pub(crate) fn new() -> Self {
        Tree {
            root: None,
            len: 0,
            mirrored: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    // the side holding the smallest element under T's ordering
    fn min_side(&self) -> Side {
        if self.mirrored {
            Side::Right
        } else {
            Side::Left
        }
    }

    fn edge(&self, side: Side) -> Option<&T> {
        let mut n = self.root.as_deref()?;
        while let Some(c) = n.child(side).as_deref() {
            n = c
        }
        Some(&n.value)
    }

    pub(crate) fn first(&self) -> Option<&T> {
        self.edge(self.min_side())
    }

    pub(crate) fn last(&self) -> Option<&T> {
        self.edge(self.min_side().opposite())
    }

    pub(crate) fn pop_first(&mut self) -> Option<T> {
        let side = self.min_side();
        let v = pop_edge(&mut self.root, side)?;
        self.len -= 1;
        Some(v)
    }

    pub(crate) fn pop_last(&mut self) -> Option<T> {
        let side = self.min_side().opposite();
        let v = pop_edge(&mut self.root, side)?;
        self.len -= 1;
        Some(v)
    }

    /// the element at position i of the in order sequence. O(log(N))
    /// using the cached subtree sizes.
    pub(crate) fn nth(&self, i: usize) -> Option<&T> {
        let mut i = i;
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            let l = size(&n.left);
            match i.cmp(&l) {
                Ordering::Less => cur = n.left.as_deref(),
                Ordering::Equal => return Some(&n.value),
                Ordering::Greater => {
                    i -= l + 1;
                    cur = n.right.as_deref();
                }
            }
        }
        None
    }

    /// edges on the longest root to leaf path, None if the tree is empty
    pub(crate) fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(|n| n.height as usize - 1)
    }

    pub(crate) fn reverse(&mut self) {
        mirror(&mut self.root);
        self.mirrored = !self.mirrored;
        debug_log!(len = self.len, mirrored = self.mirrored, "reversed tree");
    }

    pub(crate) fn clear(&mut self) {
        debug_log!(len = self.len, "truncating tree");
        self.root = None;
        self.len = 0;
        self.mirrored = false;
    }

    pub(crate) fn walk_in_order<F>(&self, mut f: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        walk_in(&self.root, 0, &mut 0, &mut f)
    }

    pub(crate) fn walk_pre_order<F>(&self, mut f: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        walk_pre(&self.root, 0, &mut 0, &mut f)
    }

    pub(crate) fn walk_post_order<F>(&self, mut f: F) -> bool
    where
        F: FnMut(usize, usize, &T) -> bool,
    {
        walk_post(&self.root, 0, &mut 0, &mut f)
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: ArrayVec::new(),
            remaining: self.len,
        };
        iter.push_left(&self.root);
        iter
    }

    pub(crate) fn dump<W: Write>(&self, w: &mut W) -> fmt::Result
    where
        T: Debug,
    {
        dump_node(&self.root, 0, w)
    }
}

impl<T: Ord> Tree<T> {
    /// insert value, returning the value it replaced if an equal
    /// one was already present.
    pub(crate) fn insert(&mut self, value: T) -> Option<T> {
        let prev = insert_at(&mut self.root, value, self.mirrored);
        if prev.is_none() {
            self.len += 1;
        }
        prev
    }

    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<T>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        let v = remove_at(&mut self.root, q, self.mirrored)?;
        self.len -= 1;
        Some(v)
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            match oriented(q.cmp(n.value.borrow()), self.mirrored) {
                Ordering::Less => cur = n.left.as_deref(),
                Ordering::Greater => cur = n.right.as_deref(),
                Ordering::Equal => return Some(&n.value),
            }
        }
        None
    }

    /// the in order position of q, if it is present
    pub(crate) fn rank<Q>(&self, q: &Q) -> Option<usize>
    where
        Q: ?Sized + Ord,
        T: Borrow<Q>,
    {
        let mut skipped = 0;
        let mut cur = self.root.as_deref();
        while let Some(n) = cur {
            match oriented(q.cmp(n.value.borrow()), self.mirrored) {
                Ordering::Less => cur = n.left.as_deref(),
                Ordering::Equal => return Some(skipped + size(&n.left)),
                Ordering::Greater => {
                    skipped += size(&n.left) + 1;
                    cur = n.right.as_deref();
                }
            }
        }
        None
    }
}

impl<T> Tree<T>
where
    T: Ord + Debug,
{
    #[allow(dead_code)]
    pub(crate) fn invariant(&self) {
        fn check<T: Ord + Debug>(
            t: &Link<T>,
            lower: Option<&T>,
            upper: Option<&T>,
            mirrored: bool,
        ) -> (u32, usize) {
            match t {
                None => (0, 0),
                Some(n) => {
                    if let Some(lower) = lower {
                        if oriented(lower.cmp(&n.value), mirrored) != Ordering::Less {
                            panic!(
                                "tree invariant violated {:?} is not after {:?}",
                                n.value, lower
                            )
                        }
                    }
                    if let Some(upper) = upper {
                        if oriented(upper.cmp(&n.value), mirrored) != Ordering::Greater {
                            panic!(
                                "tree invariant violated {:?} is not before {:?}",
                                n.value, upper
                            )
                        }
                    }
                    let (hl, sl) = check(&n.left, lower, Some(&n.value), mirrored);
                    let (hr, sr) = check(&n.right, Some(&n.value), upper, mirrored);
                    let h = 1 + max(hl, hr);
                    if h != n.height {
                        panic!("node height is wrong {} vs {} at {:?}", h, n.height, n.value)
                    }
                    if sl + sr + 1 != n.size {
                        panic!("node size is wrong {} vs {} at {:?}", sl + sr + 1, n.size, n.value)
                    }
                    if max(hl, hr) - hl.min(hr) > 1 {
                        panic!("tree is unbalanced {} vs {} at {:?}", hl, hr, n.value)
                    }
                    (h, n.size)
                }
            }
        }

        let (_height, tlen) = check(&self.root, None, None, self.mirrored);
        if self.len != tlen {
            panic!("len is wrong {} vs {}", self.len, tlen)
        }
    }
}
