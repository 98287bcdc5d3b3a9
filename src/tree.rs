//! Height-balanced (AVL) search tree over observed prices.
//!
//! Equal keys share a node and bump its multiplicity, so the tree only grows
//! with the number of distinct prices while still remembering every insert.

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    key: f64,
    multiplicity: u32,
    height: u32,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(key: f64) -> Box<Self> {
        Box::new(Node {
            key,
            multiplicity: 1,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

fn height(link: &Link) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right(mut z: Box<Node>) -> Box<Node> {
    let Some(mut y) = z.left.take() else {
        return z;
    };
    z.left = y.right.take();
    z.update_height();
    y.right = Some(z);
    y.update_height();
    y
}

fn rotate_left(mut z: Box<Node>) -> Box<Node> {
    let Some(mut y) = z.right.take() else {
        return z;
    };
    z.right = y.left.take();
    z.update_height();
    y.left = Some(z);
    y.update_height();
    y
}

/// Restores the AVL invariant at `node` after `key` was inserted below it.
/// The child's key picks single vs. double rotation.
fn rebalance(mut node: Box<Node>, key: f64) -> Box<Node> {
    let balance = node.balance_factor();

    if balance > 1 {
        if let Some(left) = node.left.take() {
            node.left = Some(if key < left.key { left } else { rotate_left(left) });
        }
        return rotate_right(node);
    }

    if balance < -1 {
        if let Some(right) = node.right.take() {
            node.right = Some(if key > right.key { right } else { rotate_right(right) });
        }
        return rotate_left(node);
    }

    node
}

/// Returns the new subtree root and whether a node was allocated.
fn insert_node(link: Link, key: f64) -> (Box<Node>, bool) {
    let mut node = match link {
        None => return (Node::leaf(key), true),
        Some(node) => node,
    };

    let created = if key < node.key {
        let (child, created) = insert_node(node.left.take(), key);
        node.left = Some(child);
        created
    } else if key > node.key {
        let (child, created) = insert_node(node.right.take(), key);
        node.right = Some(child);
        created
    } else {
        node.multiplicity += 1;
        return (node, false);
    };

    if !created {
        return (node, false);
    }

    node.update_height();
    (rebalance(node, key), true)
}

fn walk_in_order(link: &Link, out: &mut Vec<f64>) {
    if let Some(node) = link {
        walk_in_order(&node.left, out);
        out.extend(std::iter::repeat(node.key).take(node.multiplicity as usize));
        walk_in_order(&node.right, out);
    }
}

#[derive(Debug, Default)]
pub struct BalancedSeriesTree {
    root: Link,
    len: usize,
    node_count: usize,
}

impl BalancedSeriesTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: f64) {
        let (root, created) = insert_node(self.root.take(), key);
        self.root = Some(root);
        self.len += 1;
        if created {
            self.node_count += 1;
        }
    }

    /// Every inserted value in ascending order, duplicates expanded.
    pub fn export_ascending(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len);
        walk_in_order(&self.root, &mut out);
        out
    }

    /// Total number of insert calls.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// How many times `key` has been inserted.
    pub fn multiplicity(&self, key: f64) -> u32 {
        let mut cursor = &self.root;
        while let Some(node) = cursor {
            if key < node.key {
                cursor = &node.left;
            } else if key > node.key {
                cursor = &node.right;
            } else {
                return node.multiplicity;
            }
        }
        0
    }
}
