use std::cmp::Ordering;

use log::debug;

use super::{record::Student, Result, StoreError};

type Link = Option<Box<Node>>;

struct Node {
    student: Student,
    left: Link,
    right: Link,
}

impl Node {
    fn new(student: Student) -> Box<Self> {
        Box::new(Self {
            student,
            left: None,
            right: None,
        })
    }
}

/// Unbalanced binary search tree keyed by student id.
///
/// Every node's left subtree holds strictly smaller ids and its right
/// subtree strictly larger ones; shape depends entirely on insertion
/// order, so a run of sequential ids degrades to a linked list. All
/// traversals and teardown use explicit stacks, keeping call depth flat
/// even on such chain-shaped trees.
pub(crate) struct Tree {
    root: Link,
    len: usize,
}

impl Tree {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Places a record at the leaf position its id descends to.
    ///
    /// An id already in the tree is rejected; two nodes sharing a key
    /// would leave one of them unreachable by search.
    pub fn insert(&mut self, student: Student) -> Result<()> {
        let id = student.id();
        let mut link = &mut self.root;

        while let Some(node) = link {
            match id.cmp(&node.student.id()) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal => return Err(StoreError::DuplicateId(id)),
            }
        }

        debug!("inserting record; id {id}");
        *link = Some(Node::new(student));
        self.len += 1;
        Ok(())
    }

    pub fn find(&self, id: i32) -> Option<&Student> {
        let mut cur = self.root.as_deref();

        while let Some(node) = cur {
            match id.cmp(&node.student.id()) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(&node.student),
            }
        }

        None
    }

    pub fn find_mut(&mut self, id: i32) -> Option<&mut Student> {
        let mut cur = self.root.as_deref_mut();

        while let Some(node) = cur {
            match id.cmp(&node.student.id()) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Greater => cur = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.student),
            }
        }

        None
    }

    /// Detaches the record with the given id, if present.
    pub fn remove(&mut self, id: i32) -> Option<Student> {
        let removed = Self::remove_at(&mut self.root, id);

        if removed.is_some() {
            debug!("removed record; id {id}");
            self.len -= 1;
        }

        removed
    }

    fn remove_at(link: &mut Link, id: i32) -> Option<Student> {
        match link {
            None => None,
            Some(node) => match id.cmp(&node.student.id()) {
                Ordering::Less => Self::remove_at(&mut node.left, id),
                Ordering::Greater => Self::remove_at(&mut node.right, id),
                Ordering::Equal => Some(Self::detach(link)),
            },
        }
    }

    /// Unlinks the node at `link`, which must be occupied.
    fn detach(link: &mut Link) -> Student {
        let mut node = link.take().expect("detach called on an empty link");

        match (node.left.take(), node.right.take()) {
            (None, None) => node.student,
            (Some(child), None) | (None, Some(child)) => {
                *link = Some(child);
                node.student
            }
            (left, right) => {
                // Two children: swap in the in-order successor (leftmost
                // record of the right subtree), then hand back the node.
                node.left = left;
                node.right = right;
                let successor = Self::take_min(&mut node.right);
                let removed = std::mem::replace(&mut node.student, successor);
                *link = Some(node);
                removed
            }
        }
    }

    /// Removes and returns the smallest-id record under `link`, which
    /// must be occupied.
    fn take_min(link: &mut Link) -> Student {
        let has_left = link
            .as_ref()
            .map(|node| node.left.is_some())
            .unwrap_or(false);

        if has_left {
            let node = link.as_mut().expect("take_min lost its subtree");
            Self::take_min(&mut node.left)
        } else {
            let mut node = link.take().expect("take_min called on an empty link");
            *link = node.right.take();
            node.student
        }
    }

    /// In-order walk: records in strictly increasing id order.
    pub fn in_key_order(&self) -> Vec<&Student> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cur = self.root.as_deref();

        while cur.is_some() || !stack.is_empty() {
            while let Some(node) = cur {
                stack.push(node);
                cur = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                out.push(&node.student);
                cur = node.right.as_deref();
            }
        }

        out
    }

    /// Pre-order walk over the current shape. Reinserting records in
    /// this order rebuilds an identical tree, which is why persistence
    /// uses it.
    pub fn pre_order(&self) -> Vec<&Student> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();

        if let Some(root) = self.root.as_deref() {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            out.push(&node.student);
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }

        out
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        // The derived drop would recurse per level; unlink children onto
        // an explicit stack instead so chain-shaped trees tear down in
        // constant stack space.
        let mut stack = Vec::new();

        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(mut node) = stack.pop() {
            if let Some(left) = node.left.take() {
                stack.push(left);
            }
            if let Some(right) = node.right.take() {
                stack.push(right);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn student(id: i32) -> Student {
        Student::new(id, format!("s{id}"), 20, id as f64)
    }

    fn tree_of(ids: &[i32]) -> Tree {
        let mut tree = Tree::new();
        for &id in ids {
            tree.insert(student(id)).unwrap();
        }
        tree
    }

    fn ids(tree: &Tree) -> Vec<i32> {
        tree.in_key_order().iter().map(|s| s.id()).collect()
    }

    #[test]
    fn in_key_order_is_sorted() {
        let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);
        assert_eq!(ids(&tree), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut tree = tree_of(&[5]);

        let result = tree.insert(student(5));
        assert!(matches!(result, Err(StoreError::DuplicateId(5))));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn find_present_and_absent() {
        let tree = tree_of(&[5, 3, 8]);

        assert_eq!(tree.find(3).unwrap().name, "s3");
        assert!(tree.find(4).is_none());
        assert!(Tree::new().find(1).is_none());
    }

    #[test]
    fn remove_leaf() {
        let mut tree = tree_of(&[5, 3, 8]);

        assert_eq!(tree.remove(3).unwrap().id(), 3);
        assert!(tree.find(3).is_none());
        assert_eq!(ids(&tree), vec![5, 8]);
    }

    #[test]
    fn remove_single_child_node() {
        // 5's left child 3 has only the child 4
        let mut tree = tree_of(&[5, 3, 4, 8]);

        assert!(tree.remove(3).is_some());
        assert_eq!(ids(&tree), vec![4, 5, 8]);
        assert_eq!(tree.find(4).unwrap().name, "s4");
    }

    #[test]
    fn remove_two_child_node_uses_successor() {
        let mut tree = tree_of(&[5, 3, 8, 7, 9, 6]);

        assert!(tree.remove(8).is_some());
        assert_eq!(ids(&tree), vec![3, 5, 6, 7, 9]);
        // successor 9's old position must be gone, not duplicated
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn repeated_removal_drains_tree() {
        let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

        for _ in 0..7 {
            let min_id = ids(&tree)[0];
            assert!(tree.remove(min_id).is_some());
        }
        assert_eq!(tree.len(), 0);
        assert!(ids(&tree).is_empty());
    }

    #[test]
    fn remove_absent_id_reports_none() {
        let mut tree = tree_of(&[5]);

        assert!(tree.remove(42).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remaining_records_survive_removal_unchanged() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4]);
        tree.find_mut(4).unwrap().grade = 99.0;

        tree.remove(3).unwrap();

        assert_eq!(ids(&tree), vec![1, 4, 5, 8]);
        assert_eq!(tree.find(4).unwrap().grade, 99.0);
        assert_eq!(tree.find(1).unwrap().name, "s1");
    }

    #[test]
    fn sequential_inserts_form_a_chain_that_still_works() {
        // worst-case shape: strictly increasing ids
        let ids_in: Vec<i32> = (1..=500).collect();
        let mut tree = tree_of(&ids_in);

        assert_eq!(ids(&tree), ids_in);
        assert_eq!(tree.find(500).unwrap().name, "s500");
        assert!(tree.remove(250).is_some());
        assert_eq!(tree.len(), 499);
    }

    #[test]
    fn pre_order_visits_parent_before_children() {
        let tree = tree_of(&[5, 3, 8, 1]);

        let order: Vec<i32> = tree.pre_order().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![5, 3, 1, 8]);
    }
}
