//! Arena-backed node tree.
//!
//! Nodes live in a map keyed by [`NodeId`]; parent and child links are ids,
//! so moving a subtree is a matter of re-linking two handles. A node that is
//! not reachable from the root is either in flight (between detach and attach
//! during a rename) or gets reclaimed by [`Tree::reclaim`].

use std::collections::HashMap;

use super::limits::FsUsage;
use super::node::{Node, NodeId};
use crate::error::{Error, Result};
use crate::path;

/// Name of the root node; full paths of reachable nodes start with it.
pub(crate) const ROOT_NAME: &str = ".";

pub(crate) struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    // running totals over every node in the arena except the root
    usage: FsUsage,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let root = Node::directory(ROOT_NAME);
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
            usage: FsUsage::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes held by the arena, root included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or_else(|| stale(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or_else(|| stale(id))
    }

    /// Move a freshly built node into the arena, detached.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        if node.is_dir() {
            self.usage.dir_count += 1;
        } else {
            self.usage.file_count += 1;
            self.usage.total_bytes += node.size();
        }
        self.nodes.insert(id, node);
        id
    }

    /// Drop one node from the arena and from the totals.
    fn forget(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            if node.is_dir() {
                self.usage.dir_count -= 1;
            } else {
                self.usage.file_count -= 1;
                self.usage.total_bytes -= node.size();
            }
        }
    }

    /// Replace a file's content, keeping the byte total in step.
    pub fn write_content(&mut self, id: NodeId, content: Vec<u8>) -> Result<()> {
        let node = self.get_mut(id)?;
        let before = node.size();
        node.write_content(content)?;
        let after = node.size();
        self.usage.total_bytes = self.usage.total_bytes - before + after;
        Ok(())
    }

    /// Child of `parent` named `name`, if any.
    pub fn child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>> {
        Ok(self.get(parent)?.children()?.get(name).copied())
    }

    /// Resolve `path` starting at `start`, one segment at a time.
    pub fn resolve(&self, start: NodeId, path: &str) -> Result<NodeId> {
        let mut current = start;
        let mut walked = String::new();

        for segment in path::segments(path) {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(segment);

            let node = self.get(current)?;
            if !node.is_dir() {
                return Err(Error::NotADirectory(walked));
            }
            current = match node.children()?.get(segment) {
                Some(child) => *child,
                None => return Err(Error::NotFound(walked)),
            };
        }

        Ok(current)
    }

    /// Insert `child` into `parent` under the child's own name.
    ///
    /// An entry already stored under that name is unlinked and returned so
    /// the caller can reclaim it. A child still linked elsewhere is detached
    /// from its old parent first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<Option<NodeId>> {
        let parent_node = self.get(parent)?;
        if !parent_node.is_dir() {
            return Err(Error::NotADirectory(self.full_path(parent)));
        }

        let child_node = self.get(child)?;
        let name = child_node.name().to_string();
        if let Some(old_parent) = child_node.parent() {
            if old_parent != parent {
                self.detach(old_parent, child)?;
            }
        }

        let displaced = self.get_mut(parent)?.children_mut()?.insert(name, child);
        self.get_mut(child)?.set_parent(Some(parent));

        match displaced {
            Some(previous) if previous != child => {
                self.get_mut(previous)?.set_parent(None);
                Ok(Some(previous))
            }
            _ => Ok(None),
        }
    }

    /// Remove `child` from `parent` and clear its back-reference.
    ///
    /// Only unlinks the slot when it actually holds `child`.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let name = self.get(child)?.name().to_string();
        let children = self.get_mut(parent)?.children_mut()?;
        if children.get(&name) == Some(&child) {
            children.shift_remove(&name);
        }

        let child_node = self.get_mut(child)?;
        if child_node.parent() == Some(parent) {
            child_node.set_parent(None);
        }
        Ok(())
    }

    /// Empty a directory of all descendants, deepest first; no-op on files.
    ///
    /// Each descendant is unlinked only after its own subtree is gone, so the
    /// tree stays consistent if a step fails.
    pub fn truncate(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        if !node.is_dir() {
            return Ok(());
        }

        let children: Vec<NodeId> = node.children()?.values().copied().collect();
        for child in children {
            self.truncate(child)?;
            self.detach(id, child)?;
            self.forget(child);
        }
        Ok(())
    }

    /// Drop a detached node and its whole subtree from the arena.
    pub fn reclaim(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidOperation(
                "cannot reclaim the root".to_string(),
            ));
        }
        if self.get(id)?.parent().is_some() {
            return Err(Error::InvalidOperation(format!(
                "cannot reclaim attached node {}",
                self.full_path(id)
            )));
        }
        self.truncate(id)?;
        self.forget(id);
        Ok(())
    }

    /// True if `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(Node::parent);
        }
        false
    }

    /// Names of the ancestors of `id`, root first, joined with `/`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = self.nodes.get(&id).and_then(Node::parent);
        while let Some(node_id) = current {
            match self.nodes.get(&node_id) {
                Some(node) => {
                    names.push(node.name());
                    current = node.parent();
                }
                None => break,
            }
        }
        names.reverse();
        names.join("/")
    }

    /// `path_of(id)` plus the node's own name: `./a/b` for reachable nodes.
    pub fn full_path(&self, id: NodeId) -> String {
        let name = self.nodes.get(&id).map(Node::name).unwrap_or_default();
        let path = self.path_of(id);
        if path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", path, name)
        }
    }

    /// Sorted full paths of every node below the root.
    pub fn file_map(&self) -> Vec<String> {
        let mut paths = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(children) = self.nodes.get(&id).and_then(|n| n.children().ok()) else {
                continue;
            };
            for child in children.values() {
                paths.push(self.full_path(*child));
                stack.push(*child);
            }
        }
        paths.sort();
        paths
    }

    /// Usage snapshot over every node except the root.
    pub fn usage(&self) -> FsUsage {
        self.usage
    }
}

fn stale(id: NodeId) -> Error {
    Error::InvalidOperation(format!("stale node handle #{}", id.get()))
}
