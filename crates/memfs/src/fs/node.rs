//! Tree entries for the in-memory store.

use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::traits::{FileType, Metadata};
use crate::error::{Error, Result};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique node identity, also the node's handle in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Payload of a node; fixed at construction.
#[derive(Debug)]
pub(crate) enum NodeKind {
    Directory { children: IndexMap<String, NodeId> },
    File { content: Vec<u8> },
}

/// A single file or directory.
///
/// Children are held by handle; the arena in [`Tree`](super::tree::Tree)
/// owns the nodes themselves. `parent` is a back-reference and never keeps a
/// node alive.
#[derive(Debug)]
pub(crate) struct Node {
    id: NodeId,
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    created: SystemTime,
    modified: SystemTime,
    accessed: SystemTime,
}

impl Node {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let now = SystemTime::now();
        Self {
            id: NodeId::next(),
            name: name.into(),
            kind,
            parent: None,
            created: now,
            modified: now,
            accessed: now,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(
            name,
            NodeKind::Directory {
                children: IndexMap::new(),
            },
        )
    }

    pub fn file(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self::new(name, NodeKind::File { content })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(super) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::Directory { .. } => FileType::Directory,
            NodeKind::File { .. } => FileType::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Content length for files, 0 for directories.
    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { content } => content.len() as u64,
            NodeKind::Directory { .. } => 0,
        }
    }

    /// True for directories with at least one child.
    pub fn has_children(&self) -> bool {
        match &self.kind {
            NodeKind::Directory { children } => !children.is_empty(),
            NodeKind::File { .. } => false,
        }
    }

    /// Read content, stamping the access time.
    pub fn read_content(&mut self) -> Result<&[u8]> {
        match &self.kind {
            NodeKind::File { content } => {
                self.accessed = SystemTime::now();
                Ok(content.as_slice())
            }
            NodeKind::Directory { .. } => Err(Error::InvalidOperation(
                "cannot get content from a directory".to_string(),
            )),
        }
    }

    /// Replace content, stamping the modification time.
    pub fn write_content(&mut self, data: Vec<u8>) -> Result<()> {
        match &mut self.kind {
            NodeKind::File { content } => {
                *content = data;
                self.modified = SystemTime::now();
                Ok(())
            }
            NodeKind::Directory { .. } => Err(Error::InvalidOperation(
                "cannot set content on a directory".to_string(),
            )),
        }
    }

    pub fn children(&self) -> Result<&IndexMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(not_a_directory()),
        }
    }

    pub(super) fn children_mut(&mut self) -> Result<&mut IndexMap<String, NodeId>> {
        match &mut self.kind {
            NodeKind::Directory { children } => Ok(children),
            NodeKind::File { .. } => Err(not_a_directory()),
        }
    }

    /// Project into the public metadata shape. Does not count as an access.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            file_type: self.file_type(),
            size: self.size(),
            created: self.created,
            modified: self.modified,
            accessed: self.accessed,
        }
    }
}

fn not_a_directory() -> Error {
    Error::InvalidOperation("not a directory".to_string())
}
