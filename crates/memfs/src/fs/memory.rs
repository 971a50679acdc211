//! In-memory filesystem implementation

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::limits::{FsLimits, FsUsage};
use super::node::{Node, NodeId};
use super::traits::{
    Content, DirEntry, Encoding, FileSystem, Metadata, MkdirOptions, ReadDirOptions, RmOptions,
};
use super::tree::Tree;
use crate::error::{Error, Result};
use crate::logging_impl::{fs_debug, fs_trace, LogConfig};
use crate::path;

/// In-memory filesystem.
///
/// Holds a tree of nodes rooted at `.`; nothing touches the disk. Each call
/// holds the tree lock for its whole body, so it observes and mutates one
/// consistent snapshot. Sequences of calls are not transactions.
///
/// # Example
///
/// ```rust
/// use memfs::{Encoding, FileSystem, InMemoryFs, MkdirOptions};
///
/// # tokio_test::block_on(async {
/// let fs = InMemoryFs::new();
/// fs.mkdir("docs/notes", MkdirOptions::recursive()).await?;
/// fs.write_file("docs/notes/today.txt", b"hello").await?;
///
/// let text = fs.read_file("docs/notes/today.txt", Encoding::Utf8).await?;
/// assert_eq!(text.into_text()?, "hello");
/// assert_eq!(fs.file_map(), vec!["./docs", "./docs/notes", "./docs/notes/today.txt"]);
/// # Ok::<(), memfs::Error>(())
/// # }).unwrap();
/// ```
pub struct InMemoryFs {
    tree: RwLock<Tree>,
    limits: FsLimits,
    log_config: LogConfig,
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFs {
    /// Create an empty, unbounded in-memory filesystem.
    ///
    /// Any content size and any name a POSIX filesystem accepts are allowed;
    /// use [`with_limits`](Self::with_limits) with [`FsLimits::new`] to opt
    /// into the bounded defaults.
    pub fn new() -> Self {
        Self::with_limits(FsLimits::unlimited())
    }

    /// Create an empty in-memory filesystem with custom limits.
    pub fn with_limits(limits: FsLimits) -> Self {
        Self {
            tree: RwLock::new(Tree::new()),
            limits,
            log_config: LogConfig::default(),
        }
    }

    /// Replace the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Configured limits.
    pub fn limits(&self) -> &FsLimits {
        &self.limits
    }

    /// Current usage statistics.
    pub fn usage(&self) -> FsUsage {
        self.read_tree().usage()
    }

    /// Sorted full paths (`./a`, `./a/b`, ...) of every entry in the store.
    ///
    /// Recomputed on each call; meant for whole-tree assertions in tests.
    pub fn file_map(&self) -> Vec<String> {
        self.read_tree().file_map()
    }

    fn read_tree(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the directory that is to contain `path`'s last segment.
    fn resolve_parent(tree: &Tree, path: &str) -> Result<NodeId> {
        let parent_path = path::dirname(path);
        let parent = tree.resolve(tree.root(), &parent_path)?;
        if !tree.get(parent)?.is_dir() {
            return Err(Error::NotADirectory(parent_path));
        }
        Ok(parent)
    }

    fn create_dir(&self, tree: &mut Tree, parent: NodeId, name: &str) -> Result<NodeId> {
        self.limits.check_new_node(&tree.usage())?;
        let id = tree.insert(Node::directory(name));
        tree.attach(parent, id)?;
        Ok(id)
    }

    fn mkdir_recursive(&self, tree: &mut Tree, path: &str) -> Result<()> {
        let mut current = tree.root();
        let mut walked = String::new();

        for segment in path::segments(path) {
            walked = path::join(&walked, segment);
            current = match tree.child(current, segment)? {
                Some(existing) if tree.get(existing)?.is_dir() => existing,
                Some(_) => return Err(Error::NotADirectory(walked)),
                None => {
                    fs_debug!("mkdir {}", self.log_config.format_path(&walked));
                    self.create_dir(tree, current, segment)?
                }
            };
        }
        Ok(())
    }

    fn list(
        tree: &Tree,
        dir: NodeId,
        parent_path: &str,
        recursive: bool,
        out: &mut Vec<DirEntry>,
    ) -> Result<()> {
        for child in tree.get(dir)?.children()?.values() {
            let node = tree.get(*child)?;
            out.push(DirEntry {
                name: node.name().to_string(),
                parent_path: parent_path.to_string(),
                file_type: node.file_type(),
            });
            if recursive && node.is_dir() {
                let child_path = path::join(parent_path, node.name());
                Self::list(tree, *child, &child_path, recursive, out)?;
            }
        }
        Ok(())
    }

    fn remove(tree: &mut Tree, path: &str, options: RmOptions) -> Result<()> {
        let id = tree.resolve(tree.root(), path)?;
        let node = tree.get(id)?;
        let has_children = node.has_children();
        let parent = node.parent();

        match (options.recursive, options.force) {
            (false, false) if has_children => return Err(Error::NotEmpty(path.to_string())),
            (false, true) if has_children => return Ok(()),
            (false, _) => {}
            (true, _) => tree.truncate(id)?,
        }

        // the root can be emptied but never unlinked
        if let Some(parent) = parent {
            tree.detach(parent, id)?;
            tree.reclaim(id)?;
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn stat(&self, path: &str) -> Result<Metadata> {
        let path = path::normalize(path);
        let tree = self.read_tree();
        let id = tree.resolve(tree.root(), &path)?;
        Ok(tree.get(id)?.metadata())
    }

    async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<()> {
        let path = path::normalize(path);
        self.limits.check_path(&path)?;
        let mut tree = self.write_tree();

        if options.recursive {
            return self.mkdir_recursive(&mut tree, &path);
        }

        let parent = Self::resolve_parent(&tree, &path)?;
        let name = path::basename(&path);
        if path == "." || tree.child(parent, &name)?.is_some() {
            return Err(Error::AlreadyExists(path));
        }

        fs_debug!("mkdir {}", self.log_config.format_path(&path));
        self.create_dir(&mut tree, parent, &name)?;
        Ok(())
    }

    async fn read_dir(&self, path: &str, options: ReadDirOptions) -> Result<Vec<DirEntry>> {
        let path = path::normalize(path);
        let tree = self.read_tree();
        let id = tree.resolve(tree.root(), &path)?;
        if !tree.get(id)?.is_dir() {
            return Err(Error::NotADirectory(path));
        }

        let mut entries = Vec::new();
        if options.recursive {
            Self::list(&tree, id, ".", true, &mut entries)?;
        } else {
            Self::list(&tree, id, &path, false, &mut entries)?;
        }
        Ok(entries)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = path::normalize(from);
        let to = path::normalize(to);
        self.limits.check_path(&to)?;
        let mut tree = self.write_tree();

        let id = tree.resolve(tree.root(), &from)?;
        let new_parent = Self::resolve_parent(&tree, &to)?;
        if id == tree.root() || to == "." {
            return Err(Error::InvalidOperation("cannot rename the root".to_string()));
        }
        if tree.is_ancestor(id, new_parent) {
            return Err(Error::InvalidOperation(format!(
                "cannot move {} into itself",
                from
            )));
        }

        let new_name = path::basename(&to);
        if tree.child(new_parent, &new_name)? == Some(id) {
            return Ok(());
        }

        fs_debug!(
            "rename {} -> {}",
            self.log_config.format_path(&from),
            self.log_config.format_path(&to)
        );
        if let Some(old_parent) = tree.get(id)?.parent() {
            tree.detach(old_parent, id)?;
        }
        tree.get_mut(id)?.set_name(new_name);
        if let Some(displaced) = tree.attach(new_parent, id)? {
            fs_debug!("rename replaced {}", self.log_config.format_path(&to));
            tree.reclaim(displaced)?;
        }
        Ok(())
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let path = path::normalize(path);
        self.limits.check_path(&path)?;
        let mut tree = self.write_tree();
        let usage = tree.usage();

        match tree.resolve(tree.root(), &path) {
            Ok(id) => {
                let node = tree.get(id)?;
                if node.is_dir() {
                    return Err(Error::IsADirectory(path));
                }
                self.limits.check_write(&usage, node.size(), content.len() as u64)?;
                fs_debug!(
                    "write_file {} {}",
                    self.log_config.format_path(&path),
                    self.log_config.format_content(content)
                );
                tree.write_content(id, content.to_vec())
            }
            Err(Error::NotFound(_)) => {
                let parent = Self::resolve_parent(&tree, &path)?;
                let name = path::basename(&path);
                self.limits.check_new_node(&usage)?;
                self.limits.check_write(&usage, 0, content.len() as u64)?;

                fs_debug!(
                    "write_file {} {} (new)",
                    self.log_config.format_path(&path),
                    self.log_config.format_content(content)
                );
                let id = tree.insert(Node::file(name, content.to_vec()));
                tree.attach(parent, id)?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn read_file(&self, path: &str, encoding: Encoding) -> Result<Content> {
        let path = path::normalize(path);
        let mut tree = self.write_tree();
        let id = tree.resolve(tree.root(), &path)?;
        let node = tree.get_mut(id)?;
        if node.is_dir() {
            return Err(Error::IsADirectory(path));
        }
        let bytes = node.read_content()?.to_vec();
        Content::decode(bytes, encoding, &path)
    }

    async fn rm(&self, path: &str, options: RmOptions) -> Result<()> {
        let path = path::normalize(path);
        let mut tree = self.write_tree();

        fs_debug!(
            "rm {} recursive={} force={}",
            self.log_config.format_path(&path),
            options.recursive,
            options.force
        );
        let result = Self::remove(&mut tree, &path, options);
        if let Err(err) = &result {
            fs_trace!("rm {}: {}", self.log_config.format_path(&path), err);
        }
        options.settle(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fs::{FileType, FsLimitExceeded};
    use pretty_assertions::assert_eq;

    async fn names(fs: &InMemoryFs, path: &str, recursive: bool) -> Vec<String> {
        fs.read_dir(path, ReadDirOptions { recursive })
            .await
            .unwrap()
            .iter()
            .map(DirEntry::path)
            .collect()
    }

    #[tokio::test]
    async fn test_write_and_read_file() {
        let fs = InMemoryFs::new();
        fs.write_file("test.txt", b"hello world").await.unwrap();

        let content = fs.read_file("test.txt", Encoding::Binary).await.unwrap();
        assert_eq!(content, Content::Bytes(b"hello world".to_vec()));
    }

    #[tokio::test]
    async fn test_mkdir_creates_directory() {
        let fs = InMemoryFs::new();
        fs.mkdir("test-dir", MkdirOptions::default()).await.unwrap();
        assert_eq!(fs.file_map(), vec!["./test-dir"]);
    }

    #[tokio::test]
    async fn test_mkdir_nested() {
        let fs = InMemoryFs::new();
        fs.mkdir("test-dir", MkdirOptions::default()).await.unwrap();
        fs.mkdir("test-dir/other-dir", MkdirOptions::default())
            .await
            .unwrap();
        fs.mkdir("test-dir12", MkdirOptions::default()).await.unwrap();
        fs.mkdir("test-dir12/other-dir", MkdirOptions::default())
            .await
            .unwrap();
        assert_eq!(
            fs.file_map(),
            vec![
                "./test-dir",
                "./test-dir/other-dir",
                "./test-dir12",
                "./test-dir12/other-dir",
            ]
        );
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_requires_parent() {
        let fs = InMemoryFs::new();
        let err = fs
            .mkdir("missing/child", MkdirOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(fs.file_map().is_empty());
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_rejects_existing() {
        let fs = InMemoryFs::new();
        fs.mkdir("a", MkdirOptions::default()).await.unwrap();
        let err = fs.mkdir("a", MkdirOptions::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        let err = fs.mkdir(".", MkdirOptions::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_mkdir_recursive_is_idempotent() {
        let fs = InMemoryFs::new();
        fs.mkdir("a/b/c", MkdirOptions::recursive()).await.unwrap();
        let before = fs.file_map();
        fs.mkdir("a/b/c", MkdirOptions::recursive()).await.unwrap();
        assert_eq!(fs.file_map(), before);
        assert_eq!(before, vec!["./a", "./a/b", "./a/b/c"]);
    }

    #[tokio::test]
    async fn test_mkdir_recursive_through_file_fails() {
        let fs = InMemoryFs::new();
        fs.write_file("f", b"x").await.unwrap();
        let err = fs.mkdir("f/sub", MkdirOptions::recursive()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
        let err = fs.mkdir("f", MkdirOptions::recursive()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_read_dir_flat_and_recursive() {
        let fs = InMemoryFs::new();
        fs.mkdir("pom", MkdirOptions::recursive()).await.unwrap();
        fs.mkdir("pim/poum", MkdirOptions::recursive()).await.unwrap();
        fs.mkdir("pim/pouf", MkdirOptions::recursive()).await.unwrap();
        fs.mkdir("pim/poush", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("pim/poush/test1", b"x").await.unwrap();
        fs.mkdir("pam", MkdirOptions::recursive()).await.unwrap();

        assert_eq!(names(&fs, ".", false).await, vec!["pom", "pim", "pam"]);
        assert_eq!(
            names(&fs, ".", true).await,
            vec![
                "pom",
                "pim",
                "pim/poum",
                "pim/pouf",
                "pim/poush",
                "pim/poush/test1",
                "pam",
            ]
        );
    }

    #[tokio::test]
    async fn test_read_dir_parent_paths() {
        let fs = InMemoryFs::new();
        fs.mkdir("a/b/c", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("a/b/c/f.txt", b"").await.unwrap();

        let flat = fs.read_dir("a/b", ReadDirOptions::default()).await.unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].parent_path, "a/b");
        assert_eq!(flat[0].file_type, FileType::Directory);

        let root = fs.read_dir("/", ReadDirOptions::default()).await.unwrap();
        assert_eq!(root[0].parent_path, ".");

        let deep = fs.read_dir("a", ReadDirOptions::recursive()).await.unwrap();
        let pairs: Vec<_> = deep
            .iter()
            .map(|e| (e.parent_path.as_str(), e.name.as_str()))
            .collect();
        assert_eq!(pairs, vec![(".", "b"), ("b", "c"), ("b/c", "f.txt")]);
    }

    #[tokio::test]
    async fn test_read_dir_on_file_fails() {
        let fs = InMemoryFs::new();
        fs.write_file("f", b"x").await.unwrap();
        let err = fs
            .read_dir("f", ReadDirOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_rename_same_directory() {
        let fs = InMemoryFs::new();
        fs.mkdir("from", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("from/test.dat", "test-ééé".as_bytes())
            .await
            .unwrap();
        fs.rename("from/test.dat", "from/rename-1.dat").await.unwrap();

        let text = fs
            .read_file("from/rename-1.dat", Encoding::Utf8)
            .await
            .unwrap();
        assert_eq!(text, Content::Text("test-ééé".to_string()));
        let err = fs.stat("from/test.dat").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_across_directories() {
        let fs = InMemoryFs::new();
        fs.mkdir("from", MkdirOptions::recursive()).await.unwrap();
        fs.mkdir("to", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("from/test.dat", b"data").await.unwrap();
        assert_eq!(fs.file_map(), vec!["./from", "./from/test.dat", "./to"]);

        fs.rename("from/test.dat", "to/rename-2.dat").await.unwrap();
        assert_eq!(fs.file_map(), vec!["./from", "./to", "./to/rename-2.dat"]);
    }

    #[tokio::test]
    async fn test_rename_moves_subtree() {
        let fs = InMemoryFs::new();
        fs.mkdir("a/b/c", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("a/b/c/f", b"deep").await.unwrap();
        fs.mkdir("z", MkdirOptions::recursive()).await.unwrap();

        fs.rename("a/b", "z/moved").await.unwrap();
        assert_eq!(
            fs.file_map(),
            vec!["./a", "./z", "./z/moved", "./z/moved/c", "./z/moved/c/f"]
        );
        let content = fs.read_file("z/moved/c/f", Encoding::Binary).await.unwrap();
        assert_eq!(content.as_bytes(), b"deep");
    }

    #[tokio::test]
    async fn test_rename_replaces_and_reclaims_destination() {
        let fs = InMemoryFs::with_limits(FsLimits::unlimited());
        fs.mkdir("dst/inner", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("dst/inner/old", b"old").await.unwrap();
        fs.write_file("src", b"new").await.unwrap();

        fs.rename("src", "dst").await.unwrap();
        assert_eq!(fs.file_map(), vec!["./dst"]);
        assert_eq!(fs.usage(), FsUsage::new(3, 1, 0));
        assert_eq!(fs.read_tree().len(), 2);
    }

    #[tokio::test]
    async fn test_rename_into_own_subtree_fails() {
        let fs = InMemoryFs::new();
        fs.mkdir("a/b", MkdirOptions::recursive()).await.unwrap();
        let err = fs.rename("a", "a/b/a").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(fs.file_map(), vec!["./a", "./a/b"]);

        let err = fs.rename(".", "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_rename_to_itself_is_noop() {
        let fs = InMemoryFs::new();
        fs.write_file("f", b"x").await.unwrap();
        fs.rename("f", "./f").await.unwrap();
        assert_eq!(fs.file_map(), vec!["./f"]);
    }

    #[tokio::test]
    async fn test_rename_missing_source_or_parent() {
        let fs = InMemoryFs::new();
        let err = fs.rename("nope", "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fs.write_file("f", b"x").await.unwrap();
        let err = fs.rename("f", "missing/f").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fs.file_map(), vec!["./f"]);
    }

    #[tokio::test]
    async fn test_rm_policy_matrix() {
        let fs = InMemoryFs::new();
        fs.mkdir("full/sub", MkdirOptions::recursive()).await.unwrap();
        fs.mkdir("empty", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("file", b"x").await.unwrap();

        // plain: file and empty dir go, full dir refuses
        fs.rm("file", RmOptions::new()).await.unwrap();
        fs.rm("empty", RmOptions::new()).await.unwrap();
        let err = fs.rm("full", RmOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEmpty);
        assert_eq!(fs.file_map(), vec!["./full", "./full/sub"]);

        // force only: full dir silently stays
        fs.rm("full", RmOptions::new().force(true)).await.unwrap();
        assert_eq!(fs.file_map(), vec!["./full", "./full/sub"]);

        // recursive: everything goes
        fs.rm("full", RmOptions::new().recursive(true)).await.unwrap();
        assert!(fs.file_map().is_empty());
        assert_eq!(fs.read_tree().len(), 1);
    }

    #[tokio::test]
    async fn test_rm_missing_path() {
        let fs = InMemoryFs::new();
        let err = fs.rm("ghost", RmOptions::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fs.rm("ghost", RmOptions::new().force(true)).await.unwrap();
        fs.rm("ghost", RmOptions::new().recursive(true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_rm_recursive_root_empties_store() {
        let fs = InMemoryFs::new();
        fs.mkdir("a/b", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("c", b"x").await.unwrap();
        fs.rm(".", RmOptions::new().recursive(true)).await.unwrap();
        assert!(fs.file_map().is_empty());
        assert!(fs.stat(".").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_write_file_overwrites_in_place() {
        let fs = InMemoryFs::new();
        fs.write_file("a", b"1").await.unwrap();
        fs.write_file("b", b"2").await.unwrap();
        fs.write_file("a", b"longer").await.unwrap();

        assert_eq!(names(&fs, ".", false).await, vec!["a", "b"]);
        assert_eq!(fs.stat("a").await.unwrap().size, 6);
    }

    #[tokio::test]
    async fn test_write_file_errors() {
        let fs = InMemoryFs::new();
        fs.mkdir("dir", MkdirOptions::recursive()).await.unwrap();
        let err = fs.write_file("dir", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IsADirectory);

        let err = fs.write_file("missing/f", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fs.write_file("file", b"x").await.unwrap();
        let err = fs.write_file("file/f", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[tokio::test]
    async fn test_read_file_on_directory_fails() {
        let fs = InMemoryFs::new();
        fs.mkdir("dir", MkdirOptions::recursive()).await.unwrap();
        let err = fs.read_file("dir", Encoding::Utf8).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IsADirectory);
    }

    #[tokio::test]
    async fn test_stat_does_not_touch_access_time() {
        let fs = InMemoryFs::new();
        fs.write_file("f", b"abc").await.unwrap();
        let first = fs.stat("f").await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = fs.stat("f").await.unwrap();
        assert_eq!(first.accessed, second.accessed);
        assert_eq!(second.name, "f");
        assert_eq!(second.size, 3);
        assert!(second.is_file());

        std::thread::sleep(std::time::Duration::from_millis(5));
        fs.read_file("f", Encoding::Binary).await.unwrap();
        assert!(fs.stat("f").await.unwrap().accessed > second.accessed);
    }

    #[tokio::test]
    async fn test_exists() {
        let fs = InMemoryFs::new();
        fs.write_file("here", b"").await.unwrap();
        assert!(fs.exists("here").await.unwrap());
        assert!(!fs.exists("there").await.unwrap());
        assert!(fs.exists(".").await.unwrap());
    }

    #[tokio::test]
    async fn test_limits_enforced_before_mutation() {
        let limits = FsLimits::new().max_file_size(4).max_node_count(2);
        let fs = InMemoryFs::with_limits(limits);

        let err = fs.write_file("big", b"12345").await.unwrap_err();
        assert!(matches!(
            err,
            Error::LimitExceeded(FsLimitExceeded::FileSize { size: 5, limit: 4 })
        ));
        assert!(fs.file_map().is_empty());

        fs.mkdir("a/b", MkdirOptions::recursive()).await.unwrap();
        let err = fs.write_file("a/c", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(fs.file_map(), vec!["./a", "./a/b"]);
    }

    #[tokio::test]
    async fn test_total_bytes_limit_counts_overwrite() {
        let fs = InMemoryFs::with_limits(FsLimits::new().max_total_bytes(10));
        fs.write_file("a", b"123456").await.unwrap();
        fs.write_file("a", b"1234567890").await.unwrap();
        let err = fs.write_file("b", b"1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[tokio::test]
    async fn test_unsafe_name_rejected_when_bounded() {
        let fs = InMemoryFs::with_limits(FsLimits::new());
        let err = fs.write_file("bad\u{202E}name", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[tokio::test]
    async fn test_default_store_is_unbounded() {
        let fs = InMemoryFs::new();
        let big = vec![7u8; 11_000_000];
        fs.write_file("big.bin", &big).await.unwrap();
        let content = fs.read_file("big.bin", Encoding::Binary).await.unwrap();
        assert_eq!(content.len(), big.len());

        fs.write_file("a\nb", b"newline").await.unwrap();
        fs.write_file("tab\tname", b"tab").await.unwrap();
        let text = fs.read_file("a\nb", Encoding::Utf8).await.unwrap();
        assert_eq!(text.into_text().unwrap(), "newline");

        let err = fs.write_file("nul\u{0}name", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[tokio::test]
    async fn test_usage() {
        let fs = InMemoryFs::new();
        fs.mkdir("d", MkdirOptions::recursive()).await.unwrap();
        fs.write_file("d/f", b"hello").await.unwrap();
        assert_eq!(fs.usage(), FsUsage::new(5, 1, 1));
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        use std::sync::Arc;

        let fs: Arc<dyn FileSystem> = Arc::new(InMemoryFs::new());
        let writer = Arc::clone(&fs);
        tokio::spawn(async move { writer.write_file("shared", b"x").await })
            .await
            .unwrap()
            .unwrap();
        assert!(fs.exists("shared").await.unwrap());
    }
}
