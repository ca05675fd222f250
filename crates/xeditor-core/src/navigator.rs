//! File tree navigator.
//!
//! ## Learning: Lazy Trees
//!
//! Reading a whole home directory up front is slow and mostly wasted.
//! Each directory node reads its entries the first time it is expanded
//! and keeps them until `refresh` is called.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// A file or directory in the tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub children: Vec<FileNode>,
    pub expanded: bool,
    pub depth: u16,

    /// Whether `children` has been read from disk
    loaded: bool,
}

impl FileNode {
    fn from_path(path: &Path, depth: u16) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            name,
            path: path.to_path_buf(),
            is_dir: path.is_dir(),
            children: Vec::new(),
            expanded: false,
            depth,
            loaded: false,
        })
    }

    fn root(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path: path.to_path_buf(),
            is_dir: true,
            children: Vec::new(),
            expanded: true,
            depth: 0,
            loaded: false,
        }
    }

    fn load_children(&mut self, excluded: &[String]) {
        if !self.is_dir || self.loaded {
            return;
        }
        self.loaded = true;

        let entries = match std::fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", self.path.display(), e);
                return;
            }
        };

        let mut children: Vec<FileNode> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                !name.starts_with('.') && !excluded.iter().any(|x| *x == name)
            })
            .filter_map(|e| FileNode::from_path(&e.path(), self.depth + 1))
            .collect();

        // Directories first, then by name ignoring case
        children.sort_by(|a, b| match (a.is_dir, b.is_dir) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });

        self.children = children;
    }

    fn find_mut(&mut self, path: &Path) -> Option<&mut FileNode> {
        if self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter_mut().find_map(|c| c.find_mut(path))
    }

    fn collect_expanded(&self, out: &mut HashSet<PathBuf>) {
        if self.is_dir && self.expanded {
            out.insert(self.path.clone());
            for child in &self.children {
                child.collect_expanded(out);
            }
        }
    }

    fn reexpand(&mut self, expanded: &HashSet<PathBuf>, excluded: &[String]) {
        if !expanded.contains(&self.path) {
            return;
        }
        self.expanded = true;
        self.load_children(excluded);
        for child in &mut self.children {
            child.reexpand(expanded, excluded);
        }
    }

    fn push_visible<'a>(&'a self, rows: &mut Vec<&'a FileNode>) {
        rows.push(self);
        if self.expanded {
            for child in &self.children {
                child.push_visible(rows);
            }
        }
    }
}

/// What activating a row did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorAction {
    /// A file was activated and should be opened.
    Open(PathBuf),
    /// A directory was expanded or collapsed.
    Toggled { expanded: bool },
}

/// Read-only tree view of a directory.
#[derive(Debug, Clone)]
pub struct Navigator {
    root: FileNode,

    /// Entry names that are never listed
    excluded: Vec<String>,
}

impl Navigator {
    /// Creates a navigator rooted at `root` with its first level loaded.
    pub fn new(root: impl AsRef<Path>, excluded: Vec<String>) -> Self {
        let mut root = FileNode::root(root.as_ref());
        root.load_children(&excluded);
        Self { root, excluded }
    }

    /// The home directory, or the working directory when there is none.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn root(&self) -> &Path {
        &self.root.path
    }

    pub fn root_node(&self) -> &FileNode {
        &self.root
    }

    /// Re-roots the tree at another directory.
    pub fn set_root(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(CoreError::FileNotFound(path.display().to_string()));
        }
        let mut root = FileNode::root(path);
        root.load_children(&self.excluded);
        self.root = root;
        tracing::info!("Navigator root set to {}", path.display());
        Ok(())
    }

    /// Activates the row for `path`.
    ///
    /// Files yield `Open`; directories toggle and load their children on
    /// first expansion.
    pub fn activate(&mut self, path: &Path) -> CoreResult<NavigatorAction> {
        let excluded = &self.excluded;
        let node = self
            .root
            .find_mut(path)
            .ok_or_else(|| CoreError::FileNotFound(path.display().to_string()))?;

        if !node.is_dir {
            return Ok(NavigatorAction::Open(node.path.clone()));
        }

        node.expanded = !node.expanded;
        if node.expanded {
            node.load_children(excluded);
        }
        Ok(NavigatorAction::Toggled {
            expanded: node.expanded,
        })
    }

    /// Re-reads the tree from disk, keeping expanded directories expanded.
    pub fn refresh(&mut self) {
        let mut expanded = HashSet::new();
        self.root.collect_expanded(&mut expanded);

        let mut root = FileNode::root(&self.root.path);
        root.reexpand(&expanded, &self.excluded);
        root.load_children(&self.excluded);
        self.root = root;
    }

    /// Rows currently shown, root first, in display order.
    pub fn visible_rows(&self) -> Vec<&FileNode> {
        let mut rows = Vec::new();
        self.root.push_visible(&mut rows);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::create_dir(root.join("Docs")).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::create_dir(root.join("node_modules")).unwrap();
        std::fs::write(root.join("b.py"), "").unwrap();
        std::fs::write(root.join("A.txt"), "").unwrap();
        std::fs::write(root.join(".hidden"), "").unwrap();
        std::fs::write(root.join("src").join("main.py"), "").unwrap();
        dir
    }

    fn names(nav: &Navigator) -> Vec<String> {
        nav.visible_rows()
            .into_iter()
            .skip(1)
            .map(|n| n.name.clone())
            .collect()
    }

    #[test]
    fn test_sorting_and_filtering() {
        let dir = fixture();
        let nav = Navigator::new(dir.path(), vec!["node_modules".to_string()]);
        assert_eq!(names(&nav), ["Docs", "src", "A.txt", "b.py"]);
    }

    #[test]
    fn test_activate_file_opens() {
        let dir = fixture();
        let mut nav = Navigator::new(dir.path(), Vec::new());
        let file = dir.path().join("b.py");
        assert_eq!(nav.activate(&file).unwrap(), NavigatorAction::Open(file));
    }

    #[test]
    fn test_activate_dir_toggles_lazily() {
        let dir = fixture();
        let mut nav = Navigator::new(dir.path(), Vec::new());
        let src = dir.path().join("src");

        assert!(!names(&nav).contains(&"main.py".to_string()));
        assert_eq!(
            nav.activate(&src).unwrap(),
            NavigatorAction::Toggled { expanded: true }
        );
        assert!(names(&nav).contains(&"main.py".to_string()));

        assert_eq!(
            nav.activate(&src).unwrap(),
            NavigatorAction::Toggled { expanded: false }
        );
        assert!(!names(&nav).contains(&"main.py".to_string()));
    }

    #[test]
    fn test_refresh_keeps_expansion_and_sees_new_files() {
        let dir = fixture();
        let mut nav = Navigator::new(dir.path(), Vec::new());
        nav.activate(&dir.path().join("src")).unwrap();

        std::fs::write(dir.path().join("src").join("util.py"), "").unwrap();
        nav.refresh();
        assert!(names(&nav).contains(&"util.py".to_string()));
    }

    #[test]
    fn test_set_root() {
        let dir = fixture();
        let mut nav = Navigator::new(dir.path(), Vec::new());
        nav.set_root(dir.path().join("src")).unwrap();
        assert_eq!(names(&nav), ["main.py"]);
        assert!(nav.set_root(dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_unknown_path() {
        let dir = fixture();
        let mut nav = Navigator::new(dir.path(), Vec::new());
        assert!(nav.activate(Path::new("/definitely/not/here")).is_err());
    }
}
