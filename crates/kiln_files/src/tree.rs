//! The composable file tree handle.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use kiln_common::WorkId;

use crate::entry::{ClosureVisitor, FileEntry, FileVisitor};
use crate::error::FileTreeError;
use crate::leaf::LeafTree;
use crate::pattern::PatternSet;
use crate::refinement::{EntryPredicate, Refinement};

/// A lazy, immutable description of a set of files.
///
/// Cloning is O(1) and shares structure. Trees compose by object graph:
/// [`union`](Self::union) records its operands, [`refine`](Self::refine)
/// records the refinement, and nothing is evaluated until
/// [`visit`](Self::visit) or [`resolve_leaves`](Self::resolve_leaves).
#[derive(Clone)]
pub struct FileTree {
    node: Arc<Node>,
}

enum Node {
    Empty,
    Leaf(LeafTree),
    Union(Vec<FileTree>),
    Filtered {
        source: FileTree,
        refinement: Refinement,
    },
    Produced {
        source: FileTree,
        producers: BTreeSet<WorkId>,
    },
}

impl FileTree {
    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// A tree with no entries.
    pub fn empty() -> Self {
        Self::from_node(Node::Empty)
    }

    /// A tree covering everything below `root`.
    pub fn directory(root: impl Into<std::path::PathBuf>) -> Self {
        Self::from(LeafTree::directory(root))
    }

    /// A tree covering an explicit list of files under `base`.
    pub fn files<I, S>(base: impl Into<std::path::PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from(LeafTree::files(base, files))
    }

    /// Returns a tree whose entries are this tree's followed by `other`'s.
    ///
    /// Order is preserved and duplicates are kept.
    pub fn union(&self, other: &FileTree) -> FileTree {
        Self::from_node(Node::Union(vec![self.clone(), other.clone()]))
    }

    /// Returns the union of `trees` in iteration order.
    pub fn union_all<I>(trees: I) -> FileTree
    where
        I: IntoIterator<Item = FileTree>,
    {
        Self::from_node(Node::Union(trees.into_iter().collect()))
    }

    /// Returns a tree narrowed by `refinement`.
    ///
    /// On resolution the refinement is applied to each leaf this tree
    /// resolves into, on top of any refinement already present.
    pub fn refine(&self, refinement: Refinement) -> FileTree {
        match self.node.as_ref() {
            Node::Leaf(leaf) => Self::from(leaf.refined(refinement)),
            _ => Self::from_node(Node::Filtered {
                source: self.clone(),
                refinement,
            }),
        }
    }

    /// Returns a tree narrowed by include/exclude patterns.
    pub fn matching(&self, patterns: PatternSet) -> FileTree {
        self.refine(Refinement::Patterns(patterns))
    }

    /// Returns a tree narrowed by a predicate over entries.
    pub fn filter<F>(&self, predicate: F) -> FileTree
    where
        F: Fn(&FileEntry) -> bool + Send + Sync + 'static,
    {
        self.refine(Refinement::Predicate(EntryPredicate::new(predicate)))
    }

    /// Records that the unit of work `producer` must run before this tree's
    /// contents are final.
    pub fn built_by(&self, producer: impl Into<WorkId>) -> FileTree {
        self.built_by_all([producer.into()])
    }

    /// Records several producers at once.
    pub fn built_by_all<I>(&self, producers: I) -> FileTree
    where
        I: IntoIterator<Item = WorkId>,
    {
        Self::from_node(Node::Produced {
            source: self.clone(),
            producers: producers.into_iter().collect(),
        })
    }

    /// The units of work producing this tree's contents, gathered through
    /// every union and filter.
    pub fn producers(&self) -> BTreeSet<WorkId> {
        let mut acc = BTreeSet::new();
        self.collect_producers(&mut acc);
        acc
    }

    fn collect_producers(&self, acc: &mut BTreeSet<WorkId>) {
        match self.node.as_ref() {
            Node::Empty | Node::Leaf(_) => {}
            Node::Union(children) => {
                for child in children {
                    child.collect_producers(acc);
                }
            }
            Node::Filtered { source, .. } => source.collect_producers(acc),
            Node::Produced { source, producers } => {
                acc.extend(producers.iter().cloned());
                source.collect_producers(acc);
            }
        }
    }

    /// Resolves the tree into its leaves, in visitation order, with every
    /// enclosing refinement applied to each leaf.
    ///
    /// Does not touch the filesystem.
    pub fn resolve_leaves(&self) -> Vec<LeafTree> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, acc: &mut Vec<LeafTree>) {
        match self.node.as_ref() {
            Node::Empty => {}
            Node::Leaf(leaf) => acc.push(leaf.clone()),
            Node::Union(children) => {
                for child in children {
                    child.collect_leaves(acc);
                }
            }
            Node::Filtered { source, refinement } => {
                acc.extend(
                    source
                        .resolve_leaves()
                        .into_iter()
                        .map(|leaf| leaf.refined(refinement.clone())),
                );
            }
            Node::Produced { source, .. } => source.collect_leaves(acc),
        }
    }

    /// Walks the tree, reporting every admitted entry to `visitor`.
    ///
    /// Leaves are visited in insertion order. Each call reads the disk anew.
    pub fn visit(&self, visitor: &mut dyn FileVisitor) -> Result<(), FileTreeError> {
        for leaf in self.resolve_leaves() {
            leaf.visit(visitor)?;
        }
        Ok(())
    }

    /// Walks the tree like [`visit`](Self::visit), skipping leaves whose root
    /// or listed files do not exist yet.
    pub fn visit_present(&self, visitor: &mut dyn FileVisitor) -> Result<(), FileTreeError> {
        for leaf in self.resolve_leaves() {
            leaf.visit_present(visitor)?;
        }
        Ok(())
    }

    /// Walks the tree, calling `f` for every admitted file and directory.
    pub fn visit_with<F>(&self, f: F) -> Result<(), FileTreeError>
    where
        F: FnMut(&FileEntry),
    {
        self.visit(&mut ClosureVisitor(f))
    }

    /// Collects every admitted entry, files and directories, in visitation order.
    pub fn entries(&self) -> Result<Vec<FileEntry>, FileTreeError> {
        let mut entries = Vec::new();
        self.visit_with(|e| entries.push(e.clone()))?;
        Ok(entries)
    }

    /// Collects every admitted file in visitation order.
    pub fn files_list(&self) -> Result<Vec<FileEntry>, FileTreeError> {
        struct Files(Vec<FileEntry>);
        impl FileVisitor for Files {
            fn visit_file(&mut self, entry: &FileEntry) {
                self.0.push(entry.clone());
            }
        }
        let mut files = Files(Vec::new());
        self.visit(&mut files)?;
        Ok(files.0)
    }

    /// Returns `true` if both handles refer to the same tree node.
    pub fn same_tree(&self, other: &FileTree) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Human-readable description used in diagnostics.
    pub fn display_name(&self) -> String {
        match self.node.as_ref() {
            Node::Empty => "empty file tree".to_string(),
            Node::Leaf(leaf) => leaf.display_name(),
            Node::Union(_) => "file tree".to_string(),
            Node::Filtered { source, .. } | Node::Produced { source, .. } => {
                source.display_name()
            }
        }
    }
}

impl From<LeafTree> for FileTree {
    fn from(leaf: LeafTree) -> Self {
        Self::from_node(Node::Leaf(leaf))
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.as_ref() {
            Node::Empty => write!(f, "FileTree::Empty"),
            Node::Leaf(leaf) => f.debug_tuple("FileTree::Leaf").field(leaf).finish(),
            Node::Union(children) => f.debug_tuple("FileTree::Union").field(children).finish(),
            Node::Filtered { source, refinement } => f
                .debug_struct("FileTree::Filtered")
                .field("source", source)
                .field("refinement", refinement)
                .finish(),
            Node::Produced { source, producers } => f
                .debug_struct("FileTree::Produced")
                .field("source", source)
                .field("producers", producers)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn relative(tree: &FileTree) -> Vec<String> {
        tree.entries()
            .unwrap()
            .iter()
            .map(|e| e.relative_path().to_string())
            .collect()
    }

    fn txt() -> PatternSet {
        PatternSet::new().include("*.txt").unwrap()
    }

    #[test]
    fn filtered_union_keeps_order_among_survivors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", "a");
        write(dir.path(), "b.log", "b");
        write(dir.path(), "c.txt", "c");

        let tree = FileTree::files(dir.path(), ["a.txt", "b.log"])
            .union(&FileTree::files(dir.path(), ["c.txt"]))
            .matching(txt());
        assert_eq!(relative(&tree), vec!["a.txt", "c.txt"]);
    }

    #[test]
    fn union_is_order_preserving_and_associative() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a", "b", "c"] {
            write(dir.path(), name, name);
        }
        let a = FileTree::files(dir.path(), ["a"]);
        let b = FileTree::files(dir.path(), ["b"]);
        let c = FileTree::files(dir.path(), ["c"]);

        let left = a.union(&b).union(&c);
        let right = a.union(&b.union(&c));
        assert_eq!(relative(&left), vec!["a", "b", "c"]);
        assert_eq!(relative(&left), relative(&right));
    }

    #[test]
    fn union_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a", "a");
        let a = FileTree::files(dir.path(), ["a"]);
        assert_eq!(relative(&a.union(&a)), vec!["a", "a"]);
    }

    #[test]
    fn filter_is_applied_relative_to_each_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one/top.txt", "1");
        write(dir.path(), "one/nested/deep.txt", "2");
        write(dir.path(), "two/other.txt", "3");

        // `*.txt` is root-relative: only top-level files of each root match.
        let tree = FileTree::directory(dir.path().join("one"))
            .union(&FileTree::directory(dir.path().join("two")))
            .matching(txt());
        assert_eq!(relative(&tree), vec!["top.txt", "other.txt"]);
    }

    #[test]
    fn filter_distributes_over_union() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x/a.txt", "a");
        write(dir.path(), "x/b.md", "b");
        write(dir.path(), "y/c.txt", "c");
        let a = FileTree::directory(dir.path().join("x"));
        let b = FileTree::directory(dir.path().join("y"));

        let filtered_union = a.union(&b).matching(txt());
        let union_of_filtered = a.matching(txt()).union(&b.matching(txt()));
        assert_eq!(relative(&filtered_union), relative(&union_of_filtered));
    }

    #[test]
    fn successive_filters_intersect() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.txt", "1");
        write(dir.path(), "drop.txt", "2");
        write(dir.path(), "keep.md", "3");

        let tree = FileTree::directory(dir.path())
            .union(&FileTree::empty())
            .matching(txt())
            .filter(|e| e.name().starts_with("keep"));
        assert_eq!(relative(&tree), vec!["keep.txt"]);
    }

    #[test]
    fn composition_is_lazy() {
        let tree = FileTree::directory("/definitely/not/here")
            .union(&FileTree::files("/nope", ["x"]))
            .matching(txt())
            .built_by(":gen");
        assert_eq!(tree.resolve_leaves().len(), 2);

        let err = tree.entries().unwrap_err();
        assert!(matches!(err, FileTreeError::MissingRoot { .. }));
    }

    #[test]
    fn visit_present_skips_missing_leaves() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "out/a.bin", "a");
        let tree = FileTree::directory(dir.path().join("missing"))
            .union(&FileTree::files(dir.path(), ["gone.bin", "out/a.bin"]));

        let mut seen = Vec::new();
        tree.visit_present(&mut ClosureVisitor(|e: &FileEntry| {
            seen.push(e.relative_path().to_string())
        }))
        .unwrap();
        assert_eq!(seen, vec!["out/a.bin"]);
        assert!(tree.entries().is_err());
    }

    #[test]
    fn resolution_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/b.txt", "b");
        write(dir.path(), "c.txt", "c");
        let tree = FileTree::directory(dir.path()).union(&FileTree::directory(dir.path()));
        assert_eq!(tree.entries().unwrap(), tree.entries().unwrap());
    }

    #[test]
    fn producers_survive_union_and_filter() {
        let a = FileTree::directory("gen-a").built_by(":generateA");
        let b = FileTree::directory("gen-b").built_by_all([WorkId::new(":generateB"), WorkId::new(":prepare")]);
        let plain = FileTree::directory("src");

        let tree = a.union(&plain).union(&b).matching(txt()).filter(|_| true);
        let producers: Vec<_> = tree.producers().into_iter().map(|w| w.to_string()).collect();
        assert_eq!(producers, vec![":generateA", ":generateB", ":prepare"]);
        assert!(plain.producers().is_empty());
    }

    #[test]
    fn files_list_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sub/a.txt", "a");
        let tree = FileTree::directory(dir.path());
        assert_eq!(tree.entries().unwrap().len(), 2);
        let files = tree.files_list().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path(), "sub/a.txt");
    }

    #[test]
    fn identity_is_by_object_graph() {
        let a = FileTree::directory("src");
        let b = FileTree::directory("src");
        assert!(a.same_tree(&a.clone()));
        assert!(!a.same_tree(&b));
    }

    #[test]
    fn display_name_passes_through_wrappers() {
        let tree = FileTree::directory("src").built_by(":gen").filter(|_| true);
        assert_eq!(tree.display_name(), "directory 'src'");
        assert_eq!(FileTree::empty().display_name(), "empty file tree");
        assert_eq!(
            FileTree::directory("a").union(&FileTree::directory("b")).display_name(),
            "file tree"
        );
    }

    #[test]
    fn empty_tree_visits_nothing() {
        assert!(FileTree::empty().entries().unwrap().is_empty());
        assert!(FileTree::default().producers().is_empty());
    }
}
