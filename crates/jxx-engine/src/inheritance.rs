//! Package-qualified inheritance tree
//!
//! Maps dotted class names to class handles through a tree of package
//! nodes, and keeps each class node's parent link. Two classes with the same
//! simple name in different packages live under different package nodes.
//! `java.lang.Object` is inserted on construction and is the implicit
//! parent of every class inserted without one.

use crate::model::ClassId;
use jxx_types::QualifiedType;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Handle of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inheritance tree errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeError {
    /// The name already dereferences to a node
    #[error("'{name}' is already inserted")]
    AlreadyInserted {
        /// Dotted name
        name: String,
    },

    /// A class name that has no node
    #[error("Unknown class '{name}'")]
    UnknownClass {
        /// Dotted name
        name: String,
    },

    /// A path that ends in a package instead of a class
    #[error("'{name}' names a package, not a class")]
    NotAClass {
        /// Dotted name
        name: String,
    },
}

#[derive(Debug, Clone)]
enum NodeKind {
    Package,
    Class { class: ClassId, parent: Option<NodeId> },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: FxHashMap<String, NodeId>,
}

/// Tree of package and class nodes
#[derive(Debug, Clone)]
pub struct InheritanceTree {
    nodes: Vec<Node>,
    root: NodeId,
    object: NodeId,
}

impl InheritanceTree {
    /// Create a tree holding only `java.lang.Object`.
    pub fn new(object: ClassId) -> Self {
        let mut tree = InheritanceTree {
            nodes: vec![Node {
                kind: NodeKind::Package,
                children: FxHashMap::default(),
            }],
            root: NodeId(0),
            object: NodeId(0),
        };
        let segments = QualifiedType::object().ancestry().to_vec();
        let package = tree.walk_or_create(&segments[..segments.len() - 1]);
        tree.object = tree.add_child(
            package,
            &segments[segments.len() - 1],
            NodeKind::Class {
                class: object,
                parent: None,
            },
        );
        tree
    }

    /// Insert a class under its package, creating package nodes on the way.
    ///
    /// A `None` parent attaches the class to `java.lang.Object`.
    pub fn insert(
        &mut self,
        name: &QualifiedType,
        parent: Option<&QualifiedType>,
        class: ClassId,
    ) -> Result<NodeId, TreeError> {
        if self.dereference(name).is_some() {
            return Err(TreeError::AlreadyInserted {
                name: name.dotted_name(),
            });
        }
        let parent = match parent {
            Some(parent) => self.class_node(parent)?,
            None => self.object,
        };

        let package = self.walk_or_create(name.package());
        Ok(self.add_child(
            package,
            name.simple_name(),
            NodeKind::Class {
                class,
                parent: Some(parent),
            },
        ))
    }

    /// Node for a qualified name.
    pub fn dereference(&self, name: &QualifiedType) -> Option<NodeId> {
        let segments: Vec<&str> = name.ancestry().iter().map(String::as_str).collect();
        self.dereference_path(&segments)
    }

    /// Node for a path of name segments.
    pub fn dereference_path(&self, segments: &[&str]) -> Option<NodeId> {
        let mut current = self.root;
        for segment in segments {
            current = *self.nodes[current.index()].children.get(*segment)?;
        }
        Some(current)
    }

    /// Class handle of the class at the end of a path.
    pub fn resolve(&self, segments: &[&str]) -> Option<ClassId> {
        self.dereference_path(segments).and_then(|node| self.class_of(node))
    }

    /// Point an inserted class at a new parent.
    ///
    /// Only the parent link changes; the node stays where it is and every
    /// descendant keeps its link to it.
    pub fn reparent(&mut self, child: &QualifiedType, parent: &QualifiedType) -> Result<(), TreeError> {
        let child = self.class_node(child)?;
        let parent = self.class_node(parent)?;
        if let NodeKind::Class { parent: link, .. } = &mut self.nodes[child.index()].kind {
            *link = Some(parent);
        }
        Ok(())
    }

    /// Class handle stored at a node.
    pub fn class_of(&self, node: NodeId) -> Option<ClassId> {
        match self.nodes[node.index()].kind {
            NodeKind::Class { class, .. } => Some(class),
            NodeKind::Package => None,
        }
    }

    /// Parent class node.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        match self.nodes[node.index()].kind {
            NodeKind::Class { parent, .. } => parent,
            NodeKind::Package => None,
        }
    }

    /// Class nodes from `node` up to the root class, `node` first.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = self.parent_of(node);
        while let Some(next) = current {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = self.parent_of(next);
        }
        chain
    }

    /// True when `ancestor` is reachable from `node` through parent links.
    pub fn descends_from(&self, node: NodeId, ancestor: NodeId) -> bool {
        node != ancestor && self.ancestors(node).contains(&ancestor)
    }

    fn class_node(&self, name: &QualifiedType) -> Result<NodeId, TreeError> {
        let node = self.dereference(name).ok_or_else(|| TreeError::UnknownClass {
            name: name.dotted_name(),
        })?;
        match self.nodes[node.index()].kind {
            NodeKind::Class { .. } => Ok(node),
            NodeKind::Package => Err(TreeError::NotAClass {
                name: name.dotted_name(),
            }),
        }
    }

    fn walk_or_create(&mut self, segments: &[String]) -> NodeId {
        let mut current = self.root;
        for segment in segments {
            current = match self.nodes[current.index()].children.get(segment) {
                Some(&next) => next,
                None => self.add_child(current, segment, NodeKind::Package),
            };
        }
        current
    }

    fn add_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            children: FxHashMap::default(),
        });
        self.nodes[parent.index()].children.insert(name.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(dotted: &str) -> QualifiedType {
        QualifiedType::parse(dotted).unwrap()
    }

    #[test]
    fn test_object_is_present() {
        let tree = InheritanceTree::new(ClassId(0));
        let node = tree.dereference(&QualifiedType::object()).unwrap();
        assert_eq!(tree.class_of(node), Some(ClassId(0)));
        assert_eq!(tree.parent_of(node), None);
        assert_eq!(tree.ancestors(node), vec![node]);
        let package = tree.dereference_path(&["java", "lang"]).unwrap();
        assert_eq!(tree.class_of(package), None);
    }

    #[test]
    fn test_same_simple_name_in_two_packages() {
        let mut tree = InheritanceTree::new(ClassId(0));
        let a = tree.insert(&name("pkg1.Foo"), None, ClassId(1)).unwrap();
        let b = tree.insert(&name("pkg2.Foo"), None, ClassId(2)).unwrap();
        tree.insert(&name("pkg1.Bar"), None, ClassId(3)).unwrap();

        assert_ne!(a, b);
        assert_eq!(tree.resolve(&["pkg1", "Foo"]), Some(ClassId(1)));
        assert_eq!(tree.resolve(&["pkg2", "Foo"]), Some(ClassId(2)));

        tree.reparent(&name("pkg1.Foo"), &name("pkg1.Bar")).unwrap();
        let bar = tree.dereference(&name("pkg1.Bar")).unwrap();
        assert_eq!(tree.parent_of(a), Some(bar));
        let object = tree.dereference(&QualifiedType::object()).unwrap();
        assert_eq!(tree.parent_of(b), Some(object));
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let mut tree = InheritanceTree::new(ClassId(0));
        tree.insert(&name("p.A"), None, ClassId(1)).unwrap();
        assert_eq!(
            tree.insert(&name("p.A"), None, ClassId(2)),
            Err(TreeError::AlreadyInserted {
                name: "p.A".to_string()
            })
        );
        assert_eq!(tree.resolve(&["p", "A"]), Some(ClassId(1)));
    }

    #[test]
    fn test_reparent_keeps_descendants() {
        let mut tree = InheritanceTree::new(ClassId(0));
        tree.insert(&name("p.A"), None, ClassId(1)).unwrap();
        let b = tree.insert(&name("p.B"), Some(&name("p.A")), ClassId(2)).unwrap();
        let c = tree.insert(&name("p.C"), Some(&name("p.B")), ClassId(3)).unwrap();
        tree.insert(&name("q.Late"), None, ClassId(4)).unwrap();

        tree.reparent(&name("p.A"), &name("q.Late")).unwrap();
        assert_eq!(tree.parent_of(c), Some(b));
        let late = tree.dereference(&name("q.Late")).unwrap();
        assert_eq!(tree.class_of(late), Some(ClassId(4)));
        assert!(tree.descends_from(c, late));
        assert!(!tree.descends_from(late, c));
        assert_eq!(tree.ancestors(c).len(), 5);
    }

    #[test]
    fn test_unknown_parent_and_package_paths() {
        let mut tree = InheritanceTree::new(ClassId(0));
        assert!(matches!(
            tree.insert(&name("p.A"), Some(&name("p.Missing")), ClassId(1)),
            Err(TreeError::UnknownClass { .. })
        ));
        tree.insert(&name("a.b.C"), None, ClassId(1)).unwrap();
        assert!(matches!(
            tree.reparent(&name("a.b.C"), &name("a.b")),
            Err(TreeError::NotAClass { .. })
        ));
        assert_eq!(tree.resolve(&["a", "b"]), None);
    }
}
