//! Configuration tree
//!
//! Sections and options live in one arena and point at their parent by
//! index. Every option owns its current expression and a cache slot; the
//! slot is the only thing evaluation ever writes.

use crate::ast::Expr;
use std::cell::RefCell;
use strata_core::{StrataError, StrataResult, Value};
use tracing::debug;

/// Name of the implicit top level section
pub const ROOT_NAME: &str = "<global>";

/// Index of a section or option in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One line of a section body, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEntry {
    Child(NodeId),
    Blank,
    Comment(String),
}

/// Memoized value of an option
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CacheSlot {
    #[default]
    Empty,
    Cached(Value),
}

#[derive(Debug)]
pub struct Section {
    pub name: String,
    pub parent: Option<NodeId>,
    /// Bracket count of the header; 0 for the root
    pub depth: usize,
    pub children: Vec<NodeId>,
    pub layout: Vec<LayoutEntry>,
}

#[derive(Debug)]
pub struct OptionEntry {
    pub name: String,
    pub parent: NodeId,
    pub expr: Expr,
    cache: RefCell<CacheSlot>,
}

impl OptionEntry {
    pub fn cached(&self) -> Option<Value> {
        match &*self.cache.borrow() {
            CacheSlot::Cached(value) => Some(value.clone()),
            CacheSlot::Empty => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(*self.cache.borrow(), CacheSlot::Cached(_))
    }

    pub(crate) fn store(&self, value: Value) {
        *self.cache.borrow_mut() = CacheSlot::Cached(value);
    }

    fn reset(&self) {
        *self.cache.borrow_mut() = CacheSlot::Empty;
    }
}

#[derive(Debug)]
pub enum Node {
    Section(Section),
    Option(OptionEntry),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Section(s) => &s.name,
            Node::Option(o) => &o.name,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Section(s) => s.parent,
            Node::Option(o) => Some(o.parent),
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Node::Section(_))
    }
}

/// Arena holding one document's sections and options
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Section(Section {
                name: ROOT_NAME.to_string(),
                parent: None,
                depth: 0,
                children: Vec::new(),
                layout: Vec::new(),
            })],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn section(&self, id: NodeId) -> Option<&Section> {
        match self.nodes.get(id.0) {
            Some(Node::Section(s)) => Some(s),
            _ => None,
        }
    }

    pub fn option(&self, id: NodeId) -> Option<&OptionEntry> {
        match self.nodes.get(id.0) {
            Some(Node::Option(o)) => Some(o),
            _ => None,
        }
    }

    /// Named child of a section
    pub fn child(&self, section: NodeId, name: &str) -> Option<NodeId> {
        let section = self.section(section)?;
        section
            .children
            .iter()
            .copied()
            .find(|id| self.node(*id).map(Node::name) == Some(name))
    }

    /// Dotted path from the root; the root itself has the empty path
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node_id != NodeId::ROOT => {
                    names.push(node.name().to_string());
                    current = node.parent();
                }
                _ => break,
            }
        }
        names.reverse();
        names.join(".")
    }

    pub fn new_section(&mut self, name: &str, parent: NodeId) -> StrataResult<NodeId> {
        let depth = self.check_insert(name, parent)?.depth + 1;
        let id = self.push(
            parent,
            Node::Section(Section {
                name: name.to_string(),
                parent: Some(parent),
                depth,
                children: Vec::new(),
                layout: Vec::new(),
            }),
        );
        debug!(section = %self.path(id), depth, "new section");
        Ok(id)
    }

    pub fn new_option(&mut self, name: &str, parent: NodeId, expr: Expr) -> StrataResult<NodeId> {
        self.check_insert(name, parent)?;
        let id = self.push(
            parent,
            Node::Option(OptionEntry {
                name: name.to_string(),
                parent,
                expr,
                cache: RefCell::new(CacheSlot::Empty),
            }),
        );
        debug!(option = %self.path(id), "new option");
        Ok(id)
    }

    fn check_insert(&self, name: &str, parent: NodeId) -> StrataResult<&Section> {
        let section = self.section(parent).ok_or_else(|| {
            StrataError::invalid_value(format!("'{}' is not a section", self.path(parent)))
        })?;
        if self.child(parent, name).is_some() {
            return Err(StrataError::duplicate_name(name, &section.name));
        }
        Ok(section)
    }

    fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(Node::Section(section)) = self.nodes.get_mut(parent.0) {
            section.children.push(id);
            section.layout.push(LayoutEntry::Child(id));
        }
        id
    }

    pub fn add_blank(&mut self, section: NodeId) {
        if let Some(Node::Section(s)) = self.nodes.get_mut(section.0) {
            s.layout.push(LayoutEntry::Blank);
        }
    }

    pub fn add_comment(&mut self, section: NodeId, text: &str) {
        if let Some(Node::Section(s)) = self.nodes.get_mut(section.0) {
            s.layout.push(LayoutEntry::Comment(text.to_string()));
        }
    }

    /// Replace an option's expression; the cache starts over
    pub fn set_expression(&mut self, option: NodeId, expr: Expr) -> StrataResult<()> {
        let path = self.path(option);
        match self.nodes.get_mut(option.0) {
            Some(Node::Option(entry)) => {
                entry.expr = expr;
                entry.reset();
                debug!(option = %path, "cache invalidated");
                Ok(())
            }
            _ => Err(StrataError::unresolved(&path).with_note("not an option")),
        }
    }

    /// Every option, depth first in document order
    pub fn options(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_options(NodeId::ROOT, &mut out);
        out
    }

    fn collect_options(&self, section: NodeId, out: &mut Vec<NodeId>) {
        let Some(section) = self.section(section) else { return };
        for entry in &section.layout {
            if let LayoutEntry::Child(id) = entry {
                match self.node(*id) {
                    Some(Node::Option(_)) => out.push(*id),
                    Some(Node::Section(_)) => self.collect_options(*id, out),
                    None => {}
                }
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ErrorKind;

    fn sample() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let a = tree.new_option("a", NodeId::ROOT, Expr::literal(1)).unwrap();
        let sec = tree.new_section("Sec", NodeId::ROOT).unwrap();
        (tree, a, sec)
    }

    #[test]
    fn test_paths_and_depth() {
        let (mut tree, a, sec) = sample();
        let sub = tree.new_section("Sub", sec).unwrap();
        let b = tree.new_option("b", sub, Expr::literal(2)).unwrap();
        assert_eq!(tree.path(a), "a");
        assert_eq!(tree.path(b), "Sec.Sub.b");
        assert_eq!(tree.path(NodeId::ROOT), "");
        assert_eq!(tree.section(sub).unwrap().depth, 2);
        assert_eq!(tree.child(sec, "Sub"), Some(sub));
        assert_eq!(tree.child(sec, "b"), None);
    }

    #[test]
    fn test_duplicate_names() {
        let (mut tree, a, sec) = sample();
        let err = tree.new_section("a", NodeId::ROOT).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        let err = tree.new_option("Sec", NodeId::ROOT, Expr::literal(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        // same name in another section is fine
        assert!(tree.new_option("a", sec, Expr::literal(3)).is_ok());
        assert!(tree.new_option("x", a, Expr::literal(3)).is_err());
    }

    #[test]
    fn test_layout_and_document_order() {
        let (mut tree, a, sec) = sample();
        tree.add_blank(NodeId::ROOT);
        tree.add_comment(sec, "# note");
        let b = tree.new_option("b", sec, Expr::literal(2)).unwrap();
        let c = tree.new_option("c", NodeId::ROOT, Expr::literal(3)).unwrap();
        assert_eq!(tree.options(), vec![a, b, c]);
        let layout = &tree.section(NodeId::ROOT).unwrap().layout;
        assert_eq!(
            layout,
            &vec![
                LayoutEntry::Child(a),
                LayoutEntry::Child(sec),
                LayoutEntry::Blank,
                LayoutEntry::Child(c)
            ]
        );
    }

    #[test]
    fn test_set_expression_resets_cache() {
        let (mut tree, a, sec) = sample();
        let entry = tree.option(a).unwrap();
        entry.store(Value::int(1));
        assert!(entry.is_cached());
        tree.set_expression(a, Expr::literal(5)).unwrap();
        let entry = tree.option(a).unwrap();
        assert_eq!(entry.cached(), None);
        assert_eq!(entry.expr, Expr::literal(5));
        assert!(tree.set_expression(sec, Expr::literal(5)).is_err());
    }
}
