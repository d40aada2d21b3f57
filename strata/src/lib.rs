//! Strata - hierarchical configuration with expression values
//!
//! Options hold expressions that may refer to any option in the enclosing
//! sections. Values are computed lazily and cached while they do not depend
//! on other options.
//!
//! ```text
//! [Section_1]
//! pi = 3.141
//! [[Sub_Section_1]]
//! tau = 2 * pi
//! ```

mod ast;
mod eval;
mod parser;
mod render;
mod resolve;
mod scanner;
mod tree;

pub use ast::Expr;
pub use eval::{Evaluated, Evaluator, DEFAULT_MAX_DEPTH};
pub use parser::{is_identifier, parse_expression, parse_statement};
pub use render::{print_tree, render, render_string};
pub use resolve::resolve;
pub use scanner::{scan, scan_str, ScanError};
pub use tree::{CacheSlot, LayoutEntry, Node, NodeId, OptionEntry, Section, Tree, ROOT_NAME};

use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use strata_builtins::{FunctionMeta, FunctionRegistry};
use strata_core::{StrataError, StrataResult, Value};
use tracing::warn;

/// Entry point: loads documents that share one function table
pub struct Strata {
    functions: Arc<FunctionRegistry>,
    max_depth: usize,
}

impl Strata {
    pub fn new() -> Self {
        Self {
            functions: Arc::new(FunctionRegistry::standard()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bound on nested option reads before `RecursionLimit`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse_str(&self, text: &str) -> StrataResult<Document> {
        self.parse_reader(text.as_bytes())
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> StrataResult<Document> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| StrataError::io(&path.display().to_string(), &e))?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> StrataResult<Document> {
        Ok(Document {
            tree: scan(reader)?,
            functions: self.functions.clone(),
            max_depth: self.max_depth,
        })
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        self.functions.list_functions(category)
    }
}

impl Default for Strata {
    fn default() -> Self {
        Self::new()
    }
}

/// New content for an option
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Fixed value, cached right away
    Static(Value),
    /// New definition, evaluated on the next read
    Expression(Expr),
}

/// A loaded configuration
pub struct Document {
    tree: Tree,
    functions: Arc<FunctionRegistry>,
    max_depth: usize,
}

impl Document {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.tree, &self.functions).with_max_depth(self.max_depth)
    }

    /// Node at a dotted path from the top level
    pub fn lookup(&self, path: &str) -> StrataResult<NodeId> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        resolve(&self.tree, &segments, NodeId::ROOT)
    }

    fn lookup_option(&self, path: &str) -> StrataResult<NodeId> {
        let id = self.lookup(path)?;
        match self.tree.node(id) {
            Some(Node::Option(_)) => Ok(id),
            _ => Err(StrataError::unresolved(path).with_note(format!("'{}' is a section, not an option", path))),
        }
    }

    /// Value of the option at `path`
    pub fn get(&self, path: &str) -> StrataResult<Value> {
        let id = self.lookup_option(path)?;
        self.evaluator().read(id)
    }

    pub fn set(&mut self, path: &str, assignment: Assignment) -> StrataResult<()> {
        let id = self.lookup_option(path)?;
        match assignment {
            Assignment::Expression(expr) => self.tree.set_expression(id, expr),
            Assignment::Static(value) => {
                match Expr::from_value(&value) {
                    Some(expr) => self.tree.set_expression(id, expr)?,
                    None => warn!(option = path, value = %value.repr(), "value has no source form, dump keeps the old expression"),
                }
                if let Some(entry) = self.tree.option(id) {
                    entry.store(value);
                }
                Ok(())
            }
        }
    }

    /// Replace an option's definition with parsed source text
    pub fn set_source(&mut self, path: &str, source: &str) -> StrataResult<()> {
        let expr = parse_expression(source).map_err(|e| e.in_option(path))?;
        self.set(path, Assignment::Expression(expr))
    }

    /// Rendered source of one option
    pub fn source(&self, path: &str) -> StrataResult<String> {
        let id = self.lookup_option(path)?;
        match self.tree.option(id) {
            Some(entry) => render(&entry.expr).map_err(|e| e.in_option(path)),
            None => Err(StrataError::unresolved(path)),
        }
    }

    /// Every option with its value or error, in document order
    pub fn evaluate_all(&self) -> Vec<(String, StrataResult<Value>)> {
        let evaluator = self.evaluator();
        self.tree
            .options()
            .into_iter()
            .map(|id| (self.tree.path(id), evaluator.read(id)))
            .collect()
    }

    /// Evaluated tree as nested JSON objects
    pub fn to_json(&self) -> StrataResult<JsonValue> {
        self.section_json(&self.evaluator(), NodeId::ROOT)
    }

    fn section_json(&self, evaluator: &Evaluator<'_>, id: NodeId) -> StrataResult<JsonValue> {
        let mut map = serde_json::Map::new();
        if let Some(section) = self.tree.section(id) {
            for child in &section.children {
                match self.tree.node(*child) {
                    Some(Node::Section(s)) => {
                        map.insert(s.name.clone(), self.section_json(evaluator, *child)?);
                    }
                    Some(Node::Option(o)) => {
                        map.insert(o.name.clone(), evaluator.read(*child)?.to_json());
                    }
                    None => {}
                }
            }
        }
        Ok(JsonValue::Object(map))
    }

    /// Document text without indentation
    pub fn dump(&self) -> StrataResult<String> {
        print_tree(&self.tree, false)
    }

    /// Document text with section bodies indented
    pub fn pretty_print(&self) -> StrataResult<String> {
        print_tree(&self.tree, true)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
