//! Expression evaluator
//!
//! Reduces expressions to values on demand. Reading an option goes through
//! its cache slot; a result is only cached when no reference was followed
//! while computing it, since a referenced option may be rewritten later.

use crate::ast::Expr;
use crate::resolve::resolve;
use crate::tree::{Node, NodeId, Tree};
use std::cell::RefCell;
use strata_builtins::{CallArgs, FunctionRegistry};
use strata_core::{ops, BoolOp, StrataError, StrataResult, Value};
use tracing::debug;

/// Default bound on nested option reads
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A value plus whether producing it followed any reference
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Value,
    pub external: bool,
}

impl Evaluated {
    fn new(value: Value, external: bool) -> Self {
        Self { value, external }
    }
}

/// Lazy evaluator over one tree
pub struct Evaluator<'a> {
    tree: &'a Tree,
    functions: &'a FunctionRegistry,
    max_depth: usize,
    /// Options currently being computed, outermost first
    active: RefCell<Vec<NodeId>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(tree: &'a Tree, functions: &'a FunctionRegistry) -> Self {
        Self {
            tree,
            functions,
            max_depth: DEFAULT_MAX_DEPTH,
            active: RefCell::new(Vec::new()),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Value of an option, from its cache when possible
    pub fn read(&self, option: NodeId) -> StrataResult<Value> {
        let entry = self.tree.option(option).ok_or_else(|| {
            StrataError::unresolved(&self.tree.path(option)).with_note("not an option")
        })?;
        if let Some(value) = entry.cached() {
            debug!(option = %self.tree.path(option), "cache hit");
            return Ok(value);
        }
        self.enter(option)?;
        let result = self.evaluate(&entry.expr, entry.parent);
        self.active.borrow_mut().pop();

        let evaluated = result.map_err(|e| e.in_option(self.tree.path(option)))?;
        debug_assert!(!evaluated.external || entry.expr.has_references());
        if evaluated.external {
            debug!(option = %self.tree.path(option), "cache miss, depends on references");
        } else {
            debug!(option = %self.tree.path(option), "cache miss, stored");
            entry.store(evaluated.value.clone());
        }
        Ok(evaluated.value)
    }

    fn enter(&self, option: NodeId) -> StrataResult<()> {
        let mut active = self.active.borrow_mut();
        if let Some(start) = active.iter().position(|id| *id == option) {
            let mut chain: Vec<String> = active[start..].iter().map(|id| self.tree.path(*id)).collect();
            chain.push(self.tree.path(option));
            return Err(StrataError::cyclic(&chain).in_option(self.tree.path(option)));
        }
        if active.len() >= self.max_depth {
            return Err(StrataError::recursion_limit(self.max_depth).in_option(self.tree.path(option)));
        }
        active.push(option);
        Ok(())
    }

    /// Evaluate an expression with `scope` as the innermost section
    pub fn evaluate(&self, expr: &Expr, scope: NodeId) -> StrataResult<Evaluated> {
        match expr {
            Expr::Literal(value) => Ok(Evaluated::new(value.clone(), false)),

            Expr::Reference(path) => {
                let target = resolve(self.tree, path, scope)?;
                match self.tree.node(target) {
                    Some(Node::Option(_)) => Ok(Evaluated::new(self.read(target)?, true)),
                    _ => Err(StrataError::unresolved(&path.join("."))
                        .with_note(format!("'{}' is a section, not an option", self.tree.path(target)))),
                }
            }

            Expr::Unary(op, operand) => {
                let operand = self.evaluate(operand, scope)?;
                Ok(Evaluated::new(ops::unary(*op, &operand.value)?, operand.external))
            }

            Expr::Binary(op, left, right) => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                let value = ops::binary(*op, &left.value, &right.value)?;
                Ok(Evaluated::new(value, left.external || right.external))
            }

            Expr::BoolOp(op, operands) => self.eval_bool_op(*op, operands, scope),

            Expr::Compare(first, rest) => {
                let first = self.evaluate(first, scope)?;
                let mut external = first.external;
                let mut left = first.value;
                for (op, operand) in rest {
                    let right = self.evaluate(operand, scope)?;
                    external |= right.external;
                    if !ops::compare(*op, &left, &right.value)? {
                        return Ok(Evaluated::new(Value::Bool(false), external));
                    }
                    left = right.value;
                }
                Ok(Evaluated::new(Value::Bool(true), external))
            }

            Expr::Conditional { condition, if_true, if_false } => {
                let condition = self.evaluate(condition, scope)?;
                let branch = if condition.value.is_truthy() { if_true } else { if_false };
                let chosen = self.evaluate(branch, scope)?;
                Ok(Evaluated::new(chosen.value, condition.external || chosen.external))
            }

            Expr::List(items) => {
                let (values, external) = self.evaluate_all(items, scope)?;
                Ok(Evaluated::new(Value::List(values), external))
            }

            Expr::Tuple(items) => {
                let (values, external) = self.evaluate_all(items, scope)?;
                Ok(Evaluated::new(Value::Tuple(values), external))
            }

            Expr::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                let mut external = false;
                for (key, value) in entries {
                    let key = self.evaluate(key, scope)?;
                    let value = self.evaluate(value, scope)?;
                    external |= key.external || value.external;
                    pairs.push((key.value, value.value));
                }
                Ok(Evaluated::new(Value::dict(pairs)?, external))
            }

            Expr::Call { function, args, keywords } => {
                if !self.functions.contains(function) {
                    return Err(self.functions.reject(function));
                }
                let (positional, mut external) = self.evaluate_all(args, scope)?;
                let mut named = Vec::with_capacity(keywords.len());
                for (name, value) in keywords {
                    let value = self.evaluate(value, scope)?;
                    external |= value.external;
                    named.push((name.clone(), value.value));
                }
                let value = self.functions.call(function, &CallArgs::new(positional, named))?;
                Ok(Evaluated::new(value, external))
            }
        }
    }

    fn evaluate_all(&self, items: &[Expr], scope: NodeId) -> StrataResult<(Vec<Value>, bool)> {
        let mut values = Vec::with_capacity(items.len());
        let mut external = false;
        for item in items {
            let item = self.evaluate(item, scope)?;
            external |= item.external;
            values.push(item.value);
        }
        Ok((values, external))
    }

    /// `and` yields False at the first falsy operand, `or` the first truthy
    /// operand; otherwise both yield the last operand
    fn eval_bool_op(&self, op: BoolOp, operands: &[Expr], scope: NodeId) -> StrataResult<Evaluated> {
        let mut external = false;
        let mut last = Value::None;
        for operand in operands {
            let result = self.evaluate(operand, scope)?;
            external |= result.external;
            let truthy = result.value.is_truthy();
            match op {
                BoolOp::And if !truthy => return Ok(Evaluated::new(Value::Bool(false), external)),
                BoolOp::Or if truthy => return Ok(Evaluated::new(result.value, external)),
                _ => last = result.value,
            }
        }
        Ok(Evaluated::new(last, external))
    }
}
