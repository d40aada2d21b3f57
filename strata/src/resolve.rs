//! Reference resolution
//!
//! A dotted path is looked up from the scope of the option being
//! evaluated. The whole path is tried in that section, then in each
//! enclosing section up to the root; the nearest section in which every
//! segment resolves wins.

use crate::tree::{Node, NodeId, Tree};
use strata_core::{StrataError, StrataResult};
use tracing::trace;

/// Find the node a dotted path names, starting from `scope`
pub fn resolve(tree: &Tree, path: &[String], scope: NodeId) -> StrataResult<NodeId> {
    let dotted = path.join(".");
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| StrataError::unresolved(&dotted))?;

    // Keep the nearest partial match to explain a final miss
    let mut nearest_miss = None;
    let mut current = Some(scope);
    while let Some(section) = current {
        if let Some(found) = tree.child(section, first) {
            match descend(tree, found, rest, &dotted) {
                Ok(target) => {
                    trace!(reference = %dotted, from = %tree.path(scope), to = %tree.path(target), "resolved");
                    return Ok(target);
                }
                Err(err) => {
                    trace!(reference = %dotted, at = %tree.path(section), "partial match, trying enclosing scope");
                    nearest_miss.get_or_insert(err);
                }
            }
        }
        current = tree.node(section).and_then(Node::parent);
    }

    Err(nearest_miss.unwrap_or_else(|| StrataError::unresolved(&dotted)))
}

fn descend(tree: &Tree, start: NodeId, rest: &[String], dotted: &str) -> StrataResult<NodeId> {
    let mut current = start;
    for segment in rest {
        match tree.node(current) {
            Some(Node::Section(_)) => {
                current = tree.child(current, segment).ok_or_else(|| {
                    StrataError::unresolved(dotted)
                        .with_note(format!("'{}' has no member '{}'", tree.path(current), segment))
                })?;
            }
            _ => {
                return Err(StrataError::unresolved(dotted).with_note(format!(
                    "'{}' is an option, not a section",
                    tree.path(current)
                )))
            }
        }
    }
    Ok(current)
}
