//! Line scanner
//!
//! Builds a configuration tree from text, one line at a time:
//! - blank lines and `#` comments are kept for pretty printing
//! - `[name]`, `[[name]]`, ... open a section at that nesting level
//! - anything else is `name = expression`, extended with the following
//!   lines until it parses

use crate::parser::{is_identifier, parse_statement};
use crate::tree::{NodeId, Tree};
use std::io::BufRead;
use strata_core::{ErrorKind, StrataError, StrataResult};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("malformed section header in line {line}: {text}")]
    MalformedHeader { line: usize, text: String },

    #[error("section bracket mismatch in line {line}: {text}")]
    BracketMismatch { line: usize, text: String },

    #[error("wrong section nesting in line {line}")]
    WrongNesting { line: usize },

    #[error("invalid statement starting in line {line}: {message}")]
    InvalidStatement { line: usize, message: String },

    #[error("read failed in line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn line(&self) -> usize {
        match self {
            ScanError::MalformedHeader { line, .. }
            | ScanError::BracketMismatch { line, .. }
            | ScanError::WrongNesting { line }
            | ScanError::InvalidStatement { line, .. }
            | ScanError::Read { line, .. } => *line,
        }
    }
}

impl From<ScanError> for StrataError {
    fn from(err: ScanError) -> Self {
        let line = err.line();
        match err {
            ScanError::Read { .. } => StrataError::new(ErrorKind::Io, err.to_string()).at_line(line),
            _ => StrataError::syntax(line, err.to_string()),
        }
    }
}

/// Section the scanner is currently filling
struct Cursor {
    section: NodeId,
    level: usize,
}

/// Scan a whole document into a fresh tree
pub fn scan<R: BufRead>(reader: R) -> StrataResult<Tree> {
    let mut tree = Tree::new();
    let mut cursor = Cursor { section: NodeId::ROOT, level: 0 };
    let mut lines = reader.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next() {
        line_no += 1;
        let line = line.map_err(|source| ScanError::Read { line: line_no, source })?;
        let stripped = line.trim();

        if stripped.is_empty() {
            tree.add_blank(cursor.section);
        } else if stripped.starts_with('#') {
            tree.add_comment(cursor.section, stripped);
        } else if stripped.starts_with('[') {
            open_section(&mut tree, &mut cursor, stripped, line_no)?;
        } else {
            let start = line_no;
            let mut buffer = line.clone();
            let (name, expr) = loop {
                match parse_statement(buffer.trim()) {
                    Ok(statement) => break statement,
                    Err(err) => match lines.next() {
                        Some(next) => {
                            line_no += 1;
                            let next = next.map_err(|source| ScanError::Read { line: line_no, source })?;
                            buffer.push('\n');
                            buffer.push_str(&next);
                        }
                        None => {
                            return Err(ScanError::InvalidStatement { line: start, message: err.message }.into())
                        }
                    },
                }
            };
            tree.new_option(&name, cursor.section, expr).map_err(|e| e.at_line(start))?;
        }
    }

    debug!(lines = line_no, nodes = tree.len(), "scanned document");
    Ok(tree)
}

pub fn scan_str(text: &str) -> StrataResult<Tree> {
    scan(text.as_bytes())
}

fn open_section(tree: &mut Tree, cursor: &mut Cursor, header: &str, line: usize) -> StrataResult<()> {
    let malformed = || ScanError::MalformedHeader { line, text: header.to_string() };

    let opening = header.chars().take_while(|c| *c == '[').count();
    let rest = &header[opening..];
    let name_len = rest.find(']').ok_or_else(malformed)?;
    let name = rest[..name_len].trim();
    let after = &rest[name_len..];
    let closing = after.chars().take_while(|c| *c == ']').count();
    let trailing = after[closing..].trim();

    if !is_identifier(name) || !(trailing.is_empty() || trailing.starts_with('#')) {
        return Err(malformed().into());
    }
    if opening != closing {
        return Err(ScanError::BracketMismatch { line, text: header.to_string() }.into());
    }
    if opening > cursor.level + 1 {
        return Err(ScanError::WrongNesting { line }.into());
    }
    while cursor.level >= opening {
        cursor.section = tree
            .section(cursor.section)
            .and_then(|s| s.parent)
            .unwrap_or(NodeId::ROOT);
        cursor.level -= 1;
    }
    cursor.section = tree.new_section(name, cursor.section).map_err(|e| e.at_line(line))?;
    cursor.level = opening;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::tree::LayoutEntry;

    fn option_expr(tree: &Tree, path: &[&str]) -> Expr {
        let mut id = NodeId::ROOT;
        for name in path {
            id = tree.child(id, name).unwrap();
        }
        tree.option(id).unwrap().expr.clone()
    }

    #[test]
    fn test_sections_nest_and_pop() {
        let tree = scan_str(
            "a = 1\n[Foo]\nb = 2\n[[Sub]]\nc = 3\n[Bar]\nd = 4\n[[Sub]]\n[[[Deep]]]\ne = 5\n[[Other]]\n",
        )
        .unwrap();
        let paths: Vec<String> = tree.options().into_iter().map(|id| tree.path(id)).collect();
        assert_eq!(paths, vec!["a", "Foo.b", "Foo.Sub.c", "Bar.d", "Bar.Sub.Deep.e"]);
        let bar = tree.child(NodeId::ROOT, "Bar").unwrap();
        assert!(tree.child(bar, "Other").is_some());
        let deep = tree.child(tree.child(bar, "Sub").unwrap(), "Deep").unwrap();
        assert_eq!(tree.section(deep).unwrap().depth, 3);
    }

    #[test]
    fn test_header_errors() {
        let err = scan_str("[[Foo]\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.message.contains("bracket mismatch"));
        let err = scan_str("a = 1\n[[Foo]]\n").unwrap_err();
        assert!(err.message.contains("wrong section nesting"));
        assert_eq!(err.context.and_then(|c| c.line), Some(2));
        let err = scan_str("[1abc]\n").unwrap_err();
        assert!(err.message.contains("malformed"));
        let err = scan_str("[Foo]\n[Foo]\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert!(scan_str("[Foo]  # trailing\n").is_ok());
    }

    #[test]
    fn test_continuation_lines() {
        let tree = scan_str("a = [1,\n     2,\n     3]\nb = r'''multi\n   line'''\nc = 1 + \\\n  2\n").unwrap();
        assert_eq!(
            option_expr(&tree, &["a"]),
            Expr::List(vec![Expr::literal(1), Expr::literal(2), Expr::literal(3)])
        );
        assert_eq!(option_expr(&tree, &["b"]), Expr::literal("multi\n   line"));
        assert_eq!(tree.options().len(), 3);
    }

    #[test]
    fn test_unterminated_statement() {
        let err = scan_str("a = 1\nb = (1,\n2\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.context.and_then(|c| c.line), Some(2));
    }

    #[test]
    fn test_duplicate_option() {
        let err = scan_str("a = 1\na = 2\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert_eq!(err.context.and_then(|c| c.line), Some(2));
    }

    #[test]
    fn test_layout_kept() {
        let tree = scan_str("# head\n\n  a = 1\n   # indented\n").unwrap();
        let layout = &tree.section(NodeId::ROOT).unwrap().layout;
        assert_eq!(layout[0], LayoutEntry::Comment("# head".into()));
        assert_eq!(layout[1], LayoutEntry::Blank);
        assert!(matches!(layout[2], LayoutEntry::Child(_)));
        assert_eq!(layout[3], LayoutEntry::Comment("# indented".into()));
    }

    #[test]
    fn test_read_error() {
        let bytes: &[u8] = b"a = 1\nb = '\xff'\n";
        let err = scan(bytes).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.context.and_then(|c| c.line), Some(2));
    }
}
