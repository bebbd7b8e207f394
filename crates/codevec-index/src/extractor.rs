//! Depth-first extraction of indexable elements from a Python syntax tree.

use std::borrow::Cow;
use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::docstring::body_docstring;
use crate::element::{Element, ElementKind, LineNumber};
use crate::error::{IndexError, Result};

/// Read `path` and extract its elements in source order.
///
/// `file_path` of every element is `path` exactly as given.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 or does not parse.
pub async fn extract_file(path: &Path) -> Result<Vec<Element>> {
    let source = tokio::fs::read_to_string(path).await?;
    extract_source(&source, &path.to_string_lossy())
}

/// Node kinds whose children can be statements. Everything else is an
/// expression or a clause header and cannot hold a definition or an import.
const STATEMENT_CONTAINERS: &[&str] = &[
    "module",
    "block",
    "decorated_definition",
    "if_statement",
    "elif_clause",
    "else_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "finally_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

/// Statements the grammar still accepts but Python 3 rejects.
const LEGACY_STATEMENTS: &[(&str, &str)] = &[
    ("print_statement", "print"),
    ("exec_statement", "exec"),
];

/// Extract elements from Python `source` in document order.
///
/// Line endings are normalized to `\n` first. A tree containing syntax
/// errors or Python 2 statements is rejected as a whole; no partial element
/// list is returned.
///
/// # Errors
///
/// Returns `IndexError::Parse` if tree-sitter reports an error or missing
/// node, or the file uses `print`/`exec` statements.
pub fn extract_source(source: &str, file_path: &str) -> Result<Vec<Element>> {
    let normalized = normalize_newlines(source);
    let source: &str = &normalized;

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| IndexError::Parse(format!("set_language failed: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| IndexError::Parse(format!("parse failed for {file_path}")))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = find_first(&root, |n| n.is_error() || n.is_missing())
            .map_or(1, |n| line_no(&n));
        return Err(IndexError::Parse(format!(
            "{file_path}: invalid syntax at line {line}"
        )));
    }
    if let Some(node) = find_first(&root, |n| legacy_statement(n).is_some()) {
        let keyword = legacy_statement(&node).unwrap_or_default();
        return Err(IndexError::Parse(format!(
            "{file_path}: invalid syntax at line {}: Python 2 {keyword} statement",
            line_no(&node)
        )));
    }

    let mut walker = Walker {
        source,
        file_path,
        elements: Vec::new(),
    };
    walker.visit(&root, None);
    Ok(walker.elements)
}

/// Python reads source in universal-newline mode: `\r\n` and lone `\r`
/// both become `\n`.
fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

/// First node in pre-order matching `pred`. Iterative, so expression depth
/// does not grow the stack.
fn find_first<'tree>(
    root: &Node<'tree>,
    mut pred: impl FnMut(&Node<'tree>) -> bool,
) -> Option<Node<'tree>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if pred(&node) {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn legacy_statement(node: &Node<'_>) -> Option<&'static str> {
    LEGACY_STATEMENTS
        .iter()
        .find(|(kind, _)| node.kind() == *kind)
        .map(|(_, keyword)| *keyword)
}

struct Walker<'a> {
    source: &'a str,
    file_path: &'a str,
    elements: Vec<Element>,
}

impl Walker<'_> {
    /// `current_class` is the nearest enclosing class; function scopes do
    /// not reset it.
    fn visit(&mut self, node: &Node<'_>, current_class: Option<&str>) {
        match node.kind() {
            "module" => {
                if let Some(doc) = body_docstring(node, self.source) {
                    self.emit(ElementKind::ModuleDocstring, None, doc, LineNumber::Unknown);
                }
                self.visit_children(node, current_class);
            }
            "class_definition" => {
                let Some(name) = self.field_text(node, "name") else {
                    self.visit_children(node, current_class);
                    return;
                };
                let doc = node
                    .child_by_field_name("body")
                    .and_then(|body| body_docstring(&body, self.source));
                let content = doc.unwrap_or_else(|| format!("Class {name}"));
                self.emit(ElementKind::Class, Some(name.clone()), content, line_of(node));
                self.visit_children(node, Some(&name));
            }
            "function_definition" => {
                let Some(name) = self.field_text(node, "name") else {
                    self.visit_children(node, current_class);
                    return;
                };
                let doc = node
                    .child_by_field_name("body")
                    .and_then(|body| body_docstring(&body, self.source));
                let content = doc.unwrap_or_else(|| name.clone());
                let qualified = match current_class {
                    Some(class) => format!("{class}.{name}"),
                    None => name,
                };
                self.emit(ElementKind::Function, Some(qualified), content, line_of(node));
                self.visit_children(node, current_class);
            }
            "import_statement" => {
                for target in self.import_names(node) {
                    self.emit(ElementKind::Import, Some(target.clone()), target, line_of(node));
                }
            }
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| self.module_text(&m))
                    .unwrap_or_default();
                self.emit_from_import(node, &module);
            }
            "future_import_statement" => self.emit_from_import(node, "__future__"),
            kind if STATEMENT_CONTAINERS.contains(&kind) => {
                self.visit_children(node, current_class);
            }
            _ => {}
        }
    }

    fn visit_children(&mut self, node: &Node<'_>, current_class: Option<&str>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in &children {
            self.visit(child, current_class);
        }
    }

    fn emit(
        &mut self,
        kind: ElementKind,
        name: Option<String>,
        content: String,
        line: LineNumber,
    ) {
        self.elements
            .push(Element::new(kind, name, content, self.file_path, line));
    }

    fn emit_from_import(&mut self, node: &Node<'_>, module: &str) {
        let symbols = if has_wildcard(node) {
            vec!["*".to_owned()]
        } else {
            self.import_names(node)
        };
        for symbol in symbols {
            let target = format!("{module}.{symbol}");
            self.emit(ElementKind::Import, Some(target.clone()), target, line_of(node));
        }
    }

    /// Imported names of an import statement, aliases resolved to the
    /// imported (not the bound) name.
    fn import_names(&self, node: &Node<'_>) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .map(|n| {
                let target = if n.kind() == "aliased_import" {
                    n.child_by_field_name("name").unwrap_or(n)
                } else {
                    n
                };
                self.dotted_text(&target)
            })
            .collect()
    }

    /// Module part of a from-import; relative dots are dropped.
    fn module_text(&self, node: &Node<'_>) -> String {
        if node.kind() == "relative_import" {
            let mut cursor = node.walk();
            let dotted = node
                .named_children(&mut cursor)
                .find(|n| n.kind() == "dotted_name");
            return dotted.map(|d| self.dotted_text(&d)).unwrap_or_default();
        }
        self.dotted_text(node)
    }

    fn dotted_text(&self, node: &Node<'_>) -> String {
        if node.kind() != "dotted_name" {
            return self.text(node).to_owned();
        }
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|n| n.kind() == "identifier")
            .map(|n| self.text(&n))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn field_text(&self, node: &Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.text(&n).to_owned())
    }

    fn text(&self, node: &Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }
}

fn line_no(node: &Node<'_>) -> usize {
    node.start_position().row + 1
}

fn line_of(node: &Node<'_>) -> LineNumber {
    LineNumber::Line(line_no(node))
}

fn has_wildcard(node: &Node<'_>) -> bool {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .any(|n| n.kind() == "wildcard_import")
}
