//! Python docstring recognition and cleanup.
//!
//! Mirrors what `ast.get_docstring` reports: only a plain string literal as
//! the first statement of a body counts, bytes and f-strings do not, and the
//! literal value is cleaned the way `inspect.cleandoc` does it.

use tree_sitter::Node;

const TAB_SIZE: usize = 8;

/// Cleaned docstring of a module node or a `block` body, if it has a
/// non-empty one.
pub(crate) fn body_docstring(body: &Node<'_>, source: &str) -> Option<String> {
    let first = first_statement(body)?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let mut expr = first.named_child(0)?;
    while expr.kind() == "parenthesized_expression" {
        expr = sole_named_child(&expr)?;
    }
    let raw = match expr.kind() {
        "string" => string_literal_value(&source[expr.byte_range()])?,
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts = expr
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .map(|n| {
                    if n.kind() == "string" {
                        string_literal_value(&source[n.byte_range()])
                    } else {
                        None
                    }
                })
                .collect::<Option<Vec<_>>>()?;
            parts.concat()
        }
        _ => return None,
    };

    let cleaned = clean_docstring(&raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn sole_named_child<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let mut children = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment");
    match (children.next(), children.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn first_statement<'tree>(body: &Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .find(|n| n.kind() != "comment")
}

/// Value of one Python string literal, or `None` for bytes and f-strings.
pub(crate) fn string_literal_value(literal: &str) -> Option<String> {
    let prefix_len = literal
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(literal.len());
    let prefix = literal[..prefix_len].to_ascii_lowercase();
    if prefix.contains(['b', 'f', 't']) {
        return None;
    }

    let quoted = &literal[prefix_len..];
    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return None;
    }
    let inner = &quoted[quote_len..quoted.len() - quote_len];

    if prefix.contains('r') {
        Some(inner.to_owned())
    } else {
        Some(decode_escapes(inner))
    }
}

fn decode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(next),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width && digits.chars().all(|d| d.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn expand_tabs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut column = 0usize;
    for c in s.chars() {
        match c {
            '\t' => {
                let spaces = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Uniformly remove indentation the way `inspect.cleandoc` does.
///
/// The first line is left-stripped, the smallest indentation of the other
/// non-blank lines is removed from each of them, and leading and trailing
/// empty lines are dropped.
pub(crate) fn clean_docstring(doc: &str) -> String {
    let expanded = expand_tabs(doc);
    let mut lines: Vec<String> = expanded.split('\n').map(str::to_owned).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start().chars().count();
            (content > 0).then(|| line.chars().count() - content)
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_owned();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();
    lines.drain(..leading);

    lines.join("\n")
}
