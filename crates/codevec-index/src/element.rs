//! Indexable units and their store-ready forms.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of construct an element was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    ModuleDocstring,
    Class,
    Function,
    Import,
}

impl ElementKind {
    /// Identifier used in element ids, metadata and the JSON report.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModuleDocstring => "module_docstring",
            Self::Class => "class",
            Self::Function => "function",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based source line of the defining construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineNumber {
    Line(usize),
    /// The construct has no line of its own (the module docstring).
    Unknown,
}

impl fmt::Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// One indexable unit extracted from a source file. Never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub name: String,
    pub content: String,
    pub file_path: String,
    pub line_number: LineNumber,
}

impl Element {
    /// Build an element; a missing or empty `name` falls back to the kind string.
    #[must_use]
    pub fn new(
        kind: ElementKind,
        name: Option<String>,
        content: String,
        file_path: impl Into<String>,
        line_number: LineNumber,
    ) -> Self {
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| kind.as_str().to_owned());
        Self {
            kind,
            name,
            content,
            file_path: file_path.into(),
            line_number,
        }
    }

    /// Deterministic store id: `"{file_path}:{line_number}:{kind}:{name}"`.
    ///
    /// Derived from location and name only, so re-indexing an unchanged file
    /// overwrites the same points instead of adding new ones.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.file_path, self.line_number, self.kind, self.name
        )
    }

    /// Store metadata: everything needed to show the element without
    /// re-parsing its file.
    #[must_use]
    pub fn metadata(&self) -> HashMap<String, serde_json::Value> {
        HashMap::from([
            ("type".to_owned(), self.kind.as_str().into()),
            ("name".to_owned(), self.name.clone().into()),
            ("file_path".to_owned(), self.file_path.clone().into()),
            ("line_number".to_owned(), self.line_number.to_string().into()),
            ("content".to_owned(), self.content.clone().into()),
        ])
    }

    #[must_use]
    pub fn to_record(&self) -> ElementRecord {
        ElementRecord {
            id: self.id(),
            kind: self.kind,
            name: self.name.clone(),
            content: self.content.clone(),
            file_path: self.file_path.clone(),
            line_number: self.line_number.to_string(),
        }
    }
}

/// Report entry for an element that was embedded and upserted. The vector
/// itself lives only in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
    pub content: String,
    pub file_path: String,
    pub line_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, line: usize) -> Element {
        Element::new(
            ElementKind::Function,
            Some(name.into()),
            "Say hello.".into(),
            "pkg/app.py",
            LineNumber::Line(line),
        )
    }

    #[test]
    fn id_joins_location_kind_and_name() {
        assert_eq!(
            function("Greeter.hello", 12).id(),
            "pkg/app.py:12:function:Greeter.hello"
        );
    }

    #[test]
    fn missing_name_falls_back_to_kind() {
        let e = Element::new(
            ElementKind::ModuleDocstring,
            None,
            "Module docs.".into(),
            "a.py",
            LineNumber::Unknown,
        );
        assert_eq!(e.name, "module_docstring");
        assert_eq!(e.id(), "a.py:unknown:module_docstring:module_docstring");
    }

    #[test]
    fn empty_name_falls_back_to_kind() {
        let e = Element::new(
            ElementKind::Import,
            Some(String::new()),
            "os".into(),
            "a.py",
            LineNumber::Line(1),
        );
        assert_eq!(e.name, "import");
    }

    #[test]
    fn metadata_has_stringified_line() {
        let meta = function("hello", 7).metadata();
        assert_eq!(meta["type"], "function");
        assert_eq!(meta["name"], "hello");
        assert_eq!(meta["file_path"], "pkg/app.py");
        assert_eq!(meta["line_number"], "7");
        assert_eq!(meta["content"], "Say hello.");
        assert_eq!(meta.len(), 5);
    }

    #[test]
    fn record_serializes_with_type_field() {
        let json = serde_json::to_value(function("hello", 3).to_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "pkg/app.py:3:function:hello",
                "type": "function",
                "name": "hello",
                "content": "Say hello.",
                "file_path": "pkg/app.py",
                "line_number": "3",
            })
        );
    }

    #[test]
    fn record_field_order_matches_report_format() {
        let text = serde_json::to_string(&function("f", 1).to_record()).unwrap();
        let positions: Vec<usize> = [
            "\"id\"",
            "\"type\"",
            "\"name\"",
            "\"content\"",
            "\"file_path\"",
            "\"line_number\"",
        ]
        .iter()
        .map(|k| text.find(k).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn kind_display_matches_serde() {
        for kind in [
            ElementKind::ModuleDocstring,
            ElementKind::Class,
            ElementKind::Function,
            ElementKind::Import,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn id_is_stable_for_equal_elements(
            path in "[a-z/]{1,20}\\.py",
            name in "[A-Za-z_][A-Za-z0-9_.]{0,20}",
            line in 1usize..10_000,
        ) {
            let a = Element::new(ElementKind::Class, Some(name.clone()), "c".into(), path.clone(), LineNumber::Line(line));
            let b = Element::new(ElementKind::Class, Some(name), "other content".into(), path, LineNumber::Line(line));
            prop_assert_eq!(a.id(), b.id());
        }
    }
}
