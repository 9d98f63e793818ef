//! JSON text rendering for document values.
//!
//! Serialized match expressions and matching documents are printed through
//! this module. Output follows standard JSON formatting rules and keeps
//! object fields in document order, so the canonical serialized form of a
//! filter prints the same way every time.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - minimal whitespace for logs
//! - **Pretty output** via [`to_json_pretty()`] - human-readable with 2-space indentation
//! - **String escaping** - handles special characters, control codes, and Unicode
//! - **Type preservation** - whole floats print as `1.0`, integers as `1`
//!
//! # Examples
//!
//! ```
//! use matchtree::Value;
//! use matchtree::output::{to_json, to_json_pretty};
//!
//! let value = Value::Integer(42);
//!
//! // Compact output
//! assert_eq!(to_json(&value), "42");
//!
//! // Pretty output (identical for simple values)
//! assert_eq!(to_json_pretty(&value), "42");
//! ```

use crate::value::{Document, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => self.print_float(*n),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(doc) => self.print_object(doc, indent),
        }
    }

    fn print_float(&self, n: f64) -> String {
        if !n.is_finite() {
            "null".to_string()
        } else if n.fract() == 0.0 && n.abs() < 1e16 {
            format!("{:.1}", n)
        } else {
            n.to_string()
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        let items = arr.iter().map(|v| self.print_value(v, indent + 1)).collect();
        self.wrap('[', ']', items, indent)
    }

    fn print_object(&self, doc: &Document, indent: usize) -> String {
        let separator = if self.pretty { ": " } else { ":" };
        let items = doc
            .iter()
            .map(|(k, v)| {
                format!(
                    "\"{}\"{}{}",
                    self.escape_string(k),
                    separator,
                    self.print_value(v, indent + 1)
                )
            })
            .collect();
        self.wrap('{', '}', items, indent)
    }

    /// Join already printed members between `open` and `close`, one per
    /// line when pretty printing.
    fn wrap(&self, open: char, close: char, items: Vec<String>, indent: usize) -> String {
        if items.is_empty() {
            return format!("{}{}", open, close);
        }
        if !self.pretty {
            return format!("{}{}{}", open, items.join(","), close);
        }

        let inner = self.indent(indent + 1);
        let lines: Vec<String> = items.iter().map(|item| format!("{}{}", inner, item)).collect();
        format!("{}\n{}\n{}{}", open, lines.join(",\n"), self.indent(indent), close)
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => {
                    // Unicode escape for control chars
                    format!("\\u{:04x}", c as u32).chars().collect()
                }
                c => vec![c],
            })
            .collect()
    }
}

/// Converts a Value to compact JSON text.
///
/// # Examples
///
/// ```
/// use matchtree::{Document, Value};
/// use matchtree::output::to_json;
///
/// let mut doc = Document::new();
/// doc.append("name", "Alice");
/// doc.append("age", 30);
///
/// assert_eq!(to_json(&Value::Object(doc)), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON text with 2-space indentation.
///
/// # Examples
///
/// ```
/// use matchtree::{Document, Value};
/// use matchtree::output::to_json_pretty;
///
/// let mut doc = Document::new();
/// doc.append("name", "Alice");
///
/// assert_eq!(to_json_pretty(&Value::Object(doc)), "{\n  \"name\": \"Alice\"\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
