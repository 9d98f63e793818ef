use crate::value::{Document, Value};

/// A component of a dotted field path.
///
/// Components are plain field names; a component made only of ASCII digits
/// can additionally address an array element by position.
///
/// # Examples
/// - `scores` → `["scores"]`
/// - `items.0.price` → `["items", "0", "price"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment(String);

impl PathSegment {
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Positional interpretation of the segment, if it is all digits
    pub fn as_index(&self) -> Option<usize> {
        let name = self.name();
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse().ok()
    }
}

/// One element reached while resolving a path against a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMatch<'a> {
    pub value: &'a Value,
    /// Position within the outermost array traversed to reach `value`,
    /// `None` when no array was traversed.
    pub array_offset: Option<usize>,
}

/// A dotted field path resolved against documents.
///
/// Resolution walks through embedded documents by name and through arrays
/// in two ways: implicitly, by continuing the remaining path inside every
/// element that is itself a document, and positionally, when the next
/// segment is a number.
///
/// Whether an array found at the *end* of the path is expanded into its
/// elements is controlled by [`ElementPath::traverse_leaf_array`]: value
/// predicates want each element (then the array itself), array operators
/// want only the array.
///
/// # Examples
///
/// ```
/// use matchtree::{Document, Value, path::ElementPath};
///
/// let mut inner = Document::new();
/// inner.append("b", 5);
/// let mut doc = Document::new();
/// doc.append("a", Value::Array(vec![Value::Object(inner)]));
///
/// let path = ElementPath::new("a.b");
/// let found = path.resolve(&doc);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].value, &Value::Integer(5));
/// assert_eq!(found[0].array_offset, Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    dotted: String,
    segments: Vec<PathSegment>,
    traverse_leaf_array: bool,
}

impl ElementPath {
    pub fn new(dotted: &str) -> Self {
        ElementPath {
            dotted: dotted.to_string(),
            segments: dotted
                .split('.')
                .map(|s| PathSegment(s.to_string()))
                .collect(),
            traverse_leaf_array: true,
        }
    }

    /// Set whether an array at the end of the path yields its elements
    pub fn traverse_leaf_array(mut self, traverse: bool) -> Self {
        self.traverse_leaf_array = traverse;
        self
    }

    pub fn dotted(&self) -> &str {
        &self.dotted
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Every element reachable through this path, in document order.
    pub fn resolve<'a>(&self, doc: &'a Document) -> Vec<PathMatch<'a>> {
        let mut found = Vec::new();
        self.walk_document(doc, &self.segments, None, &mut found);
        found
    }

    fn walk_document<'a>(
        &self,
        doc: &'a Document,
        path: &[PathSegment],
        offset: Option<usize>,
        found: &mut Vec<PathMatch<'a>>,
    ) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        if let Some(child) = doc.get(head.name()) {
            self.walk_value(child, rest, offset, found);
        }
    }

    fn walk_value<'a>(
        &self,
        value: &'a Value,
        rest: &[PathSegment],
        offset: Option<usize>,
        found: &mut Vec<PathMatch<'a>>,
    ) {
        if rest.is_empty() {
            if self.traverse_leaf_array
                && let Value::Array(items) = value
            {
                for (i, item) in items.iter().enumerate() {
                    found.push(PathMatch {
                        value: item,
                        array_offset: offset.or(Some(i)),
                    });
                }
            }
            found.push(PathMatch {
                value,
                array_offset: offset,
            });
            return;
        }

        match value {
            Value::Object(doc) => self.walk_document(doc, rest, offset, found),
            Value::Array(items) => {
                // Implicit traversal into every embedded document
                for (i, item) in items.iter().enumerate() {
                    if let Value::Object(doc) = item {
                        self.walk_document(doc, rest, offset.or(Some(i)), found);
                    }
                }
                // Positional access, e.g. `items.0`
                if let Some(index) = rest[0].as_index()
                    && let Some(item) = items.get(index)
                {
                    self.walk_value(item, &rest[1..], offset, found);
                }
            }
            _ => {}
        }
    }
}
