use std::fmt;

/// Optional side output of a match.
///
/// When a caller requests it, array operators record the position of the
/// array element that made the document match (the "elemMatchKey"). Nothing
/// is recorded unless [`MatchDetails::request_elem_match_key`] was called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDetails {
    elem_match_key_requested: bool,
    elem_match_key: Option<String>,
}

impl MatchDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_elem_match_key(&mut self) {
        self.elem_match_key_requested = true;
    }

    /// Whether anything should be recorded at all
    pub fn need_record(&self) -> bool {
        self.elem_match_key_requested
    }

    pub fn has_elem_match_key(&self) -> bool {
        self.elem_match_key.is_some()
    }

    pub fn elem_match_key(&self) -> Option<&str> {
        self.elem_match_key.as_deref()
    }

    /// Record the array offset that produced the match. Ignored unless the
    /// key was requested.
    pub fn set_elem_match_key(&mut self, key: impl Into<String>) {
        if self.elem_match_key_requested {
            self.elem_match_key = Some(key.into());
        }
    }

    /// Forget recorded output, keeping what was requested
    pub fn reset_output(&mut self) {
        self.elem_match_key = None;
    }
}

impl fmt::Display for MatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.elem_match_key {
            Some(key) => write!(f, "elemMatchKey: {}", key),
            None => write!(f, "elemMatchKey: NONE"),
        }
    }
}
