use std::{any::Any, fmt};

/// Annotation attached to a match expression by the query planner.
///
/// The tree only stores, clones and transfers tags; what a tag means is up
/// to whoever attached it. Planner code recovers its own concrete type with
/// [`TagData::as_any`].
///
/// Tags must be `Send + Sync` so a finished tree can be shared by threads
/// that evaluate it concurrently.
pub trait TagData: fmt::Debug + Send + Sync {
    /// Produce an independently owned copy of this tag.
    fn clone_tag(&self) -> Box<dyn TagData>;

    fn as_any(&self) -> &dyn Any;

    /// Append this tag to a debug rendering. Must end the line.
    fn debug_string(&self, out: &mut String) {
        out.push_str(&format!(" || {:?}\n", self));
    }
}

impl Clone for Box<dyn TagData> {
    fn clone(&self) -> Self {
        self.clone_tag()
    }
}
