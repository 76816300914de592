//! JSON output built on the serializable tree snapshot

use crate::rex::formats::registry::{FormatError, Formatter};
use crate::rex::tree::RegexTree;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &RegexTree) -> Result<String, FormatError> {
        tree.to_json()
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON snapshot with diagnostics and captures"
    }
}
