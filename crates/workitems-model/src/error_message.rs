//! Structured validation messages

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Field- or item-level problem reported by a validator or manager
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Component that raised the message
    pub source: String,
    /// Machine readable code, may be empty
    pub error_code: String,
    /// Human readable message
    pub message: String,
    /// Project of the affected item
    pub project_code: String,
    /// Id of the affected item
    pub id: String,
    /// Offending property, empty when item scoped
    pub property: String,
}

impl ErrorMessage {
    /// Create message
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
        project_code: impl Into<String>,
        id: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            error_code: error_code.into(),
            message: message.into(),
            project_code: project_code.into(),
            id: id.into(),
            property: property.into(),
        }
    }

    /// Whether the message targets the whole item
    #[inline]
    #[must_use]
    pub fn is_item_scoped(&self) -> bool {
        self.property.is_empty()
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}/{}", self.source, self.project_code, self.id)?;
        if !self.property.is_empty() {
            write!(f, ".{}", self.property)?;
        }
        write!(f, ": {}", self.message)
    }
}
