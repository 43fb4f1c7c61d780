//! Editor errors.

use instavid_project_model::InvalidField;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    /// A mutation was rejected; nothing was changed.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },
}

pub type EditorResult<T> = Result<T, EditorError>;

impl EditorError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Validation { field, .. } => field,
        }
    }
}

impl From<InvalidField> for EditorError {
    fn from(err: InvalidField) -> Self {
        Self::validation(err.field, err.message)
    }
}
