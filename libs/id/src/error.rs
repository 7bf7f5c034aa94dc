//! Error types for context construction, ID validation, and parsing.

use thiserror::Error;

/// Broad category of an [`IdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The context schema itself is malformed.
    Configuration,
    /// A value handed to `create` or `child` was rejected.
    Validation,
    /// A candidate string could not be decomposed.
    Parse,
}

/// Errors that can occur when building contexts or creating and parsing IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------
    /// Two components of a context share a name.
    #[error("context '{context}': duplicate component '{component}'")]
    DuplicateComponent { context: String, component: String },

    /// A component was declared after the repeatable component.
    #[error("context '{context}': component '{component}' declared after repeatable component '{repeatable}'")]
    RepeatableNotLast {
        context: String,
        component: String,
        repeatable: String,
    },

    /// A component pattern is not a valid regular expression.
    #[error("context '{context}': invalid pattern for component '{component}': {message}")]
    InvalidPattern {
        context: String,
        component: String,
        message: String,
    },

    /// A separator is empty.
    #[error("context '{context}': empty separator for component '{component}'")]
    EmptySeparator { context: String, component: String },

    /// The context declares no components.
    #[error("context '{context}' declares no components")]
    NoComponents { context: String },

    /// A component separator override was given before any component.
    #[error("context '{context}': component separator set before any component")]
    DanglingSeparator { context: String },

    /// A context name is already registered.
    #[error("context '{context}' is already registered")]
    DuplicateContext { context: String },

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------
    /// A value does not match its component pattern.
    #[error("context '{context}': value '{value}' for component '{component}' does not match pattern '{pattern}'")]
    PatternMismatch {
        context: String,
        component: String,
        pattern: String,
        value: String,
    },

    /// A required component has no value.
    #[error("context '{context}': missing value for required component '{component}'")]
    MissingRequired { context: String, component: String },

    /// More values were supplied than the context has slots for.
    #[error("context '{context}': expected at most {expected} values, got {actual}")]
    TooManyValues {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A value contains the separator that delimits it.
    #[error("context '{context}': value '{value}' for component '{component}' contains separator '{separator}'")]
    ReservedSeparator {
        context: String,
        component: String,
        separator: String,
        value: String,
    },

    /// The ID is already at the deepest level its context can address.
    #[error("context '{context}': no component below '{component}'")]
    NoChildComponent { context: String, component: String },

    // ---------------------------------------------------------------------
    // Parse
    // ---------------------------------------------------------------------
    /// A required segment is absent from the input.
    #[error("cannot parse '{input}' as {context}: missing segment for '{component}'")]
    MissingSegment {
        context: String,
        component: String,
        input: String,
    },

    /// A segment does not match its component pattern.
    #[error("cannot parse '{input}' as {context}: segment '{segment}' for '{component}' does not match pattern '{pattern}'")]
    InvalidSegment {
        context: String,
        component: String,
        pattern: String,
        segment: String,
        input: String,
    },

    /// Input remained after every component was consumed.
    #[error("cannot parse '{input}' as {context}: unexpected trailing content '{trailing}'")]
    TrailingContent {
        context: String,
        trailing: String,
        input: String,
    },

    /// No context is registered under the given name.
    #[error("unknown context '{0}'")]
    UnknownContext(String),
}

impl IdError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdError::DuplicateComponent { .. }
            | IdError::RepeatableNotLast { .. }
            | IdError::InvalidPattern { .. }
            | IdError::EmptySeparator { .. }
            | IdError::NoComponents { .. }
            | IdError::DanglingSeparator { .. }
            | IdError::DuplicateContext { .. } => ErrorKind::Configuration,
            IdError::PatternMismatch { .. }
            | IdError::MissingRequired { .. }
            | IdError::TooManyValues { .. }
            | IdError::ReservedSeparator { .. }
            | IdError::NoChildComponent { .. } => ErrorKind::Validation,
            IdError::MissingSegment { .. }
            | IdError::InvalidSegment { .. }
            | IdError::TrailingContent { .. }
            | IdError::UnknownContext(_) => ErrorKind::Parse,
        }
    }

    /// Returns true if this error was raised while building a context.
    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Returns true if this error rejects a supplied value.
    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns true if this error rejects a candidate string.
    pub fn is_parse_error(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }

    /// Name of the component this error concerns, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            IdError::DuplicateComponent { component, .. }
            | IdError::RepeatableNotLast { component, .. }
            | IdError::InvalidPattern { component, .. }
            | IdError::EmptySeparator { component, .. }
            | IdError::PatternMismatch { component, .. }
            | IdError::MissingRequired { component, .. }
            | IdError::ReservedSeparator { component, .. }
            | IdError::NoChildComponent { component, .. }
            | IdError::MissingSegment { component, .. }
            | IdError::InvalidSegment { component, .. } => Some(component),
            _ => None,
        }
    }
}
