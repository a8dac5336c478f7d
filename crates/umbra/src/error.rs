//! Error types for Umbra models, highlighting, components and resources.

use umbra_core::{AttributeError, NodeError};

use crate::file::FileError;

/// Boxed error raised by plug-in code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by tabular models.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A row outside the parent's children.
    #[error("row {row} is out of range for {count} rows")]
    UnknownRow { row: usize, count: usize },

    /// A column outside the headers.
    #[error("column {column} is out of range for {count} columns")]
    UnknownColumn { column: usize, count: usize },

    /// A mime payload could not be decoded.
    #[error("invalid mime data: {0}")]
    InvalidMimeData(String),

    /// A path or editor is already registered in the model.
    #[error("'{0}' is already registered!")]
    AlreadyRegistered(String),

    /// A node is not registered in the model under the expected family.
    #[error("'{0}' isn't registered!")]
    NotRegistered(String),

    /// A mime payload produced by a model over another graph.
    #[error("mime data references another graph")]
    ForeignGraph,

    /// A structural graph failure.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// An attribute write failure.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl ModelError {
    /// Create an invalid mime data error.
    pub fn invalid_mime(message: impl Into<String>) -> Self {
        Self::InvalidMimeData(message.into())
    }
}

/// Errors raised while building highlighters and grammars.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// A rule pattern failed to compile.
    #[error("invalid pattern for scope '{scope}': {source}")]
    Regex {
        scope: String,
        #[source]
        source: regex::Error,
    },

    /// A grammar manifest is missing required entries or cannot be parsed.
    #[error("invalid grammar: {0}")]
    Grammar(String),

    /// A grammar could not be located.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl HighlightError {
    /// Create a regex error.
    pub fn regex(scope: impl Into<String>, source: regex::Error) -> Self {
        Self::Regex {
            scope: scope.into(),
            source,
        }
    }

    /// Create a grammar error.
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar(message.into())
    }
}

/// Errors raised by the components lifecycle manager.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// No component registered under that name.
    #[error("'{0}' Component is not registered!")]
    UnknownName(String),

    /// A component with that name is already registered.
    #[error("'{0}' Component is already registered!")]
    DuplicateName(String),

    /// A required component is not activated.
    #[error("'{name}' Component has missing '{dependency}' dependency!")]
    MissingDependency { name: String, dependency: String },

    /// The dependency graph contains a cycle through the component.
    #[error("'{0}' Component is part of a dependency cycle!")]
    CycleDetected(String),

    /// The component is already activated.
    #[error("'{0}' Component is already activated!")]
    AlreadyActivated(String),

    /// The component is already deactivated.
    #[error("'{0}' Component is already deactivated!")]
    AlreadyDeactivated(String),

    /// The component cannot be deactivated.
    #[error("'{0}' Component cannot be deactivated!")]
    NotDeactivatable(String),

    /// The component, or one of its dependents, cannot be deactivated.
    #[error("'{name}' Component cannot be reloaded: '{blocker}' cannot be deactivated!")]
    NotReloadable { name: String, blocker: String },

    /// Activated dependents prevent deactivation.
    #[error("'{name}' Component has activated dependents: '{}'!", .dependents.join(", "))]
    IfDependentsActive { name: String, dependents: Vec<String> },

    /// The plug-in's own code failed.
    #[error("'{name}' Component raised an error: {source}")]
    Interface {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A component manifest is invalid.
    #[error("invalid component manifest: {0}")]
    Manifest(String),

    /// Some items of a batch operation failed.
    #[error("Exception(s) raised while {operation} '{}' Component(s)!", .names.join(", "))]
    BatchFailed { operation: String, names: Vec<String> },
}

impl ComponentError {
    /// Wrap an error raised by a plug-in.
    pub fn interface(name: impl Into<String>, source: BoxError) -> Self {
        Self::Interface {
            name: name.into(),
            source,
        }
    }

    /// Create a manifest error.
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest(message.into())
    }
}

/// Errors raised by resource lookups.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No resource directory contains the name.
    #[error("'{0}' resource was not found")]
    NotFound(String),

    /// The resource exists but could not be read.
    #[error("failed to read resource: {0}")]
    Read(#[from] FileError),
}

/// Errors raised by the layouts manager.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A layout with that name is already registered.
    #[error("'{0}' layout is already registered!")]
    AlreadyRegistered(String),

    /// No layout registered under that name.
    #[error("'{0}' layout isn't registered!")]
    NotRegistered(String),

    /// A stored blob is not valid base64.
    #[error("invalid '{key}' layout blob: {source}")]
    InvalidBlob {
        key: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// The aggregate error type of the crate.
#[derive(Debug, thiserror::Error)]
pub enum UmbraError {
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type for highlighting construction.
pub type HighlightResult<T> = std::result::Result<T, HighlightError>;

/// Result type for component operations.
pub type ComponentResult<T> = std::result::Result<T, ComponentError>;

/// Result type alias for Umbra operations.
pub type Result<T> = std::result::Result<T, UmbraError>;
