use std::path::PathBuf;
use thiserror::Error;

/// Every way a generation run can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("cannot read input document {}: {source}", .path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input document at {location}: {message}")]
    MalformedInput { location: String, message: String },

    #[error("input selection failed: {0}")]
    Selection(String),

    #[error("unsupported value kind at {path}: {kind}")]
    UnsupportedValueKind { path: String, kind: String },

    #[error("heterogeneous array at {path}: element {index} does not match the type of element 0")]
    HeterogeneousArray { path: String, index: usize },

    #[error("document root must be a keyed record, found {kind}")]
    RootNotRecord { kind: &'static str },

    #[error("type name `{type_name}` derived from both `{previous}` and `{replacement}`")]
    TypeNameCollision {
        type_name: String,
        previous: String,
        replacement: String,
    },

    #[error("cyclic type dependency among: {}", .types.join(", "))]
    CyclicTypeDependency { types: Vec<String> },

    #[error("cannot render schema view: {0}")]
    SchemaRender(#[from] serde_json::Error),
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
