//! Error taxonomy for loading, dumping and querying templates.
//!
//! Decode failures carry a [`Path`] from the document root down to the
//! offending node, so a malformed resource is reported together with its
//! logical id and the key that broke it.

use std::fmt;

use thiserror::Error;

use crate::intrinsics::FunctionName;

pub type Result<T> = std::result::Result<T, Error>;

/// Location of a node inside a template, outermost segment first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<String>);

impl Path {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The logical id of the resource this path points into, if any.
    pub fn logical_id(&self) -> Option<&str> {
        match self.0.as_slice() {
            [section, logical_id, ..] if section == "Resources" => Some(logical_id.as_str()),
            _ => None,
        }
    }

    fn prepend(&mut self, segment: String) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<document>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {kind}")]
    Structure {
        path: Path,
        kind: StructureErrorKind,
    },

    #[error("{path}: unknown intrinsic function `{key}`")]
    UnknownIntrinsic { path: Path, key: String },

    #[error("{path}: {function} {reason}")]
    IntrinsicArity {
        path: Path,
        function: FunctionName,
        reason: String,
    },
}

/// Ways well-formed text can violate the template shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureErrorKind {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("unexpected key `{0}`")]
    UnknownKey(String),

    #[error("unknown template section `{0}`")]
    UnknownSection(String),

    #[error("property `{property}` is not part of the {resource_type} schema")]
    UnknownProperty {
        resource_type: String,
        property: String,
    },

    #[error("mapping keys must be scalars, found {0}")]
    InvalidKey(&'static str),

    #[error("unknown policy `{0}`")]
    InvalidPolicy(String),

    #[error("number `{0}` is not finite")]
    NonFiniteNumber(String),
}

impl Error {
    pub(crate) fn structure(kind: StructureErrorKind) -> Self {
        Error::Structure {
            path: Path::default(),
            kind,
        }
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::structure(StructureErrorKind::TypeMismatch { expected, found })
    }

    pub(crate) fn unknown_intrinsic(key: impl Into<String>) -> Self {
        Error::UnknownIntrinsic {
            path: Path::default(),
            key: key.into(),
        }
    }

    pub(crate) fn arity(function: FunctionName, reason: impl Into<String>) -> Self {
        Error::IntrinsicArity {
            path: Path::default(),
            function,
            reason: reason.into(),
        }
    }

    /// Prefix the error location with an enclosing key.
    pub(crate) fn within(mut self, segment: impl Into<String>) -> Self {
        match &mut self {
            Error::Structure { path, .. }
            | Error::UnknownIntrinsic { path, .. }
            | Error::IntrinsicArity { path, .. } => path.prepend(segment.into()),
            Error::Json(_) | Error::Yaml(_) | Error::Io(_) => {}
        }
        self
    }

    /// Prefix the error location with an enclosing list index.
    pub(crate) fn at_index(self, index: usize) -> Self {
        self.within(format!("[{}]", index))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Structure { path, .. }
            | Error::UnknownIntrinsic { path, .. }
            | Error::IntrinsicArity { path, .. } => Some(path),
            Error::Json(_) | Error::Yaml(_) | Error::Io(_) => None,
        }
    }

    /// Logical id of the resource that triggered the error.
    pub fn logical_id(&self) -> Option<&str> {
        self.path().and_then(Path::logical_id)
    }

    /// The text itself was not well-formed JSON or YAML.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Json(_) | Error::Yaml(_))
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, Error::Structure { .. })
    }

    pub fn is_unknown_intrinsic(&self) -> bool {
        matches!(self, Error::UnknownIntrinsic { .. })
    }

    pub fn is_intrinsic_arity(&self) -> bool {
        matches!(self, Error::IntrinsicArity { .. })
    }
}

/// Failure of a typed resource accessor. Never aborts anything beyond the
/// call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no resource with logical id `{0}`")]
    NotFound(String),

    #[error("resource `{logical_id}` is a {found}, not a {expected}")]
    TypeMismatch {
        logical_id: String,
        expected: &'static str,
        found: String,
    },

    #[error("a resource with logical id `{0}` already exists")]
    AlreadyExists(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, LookupError::TypeMismatch { .. })
    }
}
