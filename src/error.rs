use std::error;
use std::fmt;

/// Convenient result type for actions operations using [`ActionsError`] as the error type.
///
/// Most fallible functions in this crate return this type.
pub type ActionsResult<T> = Result<T, ActionsError>;

/// Main error type for actions operations.
///
/// [`ActionsError`] can represent a single error, an error with additional
/// detail, or multiple aggregated errors, while keeping a unified interface
/// for callers that only care about the [`ErrorKind`].
#[derive(Debug, Clone)]
pub struct ActionsError {
    repr: ErrorRepr,
}

/// Internal representation of error data.
///
/// Users should not interact with this type directly but use [`ActionsError`]
/// methods instead.
#[derive(Debug, Clone)]
enum ErrorRepr {
    /// Error with kind and static description
    WithDescription(ErrorKind, &'static str),
    /// Error with kind, static description, and dynamic detail
    WithDescriptionAndDetail(ErrorKind, &'static str, String),
    /// Multiple aggregated errors
    Many(Vec<ActionsError>),
}

/// Specific categories of errors that can occur while supervising pipelines or
/// working with the event model.
///
/// Control-path errors (`Pipeline*`, `Termination*`) are returned synchronously
/// to the caller of the supervisor; event errors come out of the registry and
/// the parse/serialize paths.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    // Pipeline lifecycle errors
    PipelineAlreadyRunning,
    PipelineNotFound,
    TerminationFailed,
    TerminationTimeout,
    WorkerPanic,

    // Event type registry errors
    DuplicateEventType,
    UnknownEventType,

    // Event payload errors
    MalformedEventPayload,
    SerializationError,

    // Stage errors surfaced by collaborator implementations
    SourceError,
    TransformError,
    ActionError,

    // General errors
    IoError,
    InvalidState,

    // Unknown / Uncategorized
    Unknown,
}

impl ActionsError {
    /// Creates an [`ActionsError`] containing multiple aggregated errors.
    ///
    /// Useful when several operations fail and all failures should be reported
    /// rather than just the first one.
    pub fn many(errors: Vec<ActionsError>) -> ActionsError {
        ActionsError {
            repr: ErrorRepr::Many(errors),
        }
    }

    /// Returns the [`ErrorKind`] of this error.
    ///
    /// For multiple errors, returns the kind of the first error or
    /// [`ErrorKind::Unknown`] if the error list is empty.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => kind,
            ErrorRepr::Many(ref errors) => errors
                .first()
                .map(|err| err.kind())
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns all [`ErrorKind`]s present in this error.
    ///
    /// For single errors, returns a vector with one element. For multiple
    /// errors, returns a flattened vector of all error kinds.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match self.repr {
            ErrorRepr::WithDescription(kind, _)
            | ErrorRepr::WithDescriptionAndDetail(kind, _, _) => vec![kind],
            ErrorRepr::Many(ref errors) => errors
                .iter()
                .flat_map(|err| err.kinds())
                .collect::<Vec<_>>(),
        }
    }

    /// Returns the detailed error information if available.
    ///
    /// For multiple errors, returns the detail of the first error that has one.
    pub fn detail(&self) -> Option<&str> {
        match self.repr {
            ErrorRepr::WithDescriptionAndDetail(_, _, ref detail) => Some(detail.as_str()),
            ErrorRepr::Many(ref errors) => errors.iter().find_map(|e| e.detail()),
            _ => None,
        }
    }
}

impl PartialEq for ActionsError {
    fn eq(&self, other: &ActionsError) -> bool {
        match (&self.repr, &other.repr) {
            (ErrorRepr::WithDescription(kind_a, _), ErrorRepr::WithDescription(kind_b, _)) => {
                kind_a == kind_b
            }
            (
                ErrorRepr::WithDescriptionAndDetail(kind_a, _, _),
                ErrorRepr::WithDescriptionAndDetail(kind_b, _, _),
            ) => kind_a == kind_b,
            (ErrorRepr::Many(errors_a), ErrorRepr::Many(errors_b)) => {
                errors_a.len() == errors_b.len()
                    && errors_a.iter().zip(errors_b.iter()).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ActionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;

                Ok(())
            }
            ErrorRepr::WithDescriptionAndDetail(kind, desc, ref detail) => {
                fmt::Debug::fmt(&kind, f)?;
                f.write_str(": ")?;
                desc.fmt(f)?;
                f.write_str(" -> ")?;
                detail.fmt(f)?;

                Ok(())
            }
            ErrorRepr::Many(ref errors) => {
                if errors.is_empty() {
                    write!(f, "Multiple errors occurred (empty)")?;
                } else if errors.len() == 1 {
                    errors[0].fmt(f)?;
                } else {
                    write!(f, "Multiple errors occurred ({} total):", errors.len())?;
                    for (i, error) in errors.iter().enumerate() {
                        write!(f, "\n  {}: {}", i + 1, error)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl error::Error for ActionsError {}

/// Creates an [`ActionsError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for ActionsError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> ActionsError {
        ActionsError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

/// Creates an [`ActionsError`] from an error kind, static description, and dynamic detail.
impl From<(ErrorKind, &'static str, String)> for ActionsError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> ActionsError {
        ActionsError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, desc, detail),
        }
    }
}

/// Creates an [`ActionsError`] from a vector of errors for aggregation.
impl<E> From<Vec<E>> for ActionsError
where
    E: Into<ActionsError>,
{
    fn from(errors: Vec<E>) -> ActionsError {
        ActionsError {
            repr: ErrorRepr::Many(errors.into_iter().map(Into::into).collect()),
        }
    }
}

/// Converts [`std::io::Error`] to [`ActionsError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for ActionsError {
    fn from(err: std::io::Error) -> ActionsError {
        ActionsError {
            repr: ErrorRepr::WithDescriptionAndDetail(
                ErrorKind::IoError,
                "I/O error occurred",
                err.to_string(),
            ),
        }
    }
}

/// Converts [`serde_json::Error`] to [`ActionsError`] with appropriate error kind.
///
/// Schema and syntax failures map to [`ErrorKind::MalformedEventPayload`],
/// underlying I/O failures map to [`ErrorKind::IoError`].
impl From<serde_json::Error> for ActionsError {
    fn from(err: serde_json::Error) -> ActionsError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::MalformedEventPayload,
                "JSON event payload is malformed",
            ),
        };

        ActionsError {
            repr: ErrorRepr::WithDescriptionAndDetail(kind, description, err.to_string()),
        }
    }
}
