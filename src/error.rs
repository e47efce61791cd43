use std::fmt;
use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types; each one stops the generation run
#[derive(Debug)]
pub enum Error {
    /// A configuration file is not valid YAML, or uses an unsupported tag
    ParseError { file: PathBuf, message: String },
    /// The root deployment descriptor does not exist
    ConfigNotFound(PathBuf),
    /// A function reference does not follow the `${file(...)}` form
    MalformedReference { reference: String },
    /// The output file (or one of its parents) could not be written
    IoError { path: PathBuf, source: std::io::Error },
    SerializationError(String),
    /// Two routes document the same path and method while collisions are fatal
    DuplicateOperation { path: String, method: String },
}

impl Error {
    pub(crate) fn parse(file: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Error::ParseError {
            file: file.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            Error::MalformedReference { reference } => write!(
                f,
                "Malformed function reference '{}': expected ${{file(<path>)}} or a plain path",
                reference
            ),
            Error::IoError { path, source } => {
                write!(f, "IO error on {}: {}", path.display(), source)
            }
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DuplicateOperation { path, method } => write!(
                f,
                "Operation {} {} is documented more than once",
                method.to_uppercase(),
                path
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

/// Non-fatal conditions raised during a run.
///
/// Each diagnostic is logged where it is raised and also handed back to the
/// caller, so a run can be summarized (or asserted on) without scraping logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A referenced fragment file does not exist and was skipped
    MissingFragment { path: PathBuf },
    /// A header named in `requestHeaders` is absent from the components registry
    MissingComponent { header: String },
    /// A route tag is not declared in `api.tags` and was dropped
    UnknownTag { tag: String },
    /// The HTTP method cannot be expressed as an OpenAPI operation
    UnsupportedMethod { path: String, method: String },
    /// A later route replaced an operation that was already documented
    DuplicateOperation { path: String, method: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::MissingFragment { path } => {
                write!(f, "File NOT found: {}", path.display())
            }
            Diagnostic::MissingComponent { header } => {
                write!(f, "Header not found in components: {}", header)
            }
            Diagnostic::UnknownTag { tag } => write!(
                f,
                "Tag '{}' is not found in custom.documentation.api.tags, skipping",
                tag
            ),
            Diagnostic::UnsupportedMethod { path, method } => {
                write!(f, "Unsupported HTTP method '{}' on {}, skipping", method, path)
            }
            Diagnostic::DuplicateOperation { path, method } => write!(
                f,
                "Operation {} {} documented more than once, keeping the last definition",
                method.to_uppercase(),
                path
            ),
        }
    }
}
