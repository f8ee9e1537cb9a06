use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    InvalidTypeSignature { signature: String, message: String },
    DuplicateType(String),
    InvalidArgument(String),
    SerializationError(String),
}

impl Error {
    /// Attach the file an error originated from, when it is not known yet
    pub fn in_file(self, path: &std::path::Path) -> Self {
        match self {
            Error::ParseError { file, message } if file.as_os_str() == "<unknown>" => {
                Error::ParseError {
                    file: path.to_path_buf(),
                    message,
                }
            }
            Error::InvalidTypeSignature { signature, message } => Error::ParseError {
                file: path.to_path_buf(),
                message: format!("invalid type signature `{}`: {}", signature, message),
            },
            Error::SerializationError(message) => Error::ParseError {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::InvalidTypeSignature { signature, message } => {
                write!(f, "Invalid type signature `{}`: {}", signature, message)
            }
            Error::DuplicateType(name) => write!(f, "Type indexed more than once: {}", name),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML error: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}
