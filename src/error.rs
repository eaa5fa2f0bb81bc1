//! Application error type.
//!
//! Only configuration problems and files the user explicitly asked for
//! produce an `AppError`. Database scan and cache problems degrade to
//! "no covmat" or a rebuild and never reach this type.

/// No packages path, unreadable model description, bad flags.
pub const EXIT_CONFIG: u8 = 2;
/// Selection ran but found no usable covmat.
pub const EXIT_NO_COVMAT: u8 = 3;
/// A covmat, export target, or cache directory could not be read or written.
pub const EXIT_DATA: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// A missing or invalid setting. Always fatal.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn no_covmat(message: impl Into<String>) -> Self {
        Self::new(EXIT_NO_COVMAT, message)
    }

    /// Unreadable or malformed data in a file we were asked to use.
    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppError({}): {}", self.exit_code, self.message)
    }
}

impl std::error::Error for AppError {}
