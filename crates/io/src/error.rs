use std::fmt;
use std::path::PathBuf;

/// Failure to turn a file on disk into a workbook.
#[derive(Debug)]
pub enum LoadError {
    /// File could not be read at all.
    Io { path: PathBuf, source: std::io::Error },
    /// The spreadsheet decoder rejected the file.
    Decode { path: PathBuf, message: String },
    /// Extension is neither a spreadsheet nor delimited text.
    Unsupported { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Decode { path, message } => write!(f, "cannot parse {}: {}", path.display(), message),
            Self::Unsupported { path } => write!(
                f,
                "{} is not a supported file (expected .xlsx, .xlsm, .xlsb, .xls, .ods, .csv or .tsv)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum PoolError {
    /// The pool already holds its maximum number of files.
    Full { capacity: usize },
    Load(LoadError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "file pool is full ({capacity} files max)"),
            Self::Load(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Full { .. } => None,
        }
    }
}

impl From<LoadError> for PoolError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}
