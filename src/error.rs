use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToWriteOutputFile(String, std::io::Error),
    InputFileHasNoName(String),
    PathInsideStagingDirectory(String),
    DuplicateOutputFile(String),
    FailedToInitializeStorage(String, std::io::Error),
    FailedToReadFromStorage(String, std::io::Error),
    FailedToWriteToStorage(String, std::io::Error),
    FailedToRemoveFromStorage(String, std::io::Error),
    FailedToReadSource(std::io::Error),
    FailedToWriteBits(std::io::Error),
    SymbolNotPresentInCodeTable(u8),
    SourceChangedBetweenPasses { expected: u64, actual: u64 },
    InvalidContainerMagic,
    UnsupportedContainerVersion(u8),
    TruncatedContainer(&'static str),
    InvalidTreeShape,
    IncompleteCodeWord,
    DecodedLengthMismatch { expected: u64, actual: u64 },
    WorkerTerminatedUnexpectedly(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToWriteOutputFile(path, error) => {
                write!(f, "Failed to write output file '{}': {}", path, error)
            }
            Self::InputFileHasNoName(path) => {
                write!(f, "Input path '{}' does not name a file", path)
            }
            Self::PathInsideStagingDirectory(path) => {
                write!(
                    f,
                    "'{}' lies inside the staging directory, which is wiped on start",
                    path
                )
            }
            Self::DuplicateOutputFile(path) => {
                write!(f, "More than one input would be written to '{}'", path)
            }
            Self::FailedToInitializeStorage(path, error) => {
                write!(
                    f,
                    "Failed to initialize staging directory '{}': {}",
                    path, error
                )
            }
            Self::FailedToReadFromStorage(id, error) => {
                write!(f, "Failed to read staged file '{}': {}", id, error)
            }
            Self::FailedToWriteToStorage(id, error) => {
                write!(f, "Failed to write staged file '{}': {}", id, error)
            }
            Self::FailedToRemoveFromStorage(id, error) => {
                write!(f, "Failed to remove staged file '{}': {}", id, error)
            }
            Self::FailedToReadSource(error) => {
                write!(f, "Failed to read input bytes: {}", error)
            }
            Self::FailedToWriteBits(error) => {
                write!(f, "Failed to write packed bits: {}", error)
            }
            Self::SymbolNotPresentInCodeTable(symbol) => {
                write!(f, "Byte {:#04x} not present in code table", symbol)
            }
            Self::SourceChangedBetweenPasses { expected, actual } => {
                write!(
                    f,
                    "Input changed between passes: counted {} bytes, packed {}",
                    expected, actual
                )
            }
            Self::InvalidContainerMagic => write!(f, "Input is not a framed huffman container"),
            Self::UnsupportedContainerVersion(version) => {
                write!(f, "Unsupported container version {}", version)
            }
            Self::TruncatedContainer(section) => {
                write!(f, "Container truncated while reading {}", section)
            }
            Self::InvalidTreeShape => write!(f, "Container holds an invalid tree shape"),
            Self::IncompleteCodeWord => {
                write!(f, "Payload ends in the middle of a code word")
            }
            Self::DecodedLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Decoded {} bytes, but container announced {}",
                    actual, expected
                )
            }
            Self::WorkerTerminatedUnexpectedly(path) => {
                write!(f, "Worker processing '{}' terminated unexpectedly", path)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn test_symbol_display_is_hex() {
        let message = Error::SymbolNotPresentInCodeTable(0x41).to_string();
        assert_eq!(message, "Byte 0x41 not present in code table");
    }

    #[test]
    fn test_source_changed_display_names_both_counts() {
        let message = Error::SourceChangedBetweenPasses {
            expected: 10,
            actual: 7,
        }
        .to_string();
        assert!(message.contains("10"));
        assert!(message.contains("7"));
    }
}
