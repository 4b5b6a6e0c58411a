use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordlensError {
    #[error("Invalid package: {message}")]
    InvalidPackage { message: String },

    #[error("Missing required part '{part_path}'")]
    MissingPart { part_path: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error("Invalid relationship: {message}")]
    InvalidRelationship { message: String },

    #[error("Document structure error: {0}")]
    Semantic(String),

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, WordlensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = WordlensError::InvalidPackage {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid package: test error");
    }

    #[test]
    fn error_missing_part_formats_correctly() {
        let err = WordlensError::MissingPart {
            part_path: "/word/document.xml".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required part '/word/document.xml'");
    }
}
