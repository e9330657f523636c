//! Accepted file types.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{GroveError, Result};

/// File type, named after its canonical extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Png,
    Docx,
    Jpg,
    Svg,
    Gif,
    Txt,
}

impl FileType {
    /// All accepted types.
    pub const ALL: [FileType; 7] = [
        FileType::Pdf,
        FileType::Png,
        FileType::Docx,
        FileType::Jpg,
        FileType::Svg,
        FileType::Gif,
        FileType::Txt,
    ];

    /// Canonical extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Png => "png",
            FileType::Docx => "docx",
            FileType::Jpg => "jpg",
            FileType::Svg => "svg",
            FileType::Gif => "gif",
            FileType::Txt => "txt",
        }
    }

    /// Derive the type from a file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| GroveError::UnsupportedFileType(filename.to_string()))?;
        ext.parse()
    }
}

impl FromStr for FileType {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(FileType::Pdf),
            "png" => Ok(FileType::Png),
            "docx" => Ok(FileType::Docx),
            "jpg" | "jpeg" => Ok(FileType::Jpg),
            "svg" => Ok(FileType::Svg),
            "gif" => Ok(FileType::Gif),
            "txt" => Ok(FileType::Txt),
            _ => Err(GroveError::UnsupportedFileType(s.to_string())),
        }
    }
}

impl TryFrom<String> for FileType {
    type Error = GroveError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
