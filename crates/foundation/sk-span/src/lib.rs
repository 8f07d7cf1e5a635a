//! Source files and source locations
//!
//! Locations are file/byte-offset pairs used for diagnostics and for the
//! location-sensitive name lookup rules: within a scope, a declaration is
//! only visible to lookups performed at or after its own location.

use serde::{Deserialize, Serialize};

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A position in a source file, or no position at all for symbols that were
/// synthesized rather than declared in source text.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    file: u32,
    offset: u32,
}

/// Sentinel file id marking a synthetic location.
const NO_FILE: u32 = u32::MAX;

impl SourceLocation {
    /// A location that refers to no source text.
    pub const NONE: SourceLocation = SourceLocation {
        file: NO_FILE,
        offset: 0,
    };

    pub fn new(file: FileId, offset: u32) -> Self {
        Self {
            file: file.0,
            offset,
        }
    }

    /// Whether this location refers to real source text.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.file != NO_FILE
    }

    /// The file this location points into. `None` for synthetic locations.
    #[must_use]
    pub fn file(&self) -> Option<FileId> {
        if self.is_valid() {
            Some(FileId(self.file))
        } else {
            None
        }
    }

    /// Byte offset within the file.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Lexical ordering within a single file. Returns `false` when either
    /// location is synthetic or the locations are in different files, so
    /// callers can use it directly as a visibility test.
    #[must_use]
    pub fn is_after(&self, other: SourceLocation) -> bool {
        self.is_valid() && other.is_valid() && self.file == other.file && self.offset > other.offset
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::NONE
    }
}
