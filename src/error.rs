//! Error kinds the core can raise (§7). `DegenerateShape` is deliberately
//! absent here: per §7 it is non-fatal and handled as a normal result.

#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// Codepoint has no glyph index in the font.
    GlyphNotInFont,
    /// The parser produced an ill-formed segment (NaN/infinite control
    /// points).
    CorruptedOutline,
    /// The caller's allocator returned an error.
    AllocationFailed,
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    context: String,
}

impl ErrorKind {
    pub fn with(self, context: impl Into<String>) -> Error {
        Error { kind: self, context: context.into() }
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::GlyphNotInFont => write!(f, "glyph not in font: {}", self.context),
            ErrorKind::CorruptedOutline => write!(f, "corrupted outline: {}", self.context),
            ErrorKind::AllocationFailed => write!(f, "allocation failed: {}", self.context),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
