use std::fmt;

// ----------------------------------------------
// EditorError
// ----------------------------------------------

// Shared error type for the editor core.
//
// `Asset` and `CorruptAsset` are recoverable: a failed sprite lookup leaves
// the cache untouched and a later retry may succeed. `Allocation` is fatal
// for the operation (and usually for the current map). `Configuration`
// indicates a logic bug upstream and callers are expected to abort.
#[derive(Debug)]
pub enum EditorError {
    // Buffer or table construction failure.
    Allocation {
        what: &'static str,
    },

    // Archive open/read or missing-key failure.
    Asset {
        key: String,
        detail: String,
    },

    // Archive entry exists but its payload size does not match
    // the dimensions declared in the entry header.
    CorruptAsset {
        key: String,
        size: usize,
        expected: usize,
    },

    // An internal invariant was violated (e.g. an unsupported map
    // size tier coming from a scenario file).
    Configuration {
        detail: String,
    },

    // Explicitly unimplemented feature was requested.
    Unsupported {
        what: &'static str,
    },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Allocation { what } => {
                write!(f, "Failed to allocate memory for {what}")
            },
            Self::Asset { key, detail } => {
                write!(f, "Failed to load asset \"{key}\": {detail}")
            },
            Self::CorruptAsset { key, size, expected } => {
                write!(f, "Asset \"{key}\" was loaded with size [{size}], expected [{expected}]")
            },
            Self::Configuration { detail } => {
                write!(f, "Configuration error: {detail}")
            },
            Self::Unsupported { what } => {
                write!(f, "{what} not implemented")
            },
        }
    }
}

impl std::error::Error for EditorError {}
