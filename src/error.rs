use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfMonoError {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Cannot open document: {0}")]
    DocumentOpenError(String),

    #[error("Empty page selection: {0}")]
    EmptyPageSelection(String),

    #[error("Page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Encode error: {0}")]
    EncodeError(String),

    #[error("Assembly error: {0}")]
    AssemblyError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`PdfMonoError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl PdfMonoError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create an input-not-found error.
    input_not_found => InputNotFound,
    /// Create a document open error.
    document_open => DocumentOpenError,
    /// Create an empty page selection error.
    empty_selection => EmptyPageSelection,
    /// Create a render error.
    render => RenderError,
    /// Create an encode error.
    encode => EncodeError,
    /// Create an assembly error.
    assembly => AssemblyError,
    /// Create a write error.
    write => WriteError,
    /// Create a configuration error.
    config => ConfigError,
}

impl From<lopdf::Error> for PdfMonoError {
    fn from(e: lopdf::Error) -> Self {
        Self::AssemblyError(e.to_string())
    }
}

impl From<serde_yml::Error> for PdfMonoError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<pdfium_render::prelude::PdfiumError> for PdfMonoError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        Self::RenderError(e.to_string())
    }
}

impl From<image::ImageError> for PdfMonoError {
    fn from(e: image::ImageError) -> Self {
        Self::EncodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfMonoError>;
