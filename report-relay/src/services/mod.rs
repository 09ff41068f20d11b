pub mod providers;

pub use providers::{
    Extraction, InlineImage, ProviderError, ReportAnalyzer, DEFAULT_IMAGE_MIME_TYPE,
    FALLBACK_CAPTION,
};
