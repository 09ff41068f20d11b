//! Client side of the report relay: pick an image, send it for analysis and
//! render the returned markdown as sanitized HTML.

pub mod config;
pub mod error;
pub mod relay;
pub mod render;
pub mod state;
pub mod upload;

pub use error::ClientError;
pub use relay::RelayClient;
pub use render::{render_analysis, render_markdown, RenderedAnalysis, DISCLAIMER};
pub use state::{Uploader, UploaderState};
pub use upload::{ImageFile, UploadPolicy};
