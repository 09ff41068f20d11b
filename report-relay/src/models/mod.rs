pub mod caption;

pub use caption::{CaptionRequest, CaptionResponse};
