pub mod caption;
pub mod health;

pub use caption::{caption_preflight, create_caption, method_not_allowed};
pub use health::health_check;
