//! Request body extractors that reject with [`handler::Error`] instead of
//! plain-text axum rejections.
//!
//! [`handler::Error`]: crate::handler::Error

mod enhanced_json;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::validated_json::ValidateJson;
