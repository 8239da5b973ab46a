pub mod constants;
pub mod directive;
pub mod errors;
pub mod negotiate;
pub mod responsive;
pub mod storage;
pub mod transform;
pub mod validation;

// 公開API
pub use constants::{
    CACHE_CONTROL_FALLBACK, CACHE_CONTROL_OPTIMIZED, DEFAULT_FIT, DEFAULT_FORMAT, DEFAULT_QUALITY,
    DESKTOP_WIDTH, FALLBACK_MARKER, MAX_DIMENSION, MAX_INPUT_SIZE, MAX_PIXELS, MOBILE_WIDTH,
    TABLET_WIDTH, VARY_NEGOTIATED,
};
pub use directive::{
    Fit, FormatDirective, Gravity, TransformDirective, parse_directive, parse_option_string,
};
pub use errors::{MediaError, StorageError, TransformError};
pub use negotiate::{AUTO_FORMAT_PREFERENCE, AcceptSet, negotiate_format};
pub use responsive::{DeviceClass, classify_user_agent, resolve_auto_width};
pub use storage::client::AccessCredentials;
pub use storage::{
    LocalDirBucket, MemoryBucket, ObjectBucket, ObjectMetadata, SourceObject, StorageProxyClient,
};
pub use transform::{
    OutputFormat, TransformedImage, apply_pipeline, decode_image, encode_image, resize_image,
};
pub use validation::{validate_directive, validate_key};
