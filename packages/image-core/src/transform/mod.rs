pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod filters;
pub mod format;
pub mod pipeline;
pub mod resize;

pub use decode::{decode_image, read_orientation};
pub use dimensions::{GeometryPlan, Region, plan_geometry};
pub use encode::encode_image;
pub use format::{OutputFormat, TransformedImage};
pub use pipeline::{apply_pipeline, parse_color};
pub use resize::resize_image;
