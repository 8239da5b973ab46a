pub mod key;
pub mod params;

pub use key::validate_key;
pub use params::validate_directive;
