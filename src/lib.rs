mod exports;
pub use exports::*;

pub mod aperture;
pub mod dvh;
pub mod error;
pub mod flatten;
pub mod labels;
pub mod stats;
