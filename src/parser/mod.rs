pub mod fit;
pub mod gpx;
pub mod scratch;

pub use fit::*;
pub use gpx::*;
pub use scratch::*;
