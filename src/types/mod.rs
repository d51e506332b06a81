pub mod activity;
pub mod point;
pub mod track;

pub use activity::*;
pub use point::*;
pub use track::*;
