pub mod brd;
pub mod document;

pub use brd::*;
pub use document::*;
