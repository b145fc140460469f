pub mod fix;
pub mod position;

pub use fix::*;
pub use position::*;
