pub mod framing;
pub mod sentence;

pub use framing::*;
pub use sentence::*;
