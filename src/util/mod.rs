mod util;
mod normalize;
pub mod activation;

pub use util::*;
pub use normalize::*;
pub use activation::*;
