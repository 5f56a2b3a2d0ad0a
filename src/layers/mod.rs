mod fc_layer;
mod pass;

pub use fc_layer::*;
pub use pass::*;
