pub mod example;
pub mod dataloader;

pub mod simple;
pub mod image_dir;

pub use example::*;
pub use dataloader::*;
pub use simple::*;
pub use image_dir::*;
