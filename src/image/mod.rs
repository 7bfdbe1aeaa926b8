pub mod sampler;

pub use sampler::{ImagePoint, PixelBuffer, PixelSampler};
