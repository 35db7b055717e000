pub mod about;
pub mod base;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod export;
pub mod gel;
pub mod gel_render;
pub mod oligonucleotide;
pub mod pairing;
pub mod pool;
pub mod render;

pub use error::{AdlemanError, Result};
pub use oligonucleotide::{OligoId, Oligonucleotide};
pub use pool::Pool;
