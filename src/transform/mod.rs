pub mod cleaning;

pub use cleaning::CleaningTransform;
