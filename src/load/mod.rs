pub mod common;
pub mod json;
pub mod console;
pub mod memory;
