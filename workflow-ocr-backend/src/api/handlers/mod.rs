pub mod languages;
pub mod lifecycle;
pub mod ocr;

pub use lifecycle::heartbeat;
