// Configuration loading

pub mod settings;

pub use settings::{InputMode, Settings};
