pub mod capture;
pub mod config;
pub mod controls;
pub mod screen;

pub use capture::*;
pub use config::*;
pub use controls::*;
pub use screen::*;
