//! Output destinations

#[cfg(feature = "console")]
pub mod console;
pub mod memory;
pub mod rotating_file;

#[cfg(feature = "console")]
pub use console::ConsoleSink;
pub use memory::SharedBuffer;
pub use rotating_file::RotatingFileWriter;
