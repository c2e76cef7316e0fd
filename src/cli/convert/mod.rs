mod convert_impl;
pub mod progress;

// Re-export the main convert function
pub use convert_impl::cmd_convert;
