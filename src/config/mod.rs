mod loader;

pub use loader::{CompiledPatterns, ConfigError, UseConfig};
