mod settings;

pub use settings::{ProbeBackend, Settings};
