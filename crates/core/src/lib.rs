mod cache;
mod cancel;
mod duration;
mod error;
mod fs;
mod probe;
mod session;
mod size;
mod tree;

#[cfg(test)]
mod testing;

pub use cache::AggregateCache;
pub use cancel::CancelHandle;
pub use duration::DurationAggregator;
pub use error::{AggregateError, ProbeError};
pub use fs::{DirListing, FileEntry, FileSystem, LocalFileSystem};
pub use probe::{FfprobeProbe, MediaInfoProbe, MediaProbe, ProbeRunner, probe_from_settings};
pub use session::TraversalSession;
pub use size::SizeAggregator;
pub use tree::TreeBuilder;

pub(crate) type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
