mod bytes;
pub mod duration;
mod label;
pub mod media_types;
mod path;
mod progress;

pub use bytes::format_size;
pub use duration::{duration_from_millis, format_duration};
pub use label::format_label;
pub use media_types::VideoExtensions;
pub use path::display_name;
pub use progress::Progress;
