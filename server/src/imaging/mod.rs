pub mod transcode;

pub use transcode::{transcode_jpeg_blocking, TranscodeError, TranscodeOptions};
