//! Procedural test-pattern generator: renders a 2 hour diagnostic clock video
//! frame by frame and streams the frames as uncompressed bitmaps.

pub mod audio;
pub mod config;
pub mod error;
pub mod log;
#[cfg(feature = "preview")]
pub mod preview;
pub mod raster;
pub mod render;
pub mod sequencer;
pub mod sink;
pub mod text;

pub use config::{FrameTime, RenderConfig};
pub use error::{Result, StreamgenError};
pub use render::{FrameRenderer, FrameSource};
pub use sequencer::{FrameObserver, FrameSequencer};
pub use sink::{BmpSink, FrameSink};
