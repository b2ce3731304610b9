use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, instrument};

use crate::error::Result;
use crate::render::FrameSource;
use crate::sink::FrameSink;

/// Passive consumer of each frame after it reached the sink. Observers cannot
/// fail or slow the run down in any way the output can see.
pub trait FrameObserver {
    fn observe(&mut self, index: u32, frame: &RgbImage);
}

/// Drives a [`FrameSource`] over every frame index, in order, into a sink.
pub struct FrameSequencer {
    progress: ProgressBar,
    observers: Vec<Box<dyn FrameObserver + Send>>,
}

impl FrameSequencer {
    pub fn new(progress: ProgressBar) -> Self {
        Self {
            progress,
            observers: Vec::new(),
        }
    }

    pub fn with_progress_bar(total: u64) -> anyhow::Result<Self> {
        let pb = ProgressBar::new(total);
        pb.set_style(ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?);
        Ok(Self::new(pb))
    }

    pub fn observe(&mut self, observer: Box<dyn FrameObserver + Send>) {
        self.observers.push(observer);
    }

    /// Renders frames `0..=source.last_frame()` and hands each to `sink`.
    /// Stops at the first failure; nothing after the failing frame is
    /// rendered or written.
    #[instrument(skip_all)]
    pub fn run<S, K>(&mut self, source: &S, sink: &mut K) -> Result<u64>
    where
        S: FrameSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let last = source.last_frame();
        let mut buffer = source.blank();
        let mut written = 0u64;
        info!("Rendering frames 0..={}", last);

        for index in 0..=last {
            source.render_into(index, &mut buffer)?;
            if let Err(e) = sink.write_frame(index, &buffer) {
                error!("Aborting run at frame {}: {}", index, e);
                self.progress.abandon();
                return Err(e);
            }
            written += 1;
            for observer in self.observers.iter_mut() {
                observer.observe(index, &buffer);
            }
            self.progress.inc(1);
            if index % 1800 == 0 {
                debug!("Wrote frame {}", index);
            }
        }

        self.progress.finish_and_clear();
        info!("Wrote {} frames", written);
        Ok(written)
    }
}
