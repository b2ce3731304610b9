//! Optional live window mirroring the most recently written frame.
//!
//! The window only ever sees frames through a one-slot channel; when it falls
//! behind, frames are skipped rather than holding up the output stream.

use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use image::RgbImage;
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::sequencer::FrameObserver;

const REFRESH: Duration = Duration::from_millis(33);

/// Sending half, registered with the sequencer.
pub struct PreviewObserver {
    tx: Sender<RgbImage>,
}

impl FrameObserver for PreviewObserver {
    fn observe(&mut self, _index: u32, frame: &RgbImage) {
        // Full or closed: the window is busy or gone, either way skip.
        let _ = self.tx.try_send(frame.clone());
    }
}

pub fn channel() -> (PreviewObserver, Receiver<RgbImage>) {
    let (tx, rx) = bounded(1);
    (PreviewObserver { tx }, rx)
}

/// Runs the window on the calling thread until the producer hangs up.
pub fn run_window(rx: Receiver<RgbImage>, width: u32, height: u32) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Rc::new(
        WindowBuilder::new()
            .with_title("streamgen")
            .with_inner_size(PhysicalSize::new(width, height))
            .build(&event_loop)?,
    );
    let context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create preview context: {}", e))?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create preview surface: {}", e))?;

    let mut latest: Option<RgbImage> = None;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                debug!("Preview window closed, generation continues");
                elwt.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Some(frame) = &latest {
                    let size = window.inner_size();
                    if let Err(e) = present(&mut surface, frame, size) {
                        warn!("Preview redraw failed: {}", e);
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            match rx.try_recv() {
                Ok(frame) => {
                    latest = Some(frame);
                    window.request_redraw();
                }
                Err(TryRecvError::Disconnected) => elwt.exit(),
                Err(TryRecvError::Empty) => {}
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + REFRESH));
        }
        _ => {}
    })?;
    Ok(())
}

fn present(
    surface: &mut softbuffer::Surface<Rc<Window>, Rc<Window>>,
    frame: &RgbImage,
    size: PhysicalSize<u32>,
) -> Result<()> {
    let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
        return Ok(());
    };
    surface
        .resize(w, h)
        .map_err(|e| anyhow::anyhow!("resize: {}", e))?;
    let mut buffer = surface
        .buffer_mut()
        .map_err(|e| anyhow::anyhow!("buffer: {}", e))?;

    // Nearest-neighbour scale into whatever size the window has.
    let (fw, fh) = frame.dimensions();
    for y in 0..size.height {
        let sy = (y as u64 * fh as u64 / size.height as u64) as u32;
        for x in 0..size.width {
            let sx = (x as u64 * fw as u64 / size.width as u64) as u32;
            let [r, g, b] = frame.get_pixel(sx, sy).0;
            buffer[(y * size.width + x) as usize] = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }
    }
    buffer
        .present()
        .map_err(|e| anyhow::anyhow!("present: {}", e))?;
    Ok(())
}
