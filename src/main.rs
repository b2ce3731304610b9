use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::{error, info, instrument, warn};

#[cfg(feature = "preview")]
use streamgen::preview;
use streamgen::audio::BeepTrack;
use streamgen::config::{RenderConfig, DURATION_SECONDS};
use streamgen::log::init_logger;
use streamgen::text::Typeface;
use streamgen::{BmpSink, FrameRenderer, FrameSequencer};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// log level
    #[arg(long, global = true, default_value_t = String::from("info"))]
    log_level: String,

    /// log file
    #[arg(long, global = true, default_value_t = String::from("streamgen.log"))]
    log_file: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the 2 hour test pattern as back-to-back BMP frames
    Video(VideoArgs),

    /// Write the matching 1 Hz beep track as raw s16le PCM, 48 kHz mono
    Audio(AudioArgs),
}

#[derive(ClapArgs, Debug)]
struct VideoArgs {
    /// frame height, one of 480, 720 or 1080
    height: u32,

    /// output file, `-` for stdout
    #[arg(short, long, default_value_t = String::from("-"))]
    output: String,

    /// TrueType font used for labels, the bundled face when omitted
    #[arg(long)]
    font: Option<String>,

    /// mirror frames in a window while rendering
    #[arg(long)]
    preview: bool,

    /// hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(ClapArgs, Debug)]
struct AudioArgs {
    /// track length in seconds
    #[arg(long, default_value_t = DURATION_SECONDS)]
    seconds: u32,

    /// output file, `-` for stdout
    #[arg(short, long, default_value_t = String::from("-"))]
    output: String,
}

fn main() -> Result<()> {
    let args: Args = Args::parse();

    let guard = init_logger(args.log_level, args.log_file)?;
    let start = Instant::now();

    let result = match args.command {
        Command::Video(video) => run_video(video),
        Command::Audio(audio) => run_audio(audio),
    };

    match &result {
        Ok(()) => info!("Time elapsed: {:?}", start.elapsed()),
        Err(e) => error!("{:#}", e),
    }

    drop(guard);
    result
}

#[instrument(skip_all, fields(height = args.height))]
fn run_video(args: VideoArgs) -> Result<()> {
    let config = RenderConfig::from_height(args.height)?;
    let typeface = load_typeface(args.font.as_deref())?;
    let renderer = FrameRenderer::new(config, typeface);
    let mut sink = BmpSink::new(open_output(&args.output)?);

    let mut sequencer = if args.no_progress {
        FrameSequencer::new(ProgressBar::hidden())
    } else {
        FrameSequencer::with_progress_bar(config.frame_count())?
    };

    info!(
        "Rendering {}x{} at {} fps, {} frames to {}",
        config.width,
        config.height,
        config.frames_per_second,
        config.frame_count(),
        args.output
    );

    if args.preview {
        return run_with_preview(sequencer, renderer, sink);
    }

    sequencer.run(&renderer, &mut sink)?;
    Ok(())
}

#[cfg(feature = "preview")]
fn run_with_preview(
    mut sequencer: FrameSequencer,
    renderer: FrameRenderer,
    mut sink: BmpSink<Box<dyn Write + Send>>,
) -> Result<()> {
    let config = *renderer.config();
    let (observer, rx) = preview::channel();
    sequencer.observe(Box::new(observer));

    let worker = std::thread::spawn(move || sequencer.run(&renderer, &mut sink));

    if let Err(e) = preview::run_window(rx, config.width, config.height) {
        warn!("Preview unavailable: {:#}", e);
    }

    match worker.join() {
        Ok(result) => {
            result?;
            Ok(())
        }
        Err(_) => Err(anyhow::anyhow!("Render thread panicked")),
    }
}

#[cfg(not(feature = "preview"))]
fn run_with_preview(
    mut sequencer: FrameSequencer,
    renderer: FrameRenderer,
    mut sink: BmpSink<Box<dyn Write + Send>>,
) -> Result<()> {
    warn!("Built without the `preview` feature, rendering without a window");
    sequencer.run(&renderer, &mut sink)?;
    Ok(())
}

#[instrument(skip_all, fields(seconds = args.seconds))]
fn run_audio(args: AudioArgs) -> Result<()> {
    let track = BeepTrack::new(args.seconds);
    let mut output = open_output(&args.output)?;
    info!("Writing {} bytes of PCM to {}", track.byte_len(), args.output);
    track.write(&mut output)?;
    Ok(())
}

fn load_typeface(font: Option<&str>) -> streamgen::Result<Typeface> {
    match font {
        Some(path) => Typeface::load(Path::new(path)),
        None => Typeface::bundled(),
    }
}

fn open_output(output: &str) -> Result<Box<dyn Write + Send>> {
    if output == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
    Ok(Box::new(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_video_options() {
        let args = Args::try_parse_from([
            "streamgen",
            "video",
            "720",
            "--output",
            "out.bmps",
            "--no-progress",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level, "debug");
        match args.command {
            Command::Video(video) => {
                assert_eq!(video.height, 720);
                assert_eq!(video.output, "out.bmps");
                assert!(video.font.is_none());
                assert!(video.no_progress);
                assert!(!video.preview);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_audio_defaults_to_two_hours_on_stdout() {
        let args = Args::try_parse_from(["streamgen", "audio"]).unwrap();
        match args.command {
            Command::Audio(audio) => {
                assert_eq!(audio.seconds, 7200);
                assert_eq!(audio.output, "-");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn video_requires_a_height() {
        assert!(Args::try_parse_from(["streamgen", "video"]).is_err());
    }

    #[test]
    fn unsupported_height_fails_before_any_output() {
        let dir = std::env::temp_dir().join(format!("streamgen-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("frames.bmps");
        let result = run_video(VideoArgs {
            height: 576,
            output: output.to_string_lossy().into_owned(),
            font: None,
            preview: false,
            no_progress: true,
        });
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<streamgen::StreamgenError>(),
            Some(streamgen::StreamgenError::UnsupportedHeight(576))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn missing_font_fails_before_any_output() {
        let dir = std::env::temp_dir().join(format!("streamgen-font-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("frames.bmps");
        let result = run_video(VideoArgs {
            height: 480,
            output: output.to_string_lossy().into_owned(),
            font: Some("no/such/font.ttf".to_string()),
            preview: false,
            no_progress: true,
        });
        assert!(matches!(
            result.unwrap_err().downcast_ref::<streamgen::StreamgenError>(),
            Some(streamgen::StreamgenError::Font { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn explicit_font_flag_is_parsed() {
        let args = Args::try_parse_from(["streamgen", "video", "480", "--font", "a.ttf"]).unwrap();
        match args.command {
            Command::Video(video) => assert_eq!(video.font.as_deref(), Some("a.ttf")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn default_font_works_outside_the_source_tree() {
        let dir = std::env::temp_dir().join(format!("streamgen-cwd-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(&dir).unwrap();
        let loaded = load_typeface(None);
        std::env::set_current_dir(previous).unwrap();

        let config = RenderConfig::from_height(480).unwrap();
        let renderer = FrameRenderer::new(config, loaded.unwrap());
        let frame = renderer.render(0).unwrap();
        assert_eq!(frame.dimensions(), (640, 480));
    }
}
