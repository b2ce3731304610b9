use std::f64::consts::PI;
use std::io::Write;

use tracing::info;

use crate::config::DURATION_SECONDS;
use crate::error::Result;

pub const SAMPLE_RATE: u32 = 48_000;
/// Middle C.
pub const TONE_HZ: f64 = 261.62;
/// 0.1 s of tone at the top of every second.
pub const BEEP_SAMPLES: u32 = SAMPLE_RATE / 10;

/// A mono, 16-bit little-endian PCM track that beeps once per second, meant to
/// be muxed next to the rendered frames so audio drift is audible.
#[derive(Clone, Copy, Debug)]
pub struct BeepTrack {
    pub seconds: u32,
}

impl Default for BeepTrack {
    fn default() -> Self {
        Self {
            seconds: DURATION_SECONDS,
        }
    }
}

impl BeepTrack {
    pub fn new(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn byte_len(&self) -> u64 {
        self.seconds as u64 * SAMPLE_RATE as u64 * 2
    }

    /// One second of audio: the beep, then silence.
    pub fn second(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SAMPLE_RATE as usize * 2);
        for i in 0..SAMPLE_RATE {
            let sample = if i < BEEP_SAMPLES { beep_sample(i) } else { 0 };
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<u64> {
        let second = self.second();
        for _ in 0..self.seconds {
            writer.write_all(&second)?;
        }
        writer.flush()?;
        info!("Wrote {} seconds of audio", self.seconds);
        Ok(self.byte_len())
    }
}

/// The tone is quantised to 8 bits and carried in the high byte.
fn beep_sample(i: u32) -> i16 {
    let v = (i as f64 * 2.0 * PI / SAMPLE_RATE as f64 * TONE_HZ).sin();
    let quantised = (v * 127.0) as i16;
    quantised << 8
}
