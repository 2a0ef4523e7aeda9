/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time, so
/// there are no audio assets to load or fail on. Playback is
/// fire-and-forget (non-blocking) via rodio's Sink; an unavailable
/// output device degrades to silence.
///
/// Compile without the "sound" feature to drop audio entirely (the stub
/// SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = 2.0 * std::f32::consts::PI;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_pickup: Arc<Vec<u8>>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_fall: Arc<Vec<u8>>,
        sfx_caught: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_pickup: Arc::new(wav_bytes(&gen_pickup())),
                sfx_jump: Arc::new(wav_bytes(&gen_jump())),
                sfx_fall: Arc::new(wav_bytes(&gen_fall())),
                sfx_caught: Arc::new(wav_bytes(&gen_caught())),
                sfx_win: Arc::new(wav_bytes(&gen_win())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_pickup(&self) {
            self.play(&self.sfx_pickup);
        }
        pub fn play_jump(&self) {
            self.play(&self.sfx_jump);
        }
        pub fn play_fall(&self) {
            self.play(&self.sfx_fall);
        }
        pub fn play_caught(&self) {
            self.play(&self.sfx_caught);
        }
        pub fn play_win(&self) {
            self.play(&self.sfx_win);
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(samples: &mut Vec<f32>, freq: f32, duration: f32, volume: f32) {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.5);
            // Sine + 3rd harmonic for a square-ish retro timbre
            let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
            samples.push(wave * env * volume);
        }
    }

    /// Coin pickup: quick ascending arpeggio D6→F#6→A6
    fn gen_pickup() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[1175.0_f32, 1480.0, 1760.0] {
            tone(&mut samples, freq, 0.045, 0.25);
        }
        samples
    }

    /// Jump: short rising sweep
    fn gen_jump() -> Vec<f32> {
        let duration = 0.1;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 250.0 + t * 400.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (ti * freq * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Fall start: short descending whistle
    fn gen_fall() -> Vec<f32> {
        let duration = 0.15;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 600.0 - t * 400.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.6);
                (ti * freq * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Caught by an enemy: sad descending tones with a final fade
    fn gen_caught() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[392.0_f32, 330.0, 277.0, 233.0] {
            tone(&mut samples, freq, 0.13, 0.3);
        }
        let total = samples.len();
        let fade = total / 4;
        for i in (total - fade)..total {
            samples[i] *= (total - i) as f32 / fade as f32;
        }
        samples
    }

    /// All coins collected: ascending fanfare with a sustained top note
    fn gen_win() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[523.0_f32, 659.0, 784.0] {
            tone(&mut samples, freq, 0.09, 0.3);
        }
        tone(&mut samples, 1047.0, 0.3, 0.3);
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn wav_bytes(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play_pickup(&self) {}
    pub fn play_jump(&self) {}
    pub fn play_fall(&self) {}
    pub fn play_caught(&self) {}
    pub fn play_win(&self) {}
}
