/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_sting: Arc<Vec<u8>>,
        sfx_whoosh: Arc<Vec<u8>>,
        sfx_chime: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_sting: Arc::new(make_wav(&gen_sting())),
                sfx_whoosh: Arc::new(make_wav(&gen_whoosh())),
                sfx_chime: Arc::new(make_wav(&gen_chime())),
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

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_sting(&self) { self.play(&self.sfx_sting); }
        pub fn play_whoosh(&self) { self.play(&self.sfx_whoosh); }
        pub fn play_chime(&self) { self.play(&self.sfx_chime); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Jump: quick upward sweep 300Hz → 700Hz
    pub(super) fn gen_jump() -> Vec<f32> {
        let n = samples_for(0.12);
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * 400.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * TAU).sin() * env * 0.25
            })
            .collect()
    }

    /// Antagonist: low dissonant stab (minor second) with slow decay
    pub(super) fn gen_sting() -> Vec<f32> {
        let n = samples_for(0.45);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                let wave = (t * 110.0 * TAU).sin() * 0.5
                    + (t * 116.5 * TAU).sin() * 0.4
                    + (t * 220.0 * 3.0 * TAU).sin() * 0.1;
                wave * env * 0.35
            })
            .collect()
    }

    /// Ladder leaving: filtered noise rising then falling
    pub(super) fn gen_whoosh() -> Vec<f32> {
        let n = samples_for(0.2);
        let mut rng: u32 = 4242;
        let mut prev = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                // One-pole low-pass
                prev += (noise - prev) * 0.15;
                let env = (t * std::f32::consts::PI).sin();
                prev * env * 0.5
            })
            .collect()
    }

    /// Message: two-note chime E5 → A5
    pub(super) fn gen_chime() -> Vec<f32> {
        let pairs = [(659.0_f32, 0.09), (880.0, 0.22)];
        let mut samples = Vec::new();
        for &(freq, dur) in &pairs {
            let n = samples_for(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7
                    + (t * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
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
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_sting(&self) {}
    pub fn play_whoosh(&self) {}
    pub fn play_chime(&self) {}
}

impl SoundEngine {
    /// Play whatever effect an event calls for.
    pub fn play_for(&self, event: &GameEvent) {
        match event {
            GameEvent::Jumped => self.play_jump(),
            GameEvent::AntagonistShown(_) => self.play_sting(),
            GameEvent::LadderLeft => self.play_whoosh(),
            GameEvent::MessageShown(_) => self.play_chime(),
            _ => {}
        }
    }
}
