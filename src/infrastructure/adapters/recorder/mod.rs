//! Audio Recorder Adapter

mod fake_audio_recorder;

pub use fake_audio_recorder::{FakeAudioRecorder, FakeRecorderBehavior};
