//! Speech Engine Adapter

mod fake_speech_engine;

pub use fake_speech_engine::{CompletionMode, FakeSpeechEngine, FakeSpeechEngineConfig};
