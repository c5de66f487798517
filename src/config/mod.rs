//! Configuration module for sqlsynth.
//!
//! Handles the settings file, generation parameters and path resolution.

mod settings;

pub use settings::{
    expand_env_vars, scaled_count, GenerationSettings, ParaphraseSettings, PathSettings, Settings,
    SettingsError,
};
