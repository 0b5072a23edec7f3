//! Infrastructure layer - external adapters (database, filesystem, processes).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod preference_store;
pub mod process_player;
pub mod sound_library;

pub use config::{ensure_config_exists, load_config};
pub use preference_store::PreferenceStore;
pub use process_player::ProcessPlayer;
pub use sound_library::SoundLibrary;
