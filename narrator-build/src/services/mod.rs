//! Audio services: external toolchain, file naming, duration parsing and
//! the artifact builder that ties them together.

pub mod artifact_builder;
pub mod duration;
pub mod filenames;
pub mod toolchain;

pub use artifact_builder::{
    ArtifactBuilder, AudioDirs, EncodeOutcome, LocatedSource, RenderedAudio, ResampleOutcome,
};
pub use duration::{parse_playback_length, DurationParseError};
pub use filenames::{clip_file_name, slugify};
pub use toolchain::{AudioToolchain, MissingTool, ProcessToolchain, ToolError};
