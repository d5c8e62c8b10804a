//! Prerollforge-Timeline: from user input to a finished preroll.
//!
//! A preroll is a fixed 10-second leader:
//!
//! | Segment | Length | Video | Audio |
//! |---|---|---|---|
//! | Intro | 8 s | title, optional version | silence |
//! | Pop | one frame | large "2" | 1 kHz tone |
//! | Tail | the rest | black | silence |
//!
//! The pipeline is [`params`] (validation) → [`segment`] (timeline) →
//! [`sequencer`] (ordered engine steps built from [`operation`]s) →
//! [`generate`] (execution) → [`artifact`] (the file and its name).
//!
//! # Examples
//!
//! ```
//! use prerollforge_av::{EncodingEngine, MemoryEngine};
//! use prerollforge_timeline::{generate_preroll, GenerateOptions, PrerollParameters, RawPrerollInput};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = MemoryEngine::new();
//! engine.initialize().await.unwrap();
//!
//! let params = PrerollParameters::validate(RawPrerollInput {
//!     frame_rate: "23.976".into(),
//!     resolution: "1920x1080".into(),
//!     film_title: "Test".into(),
//!     version: None,
//!     timecode: "00:59:50:00".into(),
//! })
//! .unwrap();
//!
//! let artifact = generate_preroll(&engine, &params, &GenerateOptions::default())
//!     .await
//!     .unwrap();
//! assert!(artifact.suggested_file_name.starts_with("Test_"));
//! # });
//! ```

pub mod artifact;
pub mod filter;
pub mod generate;
pub mod operation;
pub mod params;
pub mod progress;
pub mod segment;
pub mod sequencer;

pub use artifact::{sanitize_title, suggested_file_name, OutputArtifact};
pub use generate::{generate_preroll, GenerateOptions, PrerollGenerator};
pub use operation::EncodeOperation;
pub use params::{FrameRate, PrerollParameters, RawPrerollInput, Resolution, Timecode, TimelineDurations};
pub use progress::ProgressSender;
pub use segment::{MediaSegmentSpec, Timeline};
pub use sequencer::{EngineStep, FontResource, Plan, PlanOptions, RequestTag};
