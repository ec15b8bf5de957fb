//! Drowse Adapters - Landmark stream adapters for drowse.
//!
//! This crate provides adapters for:
//! - JSON Lines landmark recordings on disk, with file discovery
//! - Landmark streams from any reader, such as stdin
//! - The wire format of one recorded frame

pub mod fs;
pub mod record;
pub mod stream;

pub use fs::{collect_recordings, FsLandmarkSource};
pub use record::FrameRecord;
pub use stream::StreamLandmarkSource;
