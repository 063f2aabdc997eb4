mod artifact;

pub use artifact::{Artifact, VideoEnvelope};
