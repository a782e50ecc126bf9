//! # Motion Clip
//!
//! One loaded capture file: skeleton, frames and the unit scale detected
//! for it. Built in one step; there is no partially loaded clip.

use std::path::Path;

use crate::error::{MotionError, MotionResult};
use crate::parser::parse;
use crate::scale::ScaleFactor;
use crate::skeleton::{FrameSet, Skeleton};

/// A parsed, immutable capture. Shared across threads behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionClip {
    skeleton: Skeleton,
    frames: FrameSet,
    scale: ScaleFactor,
}

impl MotionClip {
    /// Parses capture text.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Format`] if the text is not a valid capture.
    pub fn parse(text: &str) -> MotionResult<Self> {
        let (skeleton, frames) = parse(text)?;
        let scale = ScaleFactor::detect(&skeleton, &frames);
        Ok(Self {
            skeleton,
            frames,
            scale,
        })
    }

    /// Reads and parses a capture file.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Io`] if the file cannot be read, or
    /// [`MotionError::Format`] if its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MotionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let clip = Self::parse(&text)?;

        tracing::info!(
            path = %path.display(),
            bones = clip.skeleton.len(),
            frames = clip.frames.len(),
            frame_time = clip.frames.frame_time(),
            scale = clip.scale.value(),
            "Loaded motion clip"
        );
        Ok(clip)
    }

    /// Joint hierarchy.
    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Frame data.
    #[must_use]
    pub const fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Unit scale applied to root positions.
    #[must_use]
    pub const fn scale(&self) -> ScaleFactor {
        self.scale
    }

    /// Number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Seconds per frame.
    #[must_use]
    pub const fn frame_time(&self) -> f32 {
        self.frames.frame_time()
    }

    /// Frames per second, rounded to the nearest whole tick rate.
    #[must_use]
    pub fn frame_rate(&self) -> u32 {
        (1.0 / self.frames.frame_time()).round().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    const CLIP: &str = "HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  End Site
  {
    OFFSET 0 10 0
  }
}
MOTION
Frames: 3
Frame Time: 0.0333333
0 95 0 0 0 0
0 95 1 0 10 0
0 95 2 0 20 0
";

    #[test]
    fn test_parse_detects_scale() {
        let clip = MotionClip::parse(CLIP).unwrap();
        assert_eq!(clip.frame_count(), 3);
        assert_eq!(clip.scale(), ScaleFactor::CENTIMETRES);
        assert_eq!(clip.frame_rate(), 30);
        assert_eq!(clip.skeleton().len(), 1);
    }

    #[test]
    fn test_parse_error_is_format() {
        let err = MotionClip::parse("HIERARCHY\nROOT Hips\n{\n}\n").unwrap_err();
        assert!(matches!(err, MotionError::Format(FormatError::MissingMotion)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MotionClip::load("/definitely/not/here.bvh").unwrap_err();
        match err {
            MotionError::Io { path, .. } => assert!(path.ends_with("here.bvh")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
