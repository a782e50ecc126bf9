//! # Unit Scale Detection
//!
//! Capture files do not say what unit they are in. Exporters that work in
//! centimetres put a standing character's hips around 90–100 units above
//! the floor; exporters in metres put them around 1.
//!
//! The detector looks at one number: the magnitude of the first joint's
//! position in the first frame. Above [`CENTIMETRE_THRESHOLD`] the file is
//! treated as centimetres. This is a heuristic. A metre-scale clip whose
//! root starts 11m from the origin will be misread; that is accepted.

use simulacra_shared::Vec3;

use crate::skeleton::{FrameSet, Skeleton};

/// Root magnitudes above this are read as centimetres.
pub const CENTIMETRE_THRESHOLD: f32 = 10.0;

/// Unit the detector decided on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceUnit {
    /// File positions are metres.
    Metres,
    /// File positions are centimetres.
    Centimetres,
}

/// Multiplier from file units to engine metres. Fixed for one clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    /// Metre-scale source.
    pub const METRES: Self = Self(1.0);
    /// Centimetre-scale source.
    pub const CENTIMETRES: Self = Self(0.01);

    /// Classifies a root position magnitude.
    #[must_use]
    pub fn from_root_magnitude(magnitude: f32) -> Self {
        if magnitude > CENTIMETRE_THRESHOLD {
            Self::CENTIMETRES
        } else {
            Self::METRES
        }
    }

    /// Inspects frame 0 of a parsed file.
    ///
    /// Uses the first joint's X/Y/Z position channels; a file with no
    /// frames or a first joint without position channels is metres.
    #[must_use]
    pub fn detect(skeleton: &Skeleton, frames: &FrameSet) -> Self {
        let root = skeleton
            .bones()
            .first()
            .filter(|b| b.has_position())
            .zip(frames.frame(0))
            .and_then(|(bone, frame)| bone.sample(frame));
        match root {
            Some(sample) => Self::from_root_magnitude(sample.position.length()),
            None => Self::METRES,
        }
    }

    /// Raw multiplier.
    #[inline]
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Unit this factor converts from.
    #[must_use]
    pub fn unit(self) -> DistanceUnit {
        if self == Self::CENTIMETRES {
            DistanceUnit::Centimetres
        } else {
            DistanceUnit::Metres
        }
    }

    /// Scales a file-space position.
    #[inline]
    #[must_use]
    pub fn apply(self, position: Vec3) -> Vec3 {
        position * self.0
    }
}

/// Shorthand for [`ScaleFactor::detect`].
#[must_use]
pub fn detect_scale(skeleton: &Skeleton, frames: &FrameSet) -> ScaleFactor {
    ScaleFactor::detect(skeleton, frames)
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::METRES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn root_file(x: f32, y: f32, z: f32) -> String {
        format!(
            "HIERARCHY\nROOT Hips\n{{\n  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n  \
             JOINT Spine\n  {{\n    CHANNELS 3 Zrotation Xrotation Yrotation\n  }}\n}}\n\
             MOTION\nFrames: 1\nFrame Time: 0.033\n{x} {y} {z} 0 0 0 0 0 0\n"
        )
    }

    #[test]
    fn test_threshold() {
        assert_eq!(ScaleFactor::from_root_magnitude(120.0), ScaleFactor::CENTIMETRES);
        assert_eq!(ScaleFactor::from_root_magnitude(10.0), ScaleFactor::METRES);
        assert_eq!(ScaleFactor::from_root_magnitude(0.8), ScaleFactor::METRES);
    }

    #[test]
    fn test_detect_centimetres() {
        let (skeleton, frames) = parse(&root_file(0.0, 120.0, 0.0)).unwrap();
        let scale = ScaleFactor::detect(&skeleton, &frames);
        assert_eq!(scale.value(), 0.01);
        assert_eq!(scale.unit(), DistanceUnit::Centimetres);
    }

    #[test]
    fn test_detect_metres() {
        let (skeleton, frames) = parse(&root_file(0.0, 0.8, 0.0)).unwrap();
        assert_eq!(ScaleFactor::detect(&skeleton, &frames).value(), 1.0);
    }

    #[test]
    fn test_magnitude_uses_all_axes() {
        let (skeleton, frames) = parse(&root_file(8.0, 0.0, 8.0)).unwrap();
        assert_eq!(ScaleFactor::detect(&skeleton, &frames), ScaleFactor::CENTIMETRES);
    }

    #[test]
    fn test_no_frames_is_metres() {
        let text = root_file(0.0, 120.0, 0.0);
        let text = text.lines().take_while(|l| !l.starts_with('0')).collect::<Vec<_>>().join("\n");
        let (skeleton, frames) = parse(&text).unwrap();
        assert!(frames.is_empty());
        assert_eq!(ScaleFactor::detect(&skeleton, &frames), ScaleFactor::METRES);
    }
}
