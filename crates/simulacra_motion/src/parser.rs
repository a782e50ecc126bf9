//! # BVH Parser
//!
//! Two strictly ordered phases over the file's lines.
//!
//! ```text
//! HIERARCHY
//! ROOT Hips                      ┐
//! {                              │ hierarchy phase:
//!   OFFSET 0 0 0                 │ joints, blocks, channel lists
//!   CHANNELS 6 Xposition ...     │
//!   JOINT Spine { ... }          │
//!   End Site { OFFSET 0 1 0 }    │ (no channels, no BoneDef)
//! }                              ┘
//! MOTION                         ┐
//! Frames: 2                      │ motion phase:
//! Frame Time: 0.033333           │ header, then one row per frame
//! 0.0 90.0 0.0 ...               ┘
//! ```
//!
//! ## Tolerance
//!
//! Rows with a token that is not a float are skipped (stray comments,
//! trailing garbage). A fully numeric row with the wrong number of values
//! is an error: frames are never truncated or padded. `Frames:` is
//! informational; the frame count is whatever parsed.

use simulacra_shared::constants::DEFAULT_FRAME_TIME;

use crate::error::FormatError;
use crate::rotation::RotationOrder;
use crate::skeleton::{BoneDef, Channel, FrameSet, Skeleton};

/// An open `{ ... }` block.
#[derive(Clone, Copy, Debug)]
enum Block {
    /// A `ROOT`/`JOINT` block, by joint index.
    Joint(usize),
    /// An `End Site` block.
    EndSite,
}

/// Hierarchy-phase state.
struct HierarchyParser {
    bones: Vec<BoneDef>,
    stack: Vec<Block>,
    /// Declared but its `{` not yet seen.
    pending: Option<Block>,
    /// Joints that already received a `CHANNELS` line.
    has_channels: Vec<bool>,
}

impl HierarchyParser {
    fn new() -> Self {
        Self {
            bones: Vec::new(),
            stack: Vec::new(),
            pending: None,
            has_channels: Vec::new(),
        }
    }

    fn innermost_joint(&self) -> Option<usize> {
        match self.stack.last() {
            Some(Block::Joint(index)) => Some(*index),
            _ => None,
        }
    }

    fn open_pending(&mut self, line: usize) -> Result<(), FormatError> {
        let block = self
            .pending
            .take()
            .ok_or_else(|| FormatError::hierarchy(line, "'{' without a joint or End Site"))?;
        self.stack.push(block);
        Ok(())
    }

    fn declare_joint(&mut self, line: usize, keyword: &str, tokens: &[&str]) -> Result<(), FormatError> {
        if self.pending.is_some() {
            return Err(FormatError::hierarchy(line, "previous declaration never opened its block"));
        }
        let name = tokens
            .get(1)
            .filter(|name| **name != "{")
            .ok_or_else(|| FormatError::hierarchy(line, format!("{keyword} without a name")))?;

        let parent = match (keyword, self.stack.last()) {
            ("ROOT", None) => None,
            ("ROOT", Some(_)) => {
                return Err(FormatError::hierarchy(line, "ROOT nested inside another block"));
            }
            (_, Some(Block::Joint(parent))) => Some(*parent),
            (_, Some(Block::EndSite)) => {
                return Err(FormatError::hierarchy(line, "JOINT nested inside End Site"));
            }
            (_, None) => return Err(FormatError::hierarchy(line, "JOINT outside of any ROOT")),
        };

        if self.bones.iter().any(|b| b.name == *name) {
            return Err(FormatError::hierarchy(line, format!("duplicate joint {name:?}")));
        }

        self.bones.push(BoneDef {
            name: (*name).to_owned(),
            channels: Vec::new(),
            rotation_order: RotationOrder::default(),
            parent,
            channel_offset: 0,
        });
        self.has_channels.push(false);
        self.pending = Some(Block::Joint(self.bones.len() - 1));

        if tokens.last() == Some(&"{") {
            self.open_pending(line)?;
        }
        Ok(())
    }

    fn declare_end_site(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        if self.innermost_joint().is_none() || self.pending.is_some() {
            return Err(FormatError::hierarchy(line, "End Site outside of a joint"));
        }
        self.pending = Some(Block::EndSite);
        if tokens.last() == Some(&"{") {
            self.open_pending(line)?;
        }
        Ok(())
    }

    fn close(&mut self, line: usize) -> Result<(), FormatError> {
        if self.pending.is_some() {
            return Err(FormatError::hierarchy(line, "'}' before the declared block opened"));
        }
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| FormatError::hierarchy(line, "unbalanced '}'"))
    }

    fn channels(&mut self, line: usize, tokens: &[&str]) -> Result<(), FormatError> {
        let index = match self.stack.last() {
            Some(Block::Joint(index)) => *index,
            Some(Block::EndSite) => {
                tracing::debug!(line, "ignoring CHANNELS inside End Site");
                return Ok(());
            }
            None => return Err(FormatError::hierarchy(line, "CHANNELS outside of a joint")),
        };
        if self.pending.is_some() {
            return Err(FormatError::hierarchy(line, "CHANNELS before the joint's '{'"));
        }
        if self.has_channels[index] {
            return Err(FormatError::hierarchy(line, "joint declares CHANNELS twice"));
        }

        let declared: usize = tokens
            .get(1)
            .and_then(|count| count.parse().ok())
            .ok_or_else(|| FormatError::hierarchy(line, "CHANNELS without a count"))?;
        let names = &tokens[2..];
        if names.len() != declared {
            return Err(FormatError::hierarchy(
                line,
                format!("CHANNELS declares {declared} but lists {}", names.len()),
            ));
        }

        let channels = names
            .iter()
            .map(|name| {
                name.parse::<Channel>()
                    .map_err(|()| FormatError::hierarchy(line, format!("unknown channel {name:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rotation_axes: Vec<_> = channels
            .iter()
            .filter(|c| c.is_rotation())
            .map(|c| c.axis())
            .collect();

        let bone = &mut self.bones[index];
        bone.rotation_order = RotationOrder::from_declared(&rotation_axes);
        bone.channels = channels;
        self.has_channels[index] = true;
        Ok(())
    }

    fn finish(self, line: usize) -> Result<Skeleton, FormatError> {
        if self.pending.is_some() || !self.stack.is_empty() {
            return Err(FormatError::hierarchy(line, "MOTION reached with unclosed blocks"));
        }
        if self.bones.is_empty() {
            return Err(FormatError::NoRoot);
        }
        Ok(Skeleton::new(self.bones))
    }
}

/// Parses a BVH document into a skeleton and its frames.
///
/// Either both are returned complete or an error naming the section and
/// line is.
///
/// # Errors
///
/// Returns a [`FormatError`] on a malformed hierarchy, a missing `MOTION`
/// section, or a frame whose value count does not match the hierarchy.
pub fn parse(text: &str) -> Result<(Skeleton, FrameSet), FormatError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    // Phase 1: hierarchy
    let mut hierarchy = HierarchyParser::new();
    let mut motion_line = None;
    for (line, content) in lines.by_ref() {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let Some(&keyword) = tokens.first() else {
            continue;
        };
        match keyword {
            "HIERARCHY" | "OFFSET" => {}
            "ROOT" | "JOINT" => hierarchy.declare_joint(line, keyword, &tokens)?,
            "End" if tokens.get(1) == Some(&"Site") => hierarchy.declare_end_site(line, &tokens)?,
            "{" => hierarchy.open_pending(line)?,
            "}" => hierarchy.close(line)?,
            "CHANNELS" => hierarchy.channels(line, &tokens)?,
            "MOTION" => {
                motion_line = Some(line);
                break;
            }
            other => tracing::debug!(line, keyword = other, "skipping unknown hierarchy keyword"),
        }
    }

    let Some(motion_line) = motion_line else {
        if hierarchy.bones.is_empty() {
            return Err(FormatError::NoRoot);
        }
        return Err(FormatError::MissingMotion);
    };
    let skeleton = hierarchy.finish(motion_line)?;

    // Phase 2: motion
    let expected = skeleton.channel_count();
    let mut frame_time = DEFAULT_FRAME_TIME;
    let mut declared_frames = None;
    let mut row = Vec::with_capacity(expected);
    let mut values = Vec::new();
    let mut parsed = 0usize;

    for (line, content) in lines {
        if content.is_empty() {
            continue;
        }
        if let Some(rest) = content.strip_prefix("Frames:") {
            declared_frames = rest.trim().parse::<usize>().ok();
            continue;
        }
        if let Some(rest) = content.strip_prefix("Frame Time:") {
            match rest.trim().parse::<f32>() {
                Ok(t) if t.is_finite() && t > 0.0 => frame_time = t,
                _ => tracing::debug!(line, "unusable Frame Time, keeping default"),
            }
            continue;
        }

        row.clear();
        let numeric = content
            .split_whitespace()
            .map(str::parse::<f32>)
            .try_for_each(|v| v.map(|v| row.push(v)));
        if numeric.is_err() {
            tracing::trace!(line, "skipping non-numeric row");
            continue;
        }
        if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
            return Err(FormatError::motion(line, format!("frame {parsed} holds {bad}")));
        }
        if row.len() != expected {
            return Err(FormatError::FrameLength {
                frame: parsed,
                line,
                expected,
                found: row.len(),
            });
        }
        values.extend_from_slice(&row);
        parsed += 1;
    }

    let frames = FrameSet::from_values(frame_time, expected, values);
    if let Some(declared) = declared_frames {
        if declared != frames.len() {
            tracing::debug!(declared, parsed = frames.len(), "frame count header disagrees");
        }
    }

    Ok((skeleton, frames))
}
