//! # Capture File End-to-End Test
//!
//! Loads clips from disk and retargets them the way the streaming server
//! does, checking what ends up in each packet.

use std::io::Write;

use simulacra_motion::{BoneMap, FormatError, MotionClip, MotionError, Retargeter, ScaleFactor};
use simulacra_shared::{BoneId, Packet};

/// Mixamo-style export: namespaced joints, centimetres, a tail.
const NAMESPACED_CM: &str = "HIERARCHY
ROOT mixamorig:Hips
{
\tOFFSET 0.000000 0.000000 0.000000
\tCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
\tJOINT mixamorig:Spine
\t{
\t\tOFFSET 0.000000 10.000000 0.000000
\t\tCHANNELS 3 Zrotation Xrotation Yrotation
\t\tJOINT mixamorig:Head
\t\t{
\t\t\tOFFSET 0.000000 50.000000 0.000000
\t\t\tCHANNELS 3 Zrotation Xrotation Yrotation
\t\t\tEnd Site
\t\t\t{
\t\t\t\tOFFSET 0.000000 15.000000 0.000000
\t\t\t}
\t\t}
\t}
\tJOINT Tail_01
\t{
\t\tOFFSET 0.000000 0.000000 -10.000000
\t\tCHANNELS 3 Zrotation Xrotation Yrotation
\t}
}
MOTION
Frames: 4
Frame Time: 0.0333333
0.0 120.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0
1.0 120.0 0.0 0.0 0.0 10.0 0.0 5.0 0.0 0.0 0.0 15.0 30.0 0.0 0.0
2.0 120.0 0.0 0.0 0.0 20.0 0.0 10.0 0.0 0.0 0.0 30.0 60.0 0.0 0.0
3.0 120.0 0.0 0.0 0.0 30.0 0.0 15.0 0.0 0.0 0.0 45.0 90.0 0.0 0.0
";

fn write_clip(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".bvh").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_and_retarget_every_frame() {
    let file = write_clip(NAMESPACED_CM);
    let clip = MotionClip::load(file.path()).unwrap();

    assert_eq!(clip.skeleton().len(), 4);
    assert_eq!(clip.frame_count(), 4);
    assert_eq!(clip.scale(), ScaleFactor::CENTIMETRES);
    assert_eq!(clip.skeleton().parent_of("mixamorig:Head"), Some("mixamorig:Spine"));

    let retarget = Retargeter::new(&clip, &BoneMap::humanoid());
    let mut packet = Packet::default();

    for frame in 0..clip.frame_count() {
        assert!(retarget.fill(&clip, frame, &mut packet));

        let ids: Vec<BoneId> = packet.bones.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![BoneId::HIPS, BoneId::SPINE, BoneId::HEAD]);

        let root = packet.root_position.unwrap();
        assert!((root.x + frame as f32 * 0.01).abs() < 1e-6, "X is mirrored and scaled");
        assert!((root.y - 1.2).abs() < 1e-6);

        for bone in &packet.bones {
            assert!((bone.rotation.norm() - 1.0).abs() < 1e-5);
        }
    }
}

#[test]
fn test_tail_dropped_siblings_kept() {
    let clip = MotionClip::parse(NAMESPACED_CM).unwrap();
    let retarget = Retargeter::new(&clip, &BoneMap::humanoid());
    assert!(retarget.plan().iter().all(|e| e.joint != 3));

    let mut packet = Packet::default();
    retarget.fill(&clip, 3, &mut packet);
    assert_eq!(packet.bones.len(), 3);
    assert!(packet.rotation_of(BoneId::SPINE).is_some());
}

#[test]
fn test_configured_alias_picks_up_tail() {
    let clip = MotionClip::parse(NAMESPACED_CM).unwrap();
    let map = BoneMap::humanoid().with_alias("Tail_01", BoneId::UPPER_CHEST);
    let retarget = Retargeter::new(&clip, &map);
    assert_eq!(retarget.len(), 4);
}

#[test]
fn test_metre_clip_keeps_units() {
    let text = NAMESPACED_CM.replace(" 120.0 ", " 0.95 ");
    let clip = MotionClip::parse(&text).unwrap();
    assert_eq!(clip.scale(), ScaleFactor::METRES);

    let retarget = Retargeter::new(&clip, &BoneMap::humanoid());
    let mut packet = Packet::default();
    retarget.fill(&clip, 2, &mut packet);
    let root = packet.root_position.unwrap();
    assert!((root.x + 2.0).abs() < 1e-6);
    assert!((root.y - 0.95).abs() < 1e-6);
}

#[test]
fn test_short_row_rejects_whole_file() {
    let text = NAMESPACED_CM.replace(
        "2.0 120.0 0.0 0.0 0.0 20.0 0.0 10.0 0.0 0.0 0.0 30.0 60.0 0.0 0.0",
        "2.0 120.0 0.0 0.0 0.0 20.0 0.0 10.0 0.0 0.0 0.0 30.0 60.0 0.0",
    );
    let file = write_clip(&text);
    match MotionClip::load(file.path()) {
        Err(MotionError::Format(FormatError::FrameLength { frame, expected, found, .. })) => {
            assert_eq!(frame, 2);
            assert_eq!(expected, 15);
            assert_eq!(found, 14);
        }
        other => panic!("expected frame-length error, got {other:?}"),
    }
}

#[test]
fn test_comment_rows_are_skipped() {
    let text = NAMESPACED_CM.replace("Frame Time: 0.0333333\n", "Frame Time: 0.0333333\n# exported\n\n");
    let clip = MotionClip::parse(&text).unwrap();
    assert_eq!(clip.frame_count(), 4);
}
