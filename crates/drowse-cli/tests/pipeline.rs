//! Pipeline integration tests using synthetic landmark recordings.
//!
//! Replays generated recordings through the binary and checks the detected
//! blinks, yawns and alarms.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::missing_panics_doc,
    deprecated
)]

use std::path::PathBuf;

use assert_cmd::Command;
use drowse_test_support::{SyntheticFaceBuilder, SyntheticRecording};
use predicates::prelude::*;
use serde_json::Value;

fn drowse() -> Command {
    let mut cmd = Command::cargo_bin("drowse").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/nonexistent/drowse-test-config");
    cmd
}

/// Write a recording into a fresh temporary directory.
fn write_recording(recording: &SyntheticRecording) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("drive.jsonl");
    std::fs::write(&path, recording.to_jsonl(true)).unwrap();
    (temp_dir, path)
}

/// Split JSONL output into frame records and summary records.
fn parse_output(stdout: &[u8]) -> (Vec<Value>, Vec<Value>) {
    let text = String::from_utf8_lossy(stdout);
    let records: Vec<Value> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    records
        .into_iter()
        .partition(|r| r["kind"].as_str() == Some("frame"))
}

// === Asleep Alarm ===

#[test]
fn test_sixty_closed_frames_raise_alarm() {
    let recording =
        SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::new().ear(0.15), 60);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1), "alarm should exit 1");

    let (frames, summaries) = parse_output(&output.stdout);
    assert_eq!(frames.len(), 60);
    assert_eq!(frames[48]["eyes"]["alarm"], false);
    assert_eq!(frames[49]["eyes"]["alarm"], true);
    assert_eq!(frames[49]["status"], "asleep");

    let asleep_for = frames[59]["eyes"]["asleep_for"].as_f64().unwrap();
    assert!((asleep_for - 1.0 / 3.0).abs() < 1e-6, "got {asleep_for}");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["alarms"], 1);
}

#[test]
fn test_alarm_clears_when_eyes_reopen() {
    let recording = SyntheticRecording::new(30.0)
        .hold(&SyntheticFaceBuilder::eyes_closed(), 70)
        .hold(&SyntheticFaceBuilder::awake(), 5);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let (frames, summaries) = parse_output(&output.stdout);
    assert_eq!(frames[69]["eyes"]["alarm"], true);
    assert_eq!(frames[70]["eyes"]["alarm"], false);
    assert_eq!(frames[70]["status"], "awake");
    // the long closure still ends as one blink
    assert_eq!(summaries[0]["blinks"], 1);
}

#[test]
fn test_asleep_frames_flag_lowers_threshold() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::eyes_closed(), 20);
    let (_dir, path) = write_recording(&recording);

    drowse().arg(&path).assert().code(0);
    drowse()
        .arg("--asleep-frames")
        .arg("15")
        .arg(&path)
        .assert()
        .code(1);
}

// === Blinks ===

#[test]
fn test_short_closures_and_blinks() {
    let awake = SyntheticFaceBuilder::awake();
    let closed = SyntheticFaceBuilder::eyes_closed();
    let recording = SyntheticRecording::new(30.0)
        .hold(&awake, 10)
        .hold(&closed, 3)
        .hold(&awake, 10)
        .hold(&closed, 2)
        .hold(&awake, 10)
        .hold(&closed, 5)
        .hold(&awake, 10);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let (frames, summaries) = parse_output(&output.stdout);
    let detected: Vec<u64> = frames
        .iter()
        .filter(|f| f["eyes"]["blink_detected"] == true)
        .map(|f| f["index"].as_u64().unwrap())
        .collect();
    assert_eq!(detected, vec![13, 40]);
    assert_eq!(summaries[0]["blinks"], 2);
    assert!(summaries[0]["blinks_per_minute"].as_f64().unwrap() > 0.0);
}

// === Yawns ===

#[test]
fn test_two_second_yawn_counted_once() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::yawning(), 60);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0), "yawns do not raise the alarm");

    let (frames, summaries) = parse_output(&output.stdout);
    assert_eq!(frames[44]["mouth"]["confirmed"], false);
    assert_eq!(frames[44]["status"], "awake");
    assert_eq!(frames[45]["mouth"]["confirmed"], true);
    assert_eq!(frames[45]["status"], "yawning");

    let counted: Vec<_> = frames
        .iter()
        .filter(|f| f["mouth"]["yawn_detected"] == true)
        .collect();
    assert_eq!(counted.len(), 1);
    assert_eq!(summaries[0]["yawns"], 1);
}

#[test]
fn test_yawn_counted_at_low_frame_rate() {
    let recording = SyntheticRecording::new(10.0).hold(&SyntheticFaceBuilder::yawning(), 20);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg("--summary-only").arg(&path).output().unwrap();
    let (_, summaries) = parse_output(&output.stdout);
    assert_eq!(summaries[0]["yawns"], 1);
}

#[test]
fn test_small_gap_is_not_a_yawn() {
    // wide ratio but lips barely apart, as on a distant face
    let face = SyntheticFaceBuilder::new().mar(0.8).lip_gap(20.0);
    let recording = SyntheticRecording::new(30.0).hold(&face, 90);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg("--summary-only").arg(&path).output().unwrap();
    let (_, summaries) = parse_output(&output.stdout);
    assert_eq!(summaries[0]["yawns"], 0);
}

#[test]
fn test_min_yawn_flag() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::yawning(), 40);
    let (_dir, path) = write_recording(&recording);

    let output = drowse().arg("--summary-only").arg(&path).output().unwrap();
    let (_, summaries) = parse_output(&output.stdout);
    assert_eq!(summaries[0]["yawns"], 0);

    let output = drowse()
        .args(["--summary-only", "--min-yawn", "1.0"])
        .arg(&path)
        .output()
        .unwrap();
    let (_, summaries) = parse_output(&output.stdout);
    assert_eq!(summaries[0]["yawns"], 1);
}

// === Input Handling ===

#[test]
fn test_stdin_without_timestamps_uses_fps() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::eyes_closed(), 60);

    let output = drowse()
        .args(["--fps", "30", "-"])
        .write_stdin(recording.to_jsonl(false))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let (frames, summaries) = parse_output(&output.stdout);
    assert_eq!(frames.len(), 60);
    assert!((frames[30]["timestamp"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(summaries[0]["source"], "<stdin>");
}

#[test]
fn test_stdin_without_timestamps_or_fps_skips_every_frame() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::awake(), 3);

    let output = drowse()
        .arg("-")
        .write_stdin(recording.to_jsonl(false))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let (frames, summaries) = parse_output(&output.stdout);
    assert!(frames.is_empty());
    assert_eq!(summaries[0]["skipped"], 3);
}

#[test]
fn test_bad_lines_are_skipped() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("drive.jsonl");
    let good = SyntheticFaceBuilder::awake();
    let partial = SyntheticFaceBuilder::awake().without(13);
    let contents = [
        "# header comment".to_string(),
        good.to_json_line(Some(0.0)),
        "{not json".to_string(),
        String::new(),
        partial.to_json_line(Some(0.1)),
        good.to_json_line(Some(0.2)),
    ]
    .join("\n");
    std::fs::write(&path, contents).unwrap();

    let output = drowse().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Skipping frame 1"), "stderr: {stderr}");
    assert!(stderr.contains("missing 1 landmark(s)"), "stderr: {stderr}");

    let (frames, summaries) = parse_output(&output.stdout);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1]["index"], 3);
    assert_eq!(summaries[0]["frames"], 2);
    assert_eq!(summaries[0]["skipped"], 2);
}

#[test]
fn test_each_recording_gets_its_own_session() {
    let temp_dir = tempfile::tempdir().unwrap();
    let drowsy = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::eyes_closed(), 40);
    // neither half alone reaches the asleep threshold
    std::fs::write(temp_dir.path().join("a.jsonl"), drowsy.to_jsonl(true)).unwrap();
    std::fs::write(temp_dir.path().join("b.jsonl"), drowsy.to_jsonl(true)).unwrap();

    let output = drowse().arg(temp_dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(0));

    let (_, summaries) = parse_output(&output.stdout);
    assert_eq!(summaries.len(), 2);
    assert!(summaries[0]["source"].as_str().unwrap().ends_with("a.jsonl"));
    assert!(summaries.iter().all(|s| s["alarms"] == 0));
}

#[test]
fn test_alarm_message_on_stderr() {
    let recording = SyntheticRecording::new(30.0).hold(&SyntheticFaceBuilder::eyes_closed(), 60);
    let (_dir, path) = write_recording(&recording);

    drowse()
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ALARM"));

    drowse()
        .arg("--quiet")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ALARM").not());
}
