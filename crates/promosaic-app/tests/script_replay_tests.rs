//! Integration tests for headless gesture-script replay.

mod common;

use common::{session_with, two_tone_image};
use promosaic_app::{GestureScript, ReplaySummary};
use promosaic_core::{EffectKind, InteractionMode, Polarity};

#[test_log::test]
fn script_replay_tests_script_replays_settings_and_gestures_in_order() {
    let script = GestureScript::from_json_str(
        r#"{
            "view": { "width": 128, "height": 96 },
            "steps": [
                { "action": "set_effect", "effect": "blur" },
                { "action": "set_mode", "mode": "grid" },
                { "action": "pointer", "kind": "down", "x": 0.0, "y": 0.0 },
                { "action": "pointer", "kind": "move", "x": 40.0, "y": 40.0 },
                { "action": "pointer", "kind": "up", "x": 64.0, "y": 48.0 },
                { "action": "set_mode", "mode": "path" },
                { "action": "set_polarity", "polarity": "erase" },
                { "action": "stroke", "points": [[10.0, 10.0], [30.0, 12.0], [50.0, 30.0]] }
            ]
        }"#,
    )
    .expect("script should parse");

    let mut session = session_with(two_tone_image(), InteractionMode::Path);
    let summary = script.replay(&mut session).expect("replay should succeed");

    assert_eq!(
        summary,
        ReplaySummary {
            events: 6,
            ignored: 0,
            commits: 2
        }
    );
    assert_eq!(session.config().effect, EffectKind::Blur);
    assert_eq!(session.config().polarity, Polarity::Erase);
    assert_eq!(session.regions().len(), 2);
    assert!(session.has_edits());
}

#[test]
fn script_replay_tests_clear_step_drops_accumulated_regions() {
    let script = GestureScript::from_json_str(
        r#"{
            "view": { "width": 64, "height": 48 },
            "steps": [
                { "action": "stroke", "points": [[5.0, 5.0], [20.0, 20.0]] },
                { "action": "clear" }
            ]
        }"#,
    )
    .expect("script should parse");

    let mut session = session_with(two_tone_image(), InteractionMode::Path);
    script.replay(&mut session).expect("replay should succeed");
    assert!(session.regions().is_empty());
    assert!(!session.has_edits());
}
