use std::collections::HashSet;
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use knob_touch_rust::config::Config;
use knob_touch_rust::feature::{TouchObservation, TrackedTouch};
use knob_touch_rust::gesture::GestureRenderer;
use knob_touch_rust::my_types::*;
use knob_touch_rust::store::Store;
use knob_touch_rust::tracker::TouchTracker;

/// Random recording: each slot is absent or a touch drifting a little per frame
fn random_frames(seed: u64, count: usize) -> Vec<Vec<TouchObservation>> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut positions: Vec<Option<f64>> = vec![None; TOUCH_SLOTS];
    (0..count)
        .map(|_| {
            positions
                .iter_mut()
                .map(|slot| {
                    *slot = match *slot {
                        Some(_) if rng.gen_bool(0.1) => None,
                        Some(p) => Some(p + rng.gen_range(-0.1..0.1)),
                        None if rng.gen_bool(0.2) => Some(rng.gen_range(0.0..2. * PI)),
                        None => None,
                    };
                    match *slot {
                        Some(p) => TouchObservation::new(p, rng.gen_range(0.0..4000.), 3.),
                        None if rng.gen_bool(0.5) => TouchObservation {
                            position: Some(f64::NAN),
                            pressure: None,
                            width: None,
                        },
                        None => TouchObservation::absent(),
                    }
                })
                .collect()
        })
        .collect()
}

fn run(tracker: &mut TouchTracker, frames: &[Vec<TouchObservation>]) -> Vec<Vec<TrackedTouch>> {
    frames.iter().map(|f| tracker.assign(f)).collect()
}

#[test]
fn test_assignment_is_deterministic() {
    let frames = random_frames(7, 300);
    let a = run(&mut TouchTracker::default(), &frames);
    let b = run(&mut TouchTracker::default(), &frames);
    assert_eq!(format!("{:?}", a), format!("{:?}", b));
}

#[test]
fn test_ids_are_allocated_in_increasing_order() {
    for seed in 0..20 {
        let frames = random_frames(seed, 200);
        let mut tracker = TouchTracker::default();
        let mut seen = HashSet::new();
        let mut next_new = 0;
        for frame in &frames {
            let out = tracker.assign(frame);

            let mut frame_ids = HashSet::new();
            let mut new_ids: Vec<TouchId> = vec![];
            for touch in &out {
                assert!(frame_ids.insert(touch.id), "id used twice in one frame");
                if seen.insert(touch.id) {
                    new_ids.push(touch.id);
                }
            }
            new_ids.sort();
            for id in new_ids {
                assert_eq!(id, next_new, "seed {}", seed);
                next_new += 1;
            }
            assert_eq!(tracker.next_id(), next_new);
        }
    }
}

#[test]
fn test_output_matches_valid_input() {
    let frames = random_frames(42, 200);
    let mut tracker = TouchTracker::default();
    for frame in &frames {
        let out = tracker.assign(frame);
        let valid: Vec<f64> = frame.iter().filter_map(|o| o.valid_position()).collect();
        let positions: Vec<f64> = out.iter().map(|t| t.position).collect();
        assert_eq!(positions, valid);
        assert!(out.iter().all(|t| !t.position.is_nan()));

        let active: Vec<(TouchId, f64)> = tracker.active().iter().map(|(&id, &p)| (id, p)).collect();
        let mut expected: Vec<(TouchId, f64)> = out.iter().map(|t| (t.id, t.position)).collect();
        expected.sort_by_key(|e| e.0);
        assert_eq!(active, expected);
    }
}

#[test]
fn test_matched_touches_stay_within_threshold() {
    let frames = random_frames(3, 300);
    let mut tracker = TouchTracker::new(0.3);
    for frame in &frames {
        let previous = tracker.active().clone();
        for touch in tracker.assign(frame) {
            if let Some(old) = previous.get(&touch.id) {
                assert!((old - touch.position).abs() < 0.3);
            }
        }
    }
}

#[test]
fn test_clear_continues_ids() {
    let frames = random_frames(11, 50);
    let mut tracker = TouchTracker::default();
    run(&mut tracker, &frames);
    let used = tracker.next_id();

    tracker.clear();
    let again = run(&mut tracker, &frames);
    let min_id = again.iter().flatten().map(|t| t.id).min();
    if let Some(min_id) = min_id {
        assert!(min_id >= used);
    }

    let fresh = run(&mut TouchTracker::default(), &frames);
    let shifted: Vec<Vec<TouchId>> = again
        .iter()
        .map(|f| f.iter().map(|t| t.id - used).collect())
        .collect();
    let fresh: Vec<Vec<TouchId>> = fresh.iter().map(|f| f.iter().map(|t| t.id).collect()).collect();
    assert_eq!(shifted, fresh);
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("knob-touch-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_render_merged_recordings() {
    let root = scratch_dir("render");
    let first = root.join("first");
    let second = root.join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    fs::write(
        first.join("data.jsonl"),
        r#"{"task": {"id": "t1", "participant_id": "p1", "title": "Rotate Knob"}}
{"sample": {"id": "s1", "session_task_id": "t1", "timestamp": 1, "motor_angle": 0.1, "touches": [{"position": 1.0, "pressure": 1500, "channel": 4}]}}
{"sample": {"id": "s2", "session_task_id": "t1", "timestamp": 2, "motor_angle": 0.1, "touches": [{"position": 1.05, "pressure": 1500, "channel": 4}]}}
{"marker": {"id": "m1", "session_task_id": "t1", "timestamp": 1, "marker": "start"}}
"#,
    )
    .unwrap();
    // repeats s2, adds a task with no samples
    fs::write(
        second.join("data.jsonl"),
        r#"{"sample": {"id": "s2", "session_task_id": "t1", "timestamp": 2, "motor_angle": 0.1, "touches": []}}
{"sample": {"id": "s3", "session_task_id": "t1", "timestamp": 3, "button_pressed": true, "touches": [{"position": "nan"}]}}
{"task": {"id": "t2", "participant_id": "p2", "gesture": "tap"}}
"#,
    )
    .unwrap();

    let store = Store::open(&[first, second][..]).unwrap();
    assert_eq!(store.samples("t1").len(), 3);

    let config = Config::default();
    let out_dir = root.join("out");
    let renderer = GestureRenderer::new(&config, &out_dir);

    let task = store.session_tasks("p1")[0];
    let path = renderer.process_task(&store, task).unwrap().unwrap();
    assert_eq!(path, out_dir.join("p1").join("gesture_rotate_knob_normal.png"));

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (360, 3));
    // start marker on the first row
    assert_eq!(image.get_pixel(0, 0).0, [0, 255, 0]);
    // button row is tinted
    assert_eq!(image.get_pixel(100, 2).0, [100, 0, 100]);

    let empty = store.session_tasks("p2")[0];
    assert!(renderer.process_task(&store, empty).unwrap().is_none());

    let _ = fs::remove_dir_all(&root);
}
