use super::*;

fn engine() -> RecognitionEngine {
    RecognitionEngine::new(&GestureConfig::default())
}

fn ring(cx: f32, cy: f32, r: f32, steps: usize) -> Vec<Point> {
    ring_from(cx, cy, r, steps, -90.0, -360.0)
}

// Positive sweep runs clockwise on screen.
fn ring_from(
    cx: f32,
    cy: f32,
    r: f32,
    steps: usize,
    start_deg: f32,
    sweep_deg: f32,
) -> Vec<Point> {
    (0..=steps)
        .map(|i| {
            let angle = (start_deg + sweep_deg * i as f32 / steps as f32).to_radians();
            Point::new(cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}

fn swipe(from: Point, to: Point, steps: usize) -> Vec<Point> {
    (0..steps)
        .map(|i| {
            let t = i as f32 / (steps - 1) as f32;
            Point::new(from.x + t * (to.x - from.x), from.y + t * (to.y - from.y))
        })
        .collect()
}

// Scales, shifts and densifies a raw stroke without changing its shape.
fn redraw(raw: &[Point], scale: f32, dx: f32, dy: f32) -> Vec<Point> {
    let mut out = Vec::new();
    for pair in raw.windows(2) {
        for step in 0..8 {
            let t = step as f32 / 8.0;
            let x = pair[0].x + t * (pair[1].x - pair[0].x);
            let y = pair[0].y + t * (pair[1].y - pair[0].y);
            out.push(Point::new(x * scale + dx, y * scale + dy));
        }
    }
    if let Some(last) = raw.last() {
        out.push(Point::new(last.x * scale + dx, last.y * scale + dy));
    }
    out
}

#[test]
fn short_path_is_unknown_without_consulting_corpus() {
    let path = vec![Point::new(0.0, 0.0), Point::new(300.0, 0.0)];
    assert_eq!(engine().recognize(&path), GestureResult::unknown());

    // With an empty corpus the length check still answers first.
    let empty = RecognitionEngine::with_templates(
        &GestureConfig::default(),
        TemplateSet::empty(DEFAULT_RESAMPLE_POINTS),
    );
    assert_eq!(
        empty.best_match(&path),
        Err(MatchError::TooFewPoints { len: 2, min: 8 })
    );
    assert_eq!(empty.recognize(&path), GestureResult::unknown());
}

#[test]
fn builtin_corpus_covers_digits_letters_and_shapes() {
    let engine = engine();
    let templates = engine.templates();
    for label in ["0", "5", "9", "L", "Z", "circle", "check", "x", "star", "arrow_down"] {
        assert!(templates.get(label).is_some(), "missing template {label}");
    }
    assert_eq!(templates.get("x").map(Template::kind), Some(GestureKind::Symbol));
    assert!(templates
        .iter()
        .all(|t| t.points().len() == templates.resample_points()));
}

#[test]
fn corpus_iterates_in_tie_break_order() {
    let engine = engine();
    let priorities: Vec<u8> = engine.templates().iter().map(|t| t.kind().priority()).collect();
    let mut sorted = priorities.clone();
    sorted.sort_unstable();
    assert_eq!(priorities, sorted);
}

#[test]
fn templates_recognize_themselves() {
    let engine = engine();
    for template in engine.templates().iter() {
        let result = engine.recognize(template.points());
        assert_eq!(result.value(), template.label());
        assert!(
            result.confidence() >= 0.95,
            "{} matched itself at {}",
            template.label(),
            result.confidence()
        );
    }
}

#[test]
fn redrawn_strokes_match_their_template_at_any_scale() {
    let engine = engine();
    for (label, raw) in builtin_strokes() {
        let path = redraw(&raw, 2.7, 140.0, 60.0);
        let result = engine.recognize(&path);
        assert_eq!(result.value(), label, "redrawn {label}");
        assert!(result.confidence() >= 0.95, "{label} at {}", result.confidence());
    }
}

#[test]
fn direction_is_not_normalized_away() {
    let engine = engine();
    let strokes = builtin_strokes();
    let right = strokes
        .iter()
        .find(|(label, _)| *label == "arrow_right")
        .map(|(_, raw)| redraw(raw, 3.0, 10.0, 10.0))
        .expect("arrow_right template");
    let left: Vec<Point> = right.iter().map(|p| Point::new(400.0 - p.x, p.y)).collect();

    assert_eq!(engine.recognize(&right).value(), "arrow_right");
    assert_eq!(engine.recognize(&left).value(), "arrow_left");
}

#[test]
fn clean_circle_beats_zero() {
    let engine = engine();
    let result = engine.recognize(&ring(200.0, 200.0, 80.0, 40));
    assert_eq!(result.value(), "circle");
    assert_eq!(result.kind(), GestureKind::Symbol);
    assert!(result.confidence() >= 0.3);
}

#[test]
fn circles_match_from_any_start_in_either_direction() {
    let engine = engine();
    for start in [-90.0, 0.0, 90.0, 180.0, -45.0, 30.0] {
        for sweep in [-360.0, 360.0] {
            let result = engine.recognize(&ring_from(200.0, 200.0, 80.0, 40, start, sweep));
            assert_eq!(result.value(), "circle", "start {start} sweep {sweep}");
            assert!(
                result.confidence() >= 0.8,
                "start {start} sweep {sweep} at {}",
                result.confidence()
            );
        }
    }
}

#[test]
fn closed_polygons_match_from_any_corner() {
    let engine = engine();
    let square: [(f32, f32); 5] = [
        (300.0, 100.0),
        (300.0, 300.0),
        (100.0, 300.0),
        (100.0, 100.0),
        (300.0, 100.0),
    ];
    let result = engine.recognize(&redraw(&square.map(Point::from), 1.0, 0.0, 0.0));
    assert_eq!(result.value(), "square");

    let reversed: Vec<Point> = square.iter().rev().copied().map(Point::from).collect();
    assert_eq!(engine.recognize(&redraw(&reversed, 1.0, 0.0, 0.0)).value(), "square");

    let triangle: [(f32, f32); 4] = [(0.0, 90.0), (100.0, 90.0), (50.0, 0.0), (0.0, 90.0)];
    let result = engine.recognize(&redraw(&triangle.map(Point::from), 2.0, 40.0, 40.0));
    assert_eq!(result.value(), "triangle");
    assert!(result.confidence() >= 0.95);

    // A tall ellipse started at the bottom and drawn clockwise is still a zero.
    let zero: Vec<Point> = (0..=40)
        .map(|i| {
            let angle = (90.0f32 + 9.0 * i as f32).to_radians();
            Point::new(200.0 + 50.0 * angle.cos(), 200.0 + 90.0 * angle.sin())
        })
        .collect();
    let result = engine.recognize(&zero);
    assert_eq!(result.value(), "0");
    assert_eq!(result.kind(), GestureKind::Number);
}

#[test]
fn straight_swipes_read_as_arrows() {
    let engine = engine();
    let cases = [
        ("arrow_down", Point::new(100.0, 0.0), Point::new(100.0, 300.0)),
        ("arrow_up", Point::new(100.0, 300.0), Point::new(100.0, 0.0)),
        ("arrow_right", Point::new(0.0, 100.0), Point::new(300.0, 100.0)),
        ("arrow_left", Point::new(300.0, 100.0), Point::new(0.0, 100.0)),
    ];
    for (label, from, to) in cases {
        let result = engine.recognize(&swipe(from, to, 20));
        assert_eq!(result.value(), label);
        assert_eq!(result.kind(), GestureKind::Symbol);
    }

    // The serif still separates a one from a plain downward stroke.
    let serif: [(f32, f32); 3] = [(38.0, 18.0), (55.0, 0.0), (55.0, 100.0)];
    let one = engine.recognize(&redraw(&serif.map(Point::from), 3.0, 0.0, 0.0));
    assert_eq!(one.value(), "1");
}

#[test]
fn drawing_speed_does_not_change_the_match() {
    let engine = engine();
    let slow = engine.best_match(&ring(120.0, 90.0, 60.0, 240)).expect("match");
    let fast = engine.best_match(&ring(120.0, 90.0, 60.0, 12)).expect("match");
    assert_eq!(slow.label, fast.label);
    assert!((slow.distance - fast.distance).abs() < 0.05);
}

#[test]
fn recognize_is_deterministic() {
    let path: Vec<Point> = (0..20)
        .map(|i| Point::new(i as f32 * 7.0, ((i * 37) % 11) as f32 * 9.0))
        .collect();
    let first = engine().recognize(&path);
    let second = engine().recognize(&path);
    assert_eq!(first, second);
}

#[test]
fn confidence_never_rises_with_distance() {
    let engine = engine();
    let mut previous = engine.confidence(0.0);
    assert_eq!(previous, 1.0);
    for step in 1..=40 {
        let current = engine.confidence(step as f32 * 0.025);
        assert!(current <= previous);
        assert!((0.0..=1.0).contains(&current));
        previous = current;
    }
    assert_eq!(engine.confidence(10.0), 0.0);
}

#[test]
fn equal_distances_prefer_numbers_then_registration_order() {
    let config = GestureConfig::default();
    let shape = ring(50.0, 50.0, 40.0, 24);

    let set = TemplateSet::from_strokes(
        [
            ("circle", shape.clone()),
            ("B", shape.clone()),
            ("0", shape.clone()),
            ("A", shape.clone()),
        ],
        DEFAULT_RESAMPLE_POINTS,
    )
    .expect("valid corpus");
    let engine = RecognitionEngine::with_templates(&config, set);
    assert_eq!(engine.recognize(&shape).value(), "0");

    let set = TemplateSet::from_strokes(
        [("circle", shape.clone()), ("B", shape.clone()), ("A", shape.clone())],
        DEFAULT_RESAMPLE_POINTS,
    )
    .expect("valid corpus");
    let engine = RecognitionEngine::with_templates(&config, set);
    assert_eq!(engine.recognize(&shape).value(), "B");
}

#[test]
fn rank_lists_nearest_first() {
    let engine = engine();
    let path = ring(10.0, 10.0, 100.0, 30);
    let ranked = engine.rank(&path, 5).expect("ranking");
    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0].label, "circle");
    assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert_eq!(engine.rank(&path, 100).expect("ranking").len(), MAX_RANKED);
}

#[test]
fn rank_keeps_corpus_order_among_equal_distances() {
    let config = GestureConfig::default();
    let shape = ring(50.0, 50.0, 40.0, 24);
    let line = vec![Point::new(0.0, 0.0), Point::new(90.0, 10.0), Point::new(100.0, 40.0)];
    let set = TemplateSet::from_strokes(
        [
            ("hook", line),
            ("B", shape.clone()),
            ("circle", shape.clone()),
            ("A", shape.clone()),
            ("7", shape.clone()),
        ],
        DEFAULT_RESAMPLE_POINTS,
    )
    .expect("valid corpus");
    let engine = RecognitionEngine::with_templates(&config, set);

    let labels = |limit: usize| {
        engine
            .rank(&shape, limit)
            .expect("ranking")
            .iter()
            .map(|c| c.label.to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(5), ["7", "B", "A", "circle", "hook"]);
    assert_eq!(labels(2), ["7", "B"]);
    assert!(labels(0).is_empty());
}

#[test]
fn matcher_failures_degrade_to_unknown() {
    let engine = engine();

    let still = vec![Point::new(5.0, 5.0); 12];
    assert_eq!(engine.best_match(&still), Err(MatchError::Degenerate));
    assert_eq!(engine.recognize(&still), GestureResult::unknown());

    let mut broken = ring(0.0, 0.0, 50.0, 20);
    broken[4].x = f32::NAN;
    assert_eq!(engine.best_match(&broken), Err(MatchError::NonFinite));
    assert_eq!(engine.recognize(&broken), GestureResult::unknown());

    let empty = RecognitionEngine::with_templates(
        &GestureConfig::default(),
        TemplateSet::empty(DEFAULT_RESAMPLE_POINTS),
    );
    let path = ring(0.0, 0.0, 50.0, 20);
    assert_eq!(empty.best_match(&path), Err(MatchError::EmptyCorpus));
    assert_eq!(empty.recognize(&path), GestureResult::unknown());
}

#[test]
fn degenerate_templates_are_rejected() {
    let result = TemplateSet::from_strokes(
        [("dot", vec![Point::new(1.0, 1.0); 4])],
        DEFAULT_RESAMPLE_POINTS,
    );
    assert_eq!(
        result,
        Err(MatchError::DegenerateTemplate {
            label: "dot".to_string()
        })
    );
}

#[test]
fn custom_resample_count_rebuilds_builtin_corpus() {
    let mut config = GestureConfig::default();
    config.recognition.resample_points = 32;
    let engine = RecognitionEngine::new(&config);
    assert_eq!(engine.templates().resample_points(), 32);
    assert_eq!(engine.templates().len(), builtin_strokes().len());
    assert_eq!(engine.recognize(&ring(0.0, 0.0, 30.0, 36)).value(), "circle");
}
