use std::sync::{Arc, LazyLock};

use crate::{
    config::DEFAULT_RESAMPLE_POINTS,
    error::MatchError,
    geometry::{normalize, resample},
    types::{GestureKind, Point},
};

// Control polylines on a 0..100 grid, screen orientation (y grows down).
const DIGIT_1: &[(f32, f32)] = &[(38.0, 18.0), (55.0, 0.0), (55.0, 100.0)];
const DIGIT_2: &[(f32, f32)] = &[
    (15.0, 25.0),
    (30.0, 5.0),
    (60.0, 0.0),
    (80.0, 15.0),
    (80.0, 35.0),
    (15.0, 100.0),
    (85.0, 100.0),
];
const DIGIT_3: &[(f32, f32)] = &[
    (15.0, 10.0),
    (50.0, 0.0),
    (80.0, 15.0),
    (75.0, 40.0),
    (45.0, 50.0),
    (80.0, 60.0),
    (85.0, 85.0),
    (50.0, 100.0),
    (15.0, 90.0),
];
const DIGIT_4: &[(f32, f32)] = &[(65.0, 0.0), (10.0, 65.0), (90.0, 65.0)];
const DIGIT_5: &[(f32, f32)] = &[
    (80.0, 0.0),
    (25.0, 0.0),
    (20.0, 45.0),
    (60.0, 40.0),
    (85.0, 65.0),
    (70.0, 95.0),
    (20.0, 95.0),
];
const DIGIT_6: &[(f32, f32)] = &[
    (75.0, 5.0),
    (40.0, 15.0),
    (20.0, 55.0),
    (25.0, 90.0),
    (55.0, 100.0),
    (80.0, 80.0),
    (70.0, 55.0),
    (40.0, 50.0),
    (22.0, 65.0),
];
const DIGIT_7: &[(f32, f32)] = &[(10.0, 0.0), (90.0, 0.0), (40.0, 100.0)];
const DIGIT_8: &[(f32, f32)] = &[
    (80.0, 10.0),
    (50.0, 0.0),
    (20.0, 15.0),
    (30.0, 40.0),
    (70.0, 60.0),
    (80.0, 85.0),
    (50.0, 100.0),
    (20.0, 85.0),
    (30.0, 60.0),
    (70.0, 40.0),
    (80.0, 10.0),
];
const DIGIT_9: &[(f32, f32)] = &[
    (80.0, 30.0),
    (55.0, 45.0),
    (25.0, 35.0),
    (25.0, 10.0),
    (55.0, 0.0),
    (80.0, 15.0),
    (80.0, 30.0),
    (75.0, 100.0),
];

const LETTER_L: &[(f32, f32)] = &[(20.0, 0.0), (20.0, 100.0), (80.0, 100.0)];
const LETTER_M: &[(f32, f32)] = &[
    (10.0, 100.0),
    (10.0, 0.0),
    (50.0, 60.0),
    (90.0, 0.0),
    (90.0, 100.0),
];
const LETTER_N: &[(f32, f32)] = &[(15.0, 100.0), (15.0, 0.0), (85.0, 100.0), (85.0, 0.0)];
const LETTER_S: &[(f32, f32)] = &[
    (85.0, 10.0),
    (50.0, 0.0),
    (15.0, 20.0),
    (50.0, 50.0),
    (85.0, 75.0),
    (50.0, 100.0),
    (15.0, 90.0),
];
const LETTER_V: &[(f32, f32)] = &[(10.0, 0.0), (50.0, 100.0), (90.0, 0.0)];
const LETTER_W: &[(f32, f32)] = &[
    (0.0, 0.0),
    (25.0, 100.0),
    (50.0, 30.0),
    (75.0, 100.0),
    (100.0, 0.0),
];
const LETTER_Z: &[(f32, f32)] = &[(10.0, 0.0), (90.0, 0.0), (10.0, 100.0), (90.0, 100.0)];

const CHECK: &[(f32, f32)] = &[(10.0, 55.0), (35.0, 85.0), (90.0, 10.0)];
const CROSS: &[(f32, f32)] = &[(10.0, 10.0), (90.0, 90.0), (90.0, 10.0), (10.0, 90.0)];
const ARROW_RIGHT: &[(f32, f32)] = &[(0.0, 50.0), (100.0, 50.0), (78.0, 28.0)];
const ARROW_LEFT: &[(f32, f32)] = &[(100.0, 50.0), (0.0, 50.0), (22.0, 28.0)];
const ARROW_UP: &[(f32, f32)] = &[(50.0, 100.0), (50.0, 0.0), (28.0, 22.0)];
const ARROW_DOWN: &[(f32, f32)] = &[(50.0, 0.0), (50.0, 100.0), (28.0, 78.0)];
const TRIANGLE: &[(f32, f32)] = &[(50.0, 0.0), (100.0, 90.0), (0.0, 90.0), (50.0, 0.0)];
const SQUARE: &[(f32, f32)] = &[
    (0.0, 0.0),
    (0.0, 100.0),
    (100.0, 100.0),
    (100.0, 0.0),
    (0.0, 0.0),
];

const ARC_STEPS: usize = 48;
const LOOP_STARTS_DEG: [f32; 4] = [-90.0, 0.0, 90.0, 180.0];

static BUILTIN: LazyLock<Arc<TemplateSet>> = LazyLock::new(|| {
    Arc::new(
        TemplateSet::from_strokes(builtin_strokes(), DEFAULT_RESAMPLE_POINTS).unwrap_or_else(
            |err| {
                log::error!("gesture: builtin_corpus_failed err={err}");
                TemplateSet::empty(DEFAULT_RESAMPLE_POINTS)
            },
        ),
    )
});

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    label: String,
    kind: GestureKind,
    points: Vec<Point>,
    registration: usize,
}

impl Template {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Resampled and normalized reference points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn registration(&self) -> usize {
        self.registration
    }
}

/// Read-only template corpus, kept in tie-break order: class priority first,
/// then registration order.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateSet {
    templates: Vec<Template>,
    resample_points: usize,
}

impl TemplateSet {
    pub fn empty(resample_points: usize) -> Self {
        Self {
            templates: Vec::new(),
            resample_points,
        }
    }

    /// Builds a corpus from raw strokes in registration order.
    pub fn from_strokes<I, L>(strokes: I, resample_points: usize) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = (L, Vec<Point>)>,
        L: Into<String>,
    {
        let mut templates = Vec::new();
        for (registration, (label, raw)) in strokes.into_iter().enumerate() {
            let label = label.into();
            let Some(points) = prepare_points(&raw, resample_points) else {
                return Err(MatchError::DegenerateTemplate { label });
            };
            templates.push(Template {
                kind: GestureKind::from_label(&label),
                label,
                points,
                registration,
            });
        }
        templates.sort_by_key(|t| (t.kind.priority(), t.registration));
        Ok(Self {
            templates,
            resample_points,
        })
    }

    /// The built-in digits, letters and shapes at the default resample count.
    pub fn builtin() -> Arc<TemplateSet> {
        Arc::clone(&BUILTIN)
    }

    pub fn resample_points(&self) -> usize {
        self.resample_points
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn get(&self, label: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.label == label)
    }
}

pub(crate) fn prepare_points(raw: &[Point], resample_points: usize) -> Option<Vec<Point>> {
    if raw.iter().any(|p| !p.is_finite()) {
        return None;
    }
    normalize(&resample(raw, resample_points))
}

/// Raw strokes of the built-in corpus in registration order.
///
/// Closed shapes are registered from several start points in both
/// directions, and every arrow also has a headless straight stroke, so a
/// label may appear more than once.
pub fn builtin_strokes() -> Vec<(&'static str, Vec<Point>)> {
    let mut strokes = loops("0", 30.0, 50.0);
    strokes.extend([
        ("1", polyline(DIGIT_1)),
        ("2", polyline(DIGIT_2)),
        ("3", polyline(DIGIT_3)),
        ("4", polyline(DIGIT_4)),
        ("5", polyline(DIGIT_5)),
        ("6", polyline(DIGIT_6)),
        ("7", polyline(DIGIT_7)),
        ("8", polyline(DIGIT_8)),
        ("9", polyline(DIGIT_9)),
        ("C", arc(50.0, 50.0, 40.0, 50.0, -45.0, -270.0)),
        ("L", polyline(LETTER_L)),
        ("M", polyline(LETTER_M)),
        ("N", polyline(LETTER_N)),
        ("S", polyline(LETTER_S)),
        ("V", polyline(LETTER_V)),
        ("W", polyline(LETTER_W)),
        ("Z", polyline(LETTER_Z)),
    ]);
    strokes.extend(loops("circle", 50.0, 50.0));
    strokes.extend([
        ("check", polyline(CHECK)),
        ("x", polyline(CROSS)),
        ("arrow_right", polyline(ARROW_RIGHT)),
        ("arrow_right", polyline(&ARROW_RIGHT[..2])),
        ("arrow_left", polyline(ARROW_LEFT)),
        ("arrow_left", polyline(&ARROW_LEFT[..2])),
        ("arrow_up", polyline(ARROW_UP)),
        ("arrow_up", polyline(&ARROW_UP[..2])),
        ("arrow_down", polyline(ARROW_DOWN)),
        ("arrow_down", polyline(&ARROW_DOWN[..2])),
    ]);
    strokes.extend(closed_variants("triangle", TRIANGLE));
    strokes.extend(closed_variants("square", SQUARE));
    strokes.push(("star", star(50.0, 50.0, 50.0)));
    strokes
}

// Ellipse traced from 12, 3, 6 and 9 o'clock, each way round.
fn loops(label: &'static str, rx: f32, ry: f32) -> Vec<(&'static str, Vec<Point>)> {
    LOOP_STARTS_DEG
        .iter()
        .flat_map(|&start| {
            [-360.0, 360.0].map(|sweep| (label, arc(50.0, 50.0, rx, ry, start, sweep)))
        })
        .collect()
}

// A closed polyline (last vertex repeats the first) started at each vertex,
// forwards and reversed.
fn closed_variants(label: &'static str, raw: &[(f32, f32)]) -> Vec<(&'static str, Vec<Point>)> {
    let corners = &raw[..raw.len().saturating_sub(1)];
    let mut out = Vec::with_capacity(corners.len() * 2);
    for start in 0..corners.len() {
        let mut forward: Vec<Point> = corners[start..]
            .iter()
            .chain(&corners[..start])
            .copied()
            .map(Point::from)
            .collect();
        forward.push(Point::from(corners[start]));
        let reversed = forward.iter().rev().copied().collect();
        out.push((label, forward));
        out.push((label, reversed));
    }
    out
}

fn polyline(raw: &[(f32, f32)]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

fn arc(cx: f32, cy: f32, rx: f32, ry: f32, start_deg: f32, sweep_deg: f32) -> Vec<Point> {
    (0..=ARC_STEPS)
        .map(|i| {
            let angle = (start_deg + sweep_deg * i as f32 / ARC_STEPS as f32).to_radians();
            Point::new(cx + rx * angle.cos(), cy + ry * angle.sin())
        })
        .collect()
}

// Five-point star in one stroke: every second vertex, back to the top.
fn star(cx: f32, cy: f32, r: f32) -> Vec<Point> {
    [0usize, 2, 4, 1, 3, 0]
        .iter()
        .map(|&k| {
            let angle = (-90.0f32 + 72.0 * k as f32).to_radians();
            Point::new(cx + r * angle.cos(), cy + r * angle.sin())
        })
        .collect()
}
