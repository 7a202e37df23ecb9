use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

pub fn squared_distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub fn distance(a: Point, b: Point) -> f32 {
    squared_distance(a, b).sqrt()
}

pub fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|pair| distance(pair[0], pair[1])).sum()
}

/// Net movement from the first to the last point.
pub fn displacement(points: &[Point]) -> Option<(f32, f32)> {
    let first = points.first()?;
    let last = points.last()?;
    Some((last.x - first.x, last.y - first.y))
}

pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f32;
    Some(Point::new(sum_x / n, sum_y / n))
}

pub fn bounds(points: &[Point]) -> Option<Bounds> {
    let first = points.first()?;
    let init = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    Some(points.iter().skip(1).fold(init, |b, p| Bounds {
        min_x: b.min_x.min(p.x),
        min_y: b.min_y.min(p.y),
        max_x: b.max_x.max(p.x),
        max_y: b.max_y.max(p.y),
    }))
}

/// Resamples `points` into exactly `count` points spaced evenly along the
/// cumulative arc length. A path without length collapses onto its first
/// point.
pub fn resample(points: &[Point], count: usize) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![first];
    }

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0f32;
    cumulative.push(0.0f32);
    for pair in points.windows(2) {
        total += distance(pair[0], pair[1]);
        cumulative.push(total);
    }
    if total <= f32::EPSILON {
        return vec![first; count];
    }

    let last_index = count - 1;
    let mut out = Vec::with_capacity(count);
    let mut segment = 1usize;
    for i in 0..count {
        if i == last_index {
            out.push(points[points.len() - 1]);
            break;
        }
        let target = total * i as f32 / last_index as f32;
        while segment < cumulative.len() - 1 && cumulative[segment] < target {
            segment += 1;
        }
        let start = cumulative[segment - 1];
        let span = (cumulative[segment] - start).max(f32::EPSILON);
        let t = ((target - start) / span).clamp(0.0, 1.0);
        let a = points[segment - 1];
        let b = points[segment];
        out.push(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)));
    }
    out
}

/// Moves the centroid to the origin and scales uniformly so the bounding box
/// fits a unit square. Orientation is left alone. Returns `None` for an empty
/// path or one without spatial extent.
pub fn normalize(points: &[Point]) -> Option<Vec<Point>> {
    let center = centroid(points)?;
    let b = bounds(points)?;
    let extent = b.width().max(b.height());
    if !(extent.is_finite() && extent > f32::EPSILON) {
        return None;
    }
    let scale = 1.0 / extent;
    Some(
        points
            .iter()
            .map(|p| Point::new((p.x - center.x) * scale, (p.y - center.y) * scale))
            .collect(),
    )
}
