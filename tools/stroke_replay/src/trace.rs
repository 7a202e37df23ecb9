use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{bail, Context, Result};
use strokeglyph::{InputEvent, Point, PointerButton};

const HEADER: &str = "stroke_trace,ms,kind,arg,x,y";

/// Reads `stroke_trace,ms,kind,arg,x,y` rows. Lines with another tag are
/// skipped so raw device logs can be replayed without filtering.
pub fn parse_trace(path: &Path) -> Result<Vec<InputEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.with_context(|| format!("failed to read {}:{line_no}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == HEADER {
            continue;
        }
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts[0] != "stroke_trace" {
            continue;
        }
        if parts.len() < 6 {
            bail!(
                "{}:{line_no} invalid trace line, expected 6 columns",
                path.display()
            );
        }
        let event = parse_event(&parts)
            .with_context(|| format!("{}:{line_no} invalid trace line", path.display()))?;
        out.push(event);
    }
    Ok(out)
}

fn parse_event(parts: &[&str]) -> Result<InputEvent> {
    let t_ms: u64 = parts[1].parse().context("invalid ms")?;
    let arg = parts[3];
    let event = match parts[2] {
        "down" => InputEvent::PointerDown {
            t_ms,
            button: parse_button(arg)?,
            point: parse_point(parts)?,
        },
        "move" => InputEvent::PointerMove {
            t_ms,
            point: parse_point(parts)?,
        },
        "up" => InputEvent::PointerUp {
            t_ms,
            button: parse_button(arg)?,
        },
        "modifier" => InputEvent::Modifier {
            t_ms,
            held: match arg {
                "1" | "held" => true,
                "0" | "released" => false,
                other => bail!("invalid modifier state '{other}'"),
            },
        },
        "touch_start" => InputEvent::TouchStart {
            t_ms,
            touches: arg.parse().context("invalid touch count")?,
            primary: parse_optional_point(parts)?,
        },
        "touch_move" => InputEvent::TouchMove {
            t_ms,
            primary: parse_optional_point(parts)?,
        },
        "touch_end" => InputEvent::TouchEnd { t_ms },
        "tick" => InputEvent::Tick { t_ms },
        other => bail!("unknown event kind '{other}'"),
    };
    Ok(event)
}

fn parse_button(raw: &str) -> Result<PointerButton> {
    match raw {
        "primary" => Ok(PointerButton::Primary),
        "secondary" => Ok(PointerButton::Secondary),
        "other" => Ok(PointerButton::Other),
        other => bail!("invalid button '{other}'"),
    }
}

fn parse_point(parts: &[&str]) -> Result<Point> {
    parse_optional_point(parts)?.context("missing coordinates")
}

fn parse_optional_point(parts: &[&str]) -> Result<Option<Point>> {
    match (parts[4], parts[5]) {
        ("", "") => Ok(None),
        (x, y) => {
            let x: f32 = x.parse().with_context(|| format!("invalid x '{x}'"))?;
            let y: f32 = y.parse().with_context(|| format!("invalid y '{y}'"))?;
            Ok(Some(Point::new(x, y)))
        }
    }
}

/// One expected recognized value per line; `unknown` for strokes that
/// should not classify.
pub fn parse_expected(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}:{}", path.display(), line_no + 1))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        values.push(token.to_string());
    }
    Ok(values)
}
