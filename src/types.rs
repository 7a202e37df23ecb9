use core::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Identifies one drawing session. Ids grow monotonically for the lifetime of
/// a pipeline, so an older id always compares lower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u32);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Number,
    Letter,
    Symbol,
    Unknown,
}

const SYMBOL_LABELS: &[&str] = &[
    "circle",
    "check",
    "x",
    "arrow_right",
    "arrow_left",
    "arrow_up",
    "arrow_down",
    "triangle",
    "square",
    "star",
    "search",
    "next",
    "prev",
    "right",
    "left",
    "up",
    "down",
];

impl GestureKind {
    /// Named symbols are checked before single letters so `x` stays a symbol.
    pub fn from_label(label: &str) -> Self {
        let mut chars = label.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };

        if single.is_some_and(|c| c.is_ascii_digit()) {
            GestureKind::Number
        } else if SYMBOL_LABELS.contains(&label) {
            GestureKind::Symbol
        } else if single.is_some_and(|c| c.is_ascii_alphabetic()) {
            GestureKind::Letter
        } else {
            GestureKind::Unknown
        }
    }

    /// Lower value wins when two templates match at the same distance.
    pub fn priority(self) -> u8 {
        match self {
            GestureKind::Number => 0,
            GestureKind::Letter => 1,
            GestureKind::Symbol => 2,
            GestureKind::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GestureKind::Number => "number",
            GestureKind::Letter => "letter",
            GestureKind::Symbol => "symbol",
            GestureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified stroke.
///
/// `value` is empty and `kind` is [`GestureKind::Unknown`] exactly when
/// `confidence` is zero. The constructors enforce this, so a result can only
/// be built through [`GestureResult::new`] or [`GestureResult::unknown`].
#[derive(Clone, Debug, PartialEq)]
pub struct GestureResult {
    kind: GestureKind,
    value: String,
    confidence: f32,
}

impl Default for GestureResult {
    fn default() -> Self {
        Self::unknown()
    }
}

impl GestureResult {
    pub fn unknown() -> Self {
        Self {
            kind: GestureKind::Unknown,
            value: String::new(),
            confidence: 0.0,
        }
    }

    pub fn new(kind: GestureKind, value: impl Into<String>, confidence: f32) -> Self {
        let value = value.into();
        let confidence = clamp_confidence(confidence);
        if confidence == 0.0 || value.is_empty() {
            return Self::unknown();
        }
        Self {
            kind,
            value,
            confidence,
        }
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn is_recognized(&self) -> bool {
        self.confidence > 0.0
    }
}

impl fmt::Display for GestureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_recognized() {
            write!(f, "{}:{} ({:.2})", self.kind, self.value, self.confidence)
        } else {
            f.write_str("unknown")
        }
    }
}

pub(crate) fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
