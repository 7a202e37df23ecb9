use statig::blocking::IntoStateMachineExt as _;

use crate::{config::CaptureConfig, types::Point};

mod hsm;


use hsm::CaptureHsm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// Raw input from the host surface. Timestamps are milliseconds on any
/// monotonic clock; they only drive the inactivity deadline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown {
        t_ms: u64,
        button: PointerButton,
        point: Point,
    },
    PointerMove {
        t_ms: u64,
        point: Point,
    },
    PointerUp {
        t_ms: u64,
        button: PointerButton,
    },
    Modifier {
        t_ms: u64,
        held: bool,
    },
    TouchStart {
        t_ms: u64,
        touches: u8,
        primary: Option<Point>,
    },
    TouchMove {
        t_ms: u64,
        primary: Option<Point>,
    },
    TouchEnd {
        t_ms: u64,
    },
    Tick {
        t_ms: u64,
    },
}

impl InputEvent {
    pub fn t_ms(&self) -> u64 {
        match *self {
            InputEvent::PointerDown { t_ms, .. }
            | InputEvent::PointerMove { t_ms, .. }
            | InputEvent::PointerUp { t_ms, .. }
            | InputEvent::Modifier { t_ms, .. }
            | InputEvent::TouchStart { t_ms, .. }
            | InputEvent::TouchMove { t_ms, .. }
            | InputEvent::TouchEnd { t_ms }
            | InputEvent::Tick { t_ms } => t_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTrigger {
    SecondaryButton,
    ModifiedPrimary,
    MultiTouch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    ButtonReleased,
    ModifierReleased,
    TouchEnded,
    Inactivity,
}

/// A finished stroke. The points can no longer change.
#[derive(Clone, Debug, PartialEq)]
pub struct SealedPath {
    trigger: SessionTrigger,
    reason: EndReason,
    started_ms: u64,
    ended_ms: u64,
    points: Box<[Point]>,
}

impl SealedPath {
    pub fn new(
        trigger: SessionTrigger,
        reason: EndReason,
        started_ms: u64,
        ended_ms: u64,
        points: impl Into<Box<[Point]>>,
    ) -> Self {
        Self {
            trigger,
            reason,
            started_ms,
            ended_ms,
            points: points.into(),
        }
    }

    pub fn trigger(&self) -> SessionTrigger {
        self.trigger
    }

    pub fn reason(&self) -> EndReason {
        self.reason
    }

    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    pub fn ended_ms(&self) -> u64 {
        self.ended_ms
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// What one input event did to the session. A single event can both seal an
/// expired session and start the next one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureOutput {
    pub sealed: Option<SealedPath>,
    pub started: Option<SessionTrigger>,
}

#[derive(Debug, Default)]
struct DispatchContext {
    sealed: Option<SealedPath>,
    started: Option<SessionTrigger>,
}

impl DispatchContext {
    fn finish(self) -> CaptureOutput {
        CaptureOutput {
            sealed: self.sealed,
            started: self.started,
        }
    }
}

/// Idle/Drawing session gate over raw pointer and touch input.
pub struct InputCapture {
    machine: statig::blocking::StateMachine<CaptureHsm>,
}

impl Default for InputCapture {
    fn default() -> Self {
        Self::new(&CaptureConfig::default())
    }
}

impl InputCapture {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            machine: CaptureHsm::new(*config).state_machine(),
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> CaptureOutput {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context.finish()
    }

    /// Lets the inactivity deadline fire when no input is arriving.
    pub fn tick(&mut self, t_ms: u64) -> CaptureOutput {
        self.handle(InputEvent::Tick { t_ms })
    }

    pub fn is_drawing(&self) -> bool {
        self.machine.inner().drawing
    }

    /// Points of the session in progress, empty while idle.
    pub fn current_path(&self) -> &[Point] {
        &self.machine.inner().path
    }

    pub fn inactivity_deadline_ms(&self) -> Option<u64> {
        self.machine.inner().inactivity_deadline_ms
    }
}
