use statig::prelude::*;

use super::{DispatchContext, EndReason, InputEvent, PointerButton, SealedPath, SessionTrigger};
use crate::{config::CaptureConfig, geometry::squared_distance, types::Point};

pub(super) struct CaptureHsm {
    config: CaptureConfig,
    modifier_held: bool,
    pub(super) drawing: bool,
    trigger: SessionTrigger,
    started_ms: u64,
    pub(super) path: Vec<Point>,
    pub(super) inactivity_deadline_ms: Option<u64>,
}

#[state_machine(initial = "State::idle()")]
impl CaptureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &InputEvent) -> Outcome<State> {
        if self.begin_if_triggered(context, event) {
            Transition(State::drawing())
        } else {
            Handled
        }
    }

    #[state]
    fn drawing(&mut self, context: &mut DispatchContext, event: &InputEvent) -> Outcome<State> {
        if let Some(deadline_ms) = self.expired_deadline(event.t_ms()) {
            // The timer should have fired before this event arrived; close the
            // stale session first, then treat the event as fresh input.
            self.seal(context, deadline_ms, EndReason::Inactivity);
            return if self.begin_if_triggered(context, event) {
                Transition(State::drawing())
            } else {
                Transition(State::idle())
            };
        }

        match *event {
            InputEvent::PointerMove { t_ms, point } if self.pointer_session() => {
                self.observe_point(t_ms, point);
                Handled
            }
            InputEvent::TouchMove {
                t_ms,
                primary: Some(point),
            } if self.trigger == SessionTrigger::MultiTouch => {
                self.observe_point(t_ms, point);
                Handled
            }
            InputEvent::PointerUp { t_ms, button } if self.released_by(button) => {
                self.seal(context, t_ms, EndReason::ButtonReleased);
                Transition(State::idle())
            }
            InputEvent::Modifier { t_ms, held } => {
                self.modifier_held = held;
                if !held && self.trigger == SessionTrigger::ModifiedPrimary {
                    self.seal(context, t_ms, EndReason::ModifierReleased);
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
            InputEvent::TouchEnd { t_ms } if self.trigger == SessionTrigger::MultiTouch => {
                self.seal(context, t_ms, EndReason::TouchEnded);
                Transition(State::idle())
            }
            InputEvent::PointerDown { t_ms, .. } | InputEvent::TouchStart { t_ms, .. } => {
                log::debug!(
                    "gesture: start_ignored t_ms={} reason=session_active points={}",
                    t_ms,
                    self.path.len()
                );
                Handled
            }
            _ => Handled,
        }
    }
}

impl CaptureHsm {
    pub(super) fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            modifier_held: false,
            drawing: false,
            trigger: SessionTrigger::SecondaryButton,
            started_ms: 0,
            path: Vec::new(),
            inactivity_deadline_ms: None,
        }
    }

    fn begin_if_triggered(&mut self, context: &mut DispatchContext, event: &InputEvent) -> bool {
        let (t_ms, trigger, point) = match *event {
            InputEvent::Modifier { held, .. } => {
                self.modifier_held = held;
                return false;
            }
            InputEvent::PointerDown {
                t_ms,
                button: PointerButton::Secondary,
                point,
            } => (t_ms, SessionTrigger::SecondaryButton, point),
            InputEvent::PointerDown {
                t_ms,
                button: PointerButton::Primary,
                point,
            } if self.modifier_held => (t_ms, SessionTrigger::ModifiedPrimary, point),
            InputEvent::TouchStart {
                t_ms,
                touches,
                primary: Some(point),
            } if touches >= 2 => (t_ms, SessionTrigger::MultiTouch, point),
            _ => return false,
        };
        if !point.is_finite() {
            return false;
        }

        self.drawing = true;
        self.trigger = trigger;
        self.started_ms = t_ms;
        self.path.clear();
        self.path.push(point);
        self.arm_deadline(t_ms);
        context.started = Some(trigger);
        log::debug!("gesture: drawing_start t_ms={} trigger={:?}", t_ms, trigger);
        true
    }

    fn observe_point(&mut self, t_ms: u64, point: Point) {
        if !point.is_finite() {
            return;
        }
        let min_distance = self.config.min_point_distance_px;
        let accepted = self
            .path
            .last()
            .map_or(true, |&last| squared_distance(last, point) >= min_distance * min_distance);
        if accepted {
            self.path.push(point);
            self.arm_deadline(t_ms);
        }
    }

    fn arm_deadline(&mut self, t_ms: u64) {
        self.inactivity_deadline_ms = Some(t_ms.saturating_add(self.config.inactivity_timeout_ms));
    }

    fn expired_deadline(&self, now_ms: u64) -> Option<u64> {
        self.inactivity_deadline_ms
            .filter(|&deadline_ms| now_ms >= deadline_ms)
    }

    fn pointer_session(&self) -> bool {
        matches!(
            self.trigger,
            SessionTrigger::SecondaryButton | SessionTrigger::ModifiedPrimary
        )
    }

    fn released_by(&self, button: PointerButton) -> bool {
        matches!(
            (self.trigger, button),
            (SessionTrigger::SecondaryButton, PointerButton::Secondary)
                | (SessionTrigger::ModifiedPrimary, PointerButton::Primary)
        )
    }

    fn seal(&mut self, context: &mut DispatchContext, ended_ms: u64, reason: EndReason) {
        // Cancelled on every exit path so a late tick cannot complete twice.
        self.inactivity_deadline_ms = None;
        self.drawing = false;
        let points = core::mem::take(&mut self.path);
        log::debug!(
            "gesture: drawing_end t_ms={} reason={:?} points={} duration_ms={}",
            ended_ms,
            reason,
            points.len(),
            ended_ms.saturating_sub(self.started_ms)
        );
        context.sealed = Some(SealedPath::new(
            self.trigger,
            reason,
            self.started_ms,
            ended_ms,
            points,
        ));
    }
}
