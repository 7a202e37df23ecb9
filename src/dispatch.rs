use core::fmt;
use std::collections::BTreeMap;

use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

use crate::{
    config::{GestureConfig, ThresholdConfig},
    types::{GestureResult, SessionId},
};

pub const DEFERRED_QUEUE_DEPTH: usize = 4;

pub type ActionHandler = Box<dyn FnMut(&GestureResult)>;

/// Application action bound to a gesture label or alias target.
pub struct ActionBinding {
    gesture_label: String,
    description: String,
    handler: ActionHandler,
}

impl ActionBinding {
    pub fn new(
        gesture_label: impl Into<String>,
        description: impl Into<String>,
        handler: impl FnMut(&GestureResult) + 'static,
    ) -> Self {
        Self {
            gesture_label: gesture_label.into(),
            description: description.into(),
            handler: Box::new(handler),
        }
    }

    pub fn gesture_label(&self) -> &str {
        &self.gesture_label
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBinding")
            .field("gesture_label", &self.gesture_label)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchDecision {
    /// Handler queued; it runs on the next [`ActionDispatcher::run_deferred`].
    Scheduled { action: String },
    Unrecognized,
    BelowFireFloor,
    Unbound { action: String },
    AlreadyDispatched,
    QueueFull { action: String },
}

struct DeferredCall {
    session: SessionId,
    binding: usize,
    result: GestureResult,
}

/// Resolves results to bindings and defers the handler call.
///
/// Handlers never run inside [`ActionDispatcher::schedule`]. They are posted
/// to a queue and drained by [`ActionDispatcher::run_deferred`], so the caller
/// finishes its own update before any application code runs.
pub struct ActionDispatcher {
    aliases: BTreeMap<String, String>,
    thresholds: ThresholdConfig,
    bindings: Vec<ActionBinding>,
    deferred: Channel<NoopRawMutex, DeferredCall, DEFERRED_QUEUE_DEPTH>,
    pending: usize,
    last_dispatched: Option<SessionId>,
}

impl ActionDispatcher {
    pub fn new(config: &GestureConfig, bindings: Vec<ActionBinding>) -> Self {
        Self {
            aliases: config.aliases.0.clone(),
            thresholds: config.thresholds,
            bindings,
            deferred: Channel::new(),
            pending: 0,
            last_dispatched: None,
        }
    }

    /// Alias target for `label`, or the label itself.
    pub fn resolve_action<'a>(&'a self, label: &'a str) -> &'a str {
        self.aliases.get(label).map_or(label, String::as_str)
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn schedule(&mut self, session: SessionId, result: &GestureResult) -> DispatchDecision {
        if !result.is_recognized() {
            return DispatchDecision::Unrecognized;
        }
        if !self.thresholds.fires(result.confidence()) {
            log::debug!(
                "gesture: dispatch_skipped id={} value={} confidence={:.2} reason=below_fire",
                session,
                result.value(),
                result.confidence()
            );
            return DispatchDecision::BelowFireFloor;
        }
        if self.last_dispatched.is_some_and(|last| last >= session) {
            return DispatchDecision::AlreadyDispatched;
        }

        let action = self.resolve_action(result.value()).to_string();
        let Some(binding) = self
            .bindings
            .iter()
            .position(|binding| binding.gesture_label == action)
        else {
            log::debug!("gesture: dispatch_unbound id={} action={}", session, action);
            return DispatchDecision::Unbound { action };
        };

        let call = DeferredCall {
            session,
            binding,
            result: result.clone(),
        };
        if self.deferred.try_send(call).is_err() {
            log::warn!(
                "gesture: dispatch_dropped id={} action={} reason=queue_full",
                session,
                action
            );
            return DispatchDecision::QueueFull { action };
        }
        self.pending += 1;
        self.last_dispatched = Some(session);
        log::info!("gesture: dispatch_scheduled id={} action={}", session, action);
        DispatchDecision::Scheduled { action }
    }

    /// Runs every queued handler once. Returns how many ran.
    pub fn run_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(call) = self.deferred.try_receive() {
            self.pending = self.pending.saturating_sub(1);
            let Some(binding) = self.bindings.get_mut(call.binding) else {
                continue;
            };
            log::debug!(
                "gesture: dispatch_run id={} action={}",
                call.session,
                binding.gesture_label
            );
            (binding.handler)(&call.result);
            ran += 1;
        }
        ran
    }

    /// Swaps the binding table. Calls queued against the old table are
    /// dropped; the count is returned.
    pub fn replace_bindings(&mut self, bindings: Vec<ActionBinding>) -> usize {
        let mut dropped = 0;
        while self.deferred.try_receive().is_ok() {
            dropped += 1;
        }
        self.pending = 0;
        self.bindings = bindings;
        if dropped > 0 {
            log::info!("gesture: bindings_replaced dropped={}", dropped);
        }
        dropped
    }
}

impl fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("aliases", &self.aliases)
            .field("bindings", &self.bindings)
            .field("pending", &self.pending)
            .field("last_dispatched", &self.last_dispatched)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::types::GestureKind;

    type Calls = Rc<RefCell<Vec<String>>>;

    fn recording(label: &str, calls: &Calls) -> ActionBinding {
        let calls = Rc::clone(calls);
        let name = label.to_string();
        ActionBinding::new(label, format!("record {label}"), move |result| {
            calls.borrow_mut().push(format!("{name}:{}", result.value()));
        })
    }

    fn symbol(value: &str, confidence: f32) -> GestureResult {
        GestureResult::new(GestureKind::Symbol, value, confidence)
    }

    fn dispatcher(calls: &Calls) -> ActionDispatcher {
        ActionDispatcher::new(
            &GestureConfig::default(),
            vec![
                recording("next", calls),
                recording("search", calls),
                recording("7", calls),
            ],
        )
    }

    #[test]
    fn aliases_resolve_before_lookup() {
        let calls = Calls::default();
        let dispatcher = dispatcher(&calls);
        assert_eq!(dispatcher.resolve_action("arrow_right"), "next");
        assert_eq!(dispatcher.resolve_action("right"), "next");
        assert_eq!(dispatcher.resolve_action("arrow_left"), "prev");
        assert_eq!(dispatcher.resolve_action("circle"), "search");
        assert_eq!(dispatcher.resolve_action("7"), "7");
    }

    #[test]
    fn handler_runs_only_when_deferred_queue_drains() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);

        let decision = dispatcher.schedule(SessionId(1), &symbol("circle", 0.9));
        assert_eq!(
            decision,
            DispatchDecision::Scheduled {
                action: "search".into()
            }
        );
        assert!(calls.borrow().is_empty());
        assert_eq!(dispatcher.pending(), 1);

        assert_eq!(dispatcher.run_deferred(), 1);
        assert_eq!(*calls.borrow(), vec!["search:circle".to_string()]);
        assert_eq!(dispatcher.run_deferred(), 0);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn one_dispatch_per_session() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        dispatcher.schedule(SessionId(4), &symbol("right", 0.7));
        assert_eq!(
            dispatcher.schedule(SessionId(4), &symbol("right", 0.7)),
            DispatchDecision::AlreadyDispatched
        );
        assert_eq!(
            dispatcher.schedule(SessionId(3), &symbol("right", 0.7)),
            DispatchDecision::AlreadyDispatched
        );
        dispatcher.run_deferred();
        assert_eq!(*calls.borrow(), vec!["next:right".to_string()]);
    }

    #[test]
    fn unbound_and_unrecognized_are_no_ops() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        assert_eq!(
            dispatcher.schedule(SessionId(1), &symbol("arrow_left", 0.8)),
            DispatchDecision::Unbound {
                action: "prev".into()
            }
        );
        assert_eq!(
            dispatcher.schedule(SessionId(2), &GestureResult::unknown()),
            DispatchDecision::Unrecognized
        );
        assert_eq!(dispatcher.run_deferred(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn fire_floor_blocks_weak_results() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        assert_eq!(
            dispatcher.schedule(SessionId(1), &symbol("circle", 0.2)),
            DispatchDecision::BelowFireFloor
        );
        assert!(matches!(
            dispatcher.schedule(SessionId(2), &symbol("circle", 0.25)),
            DispatchDecision::Scheduled { .. }
        ));
    }

    #[test]
    fn exact_label_match_only() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        let digit = GestureResult::new(GestureKind::Number, "7", 0.6);
        assert!(matches!(
            dispatcher.schedule(SessionId(1), &digit),
            DispatchDecision::Scheduled { .. }
        ));
        let other = GestureResult::new(GestureKind::Number, "1", 0.6);
        assert_eq!(
            dispatcher.schedule(SessionId(2), &other),
            DispatchDecision::Unbound { action: "1".into() }
        );
    }

    #[test]
    fn full_queue_reports_drop_and_keeps_session_open() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        for id in 1..=DEFERRED_QUEUE_DEPTH as u32 {
            assert!(matches!(
                dispatcher.schedule(SessionId(id), &symbol("circle", 0.9)),
                DispatchDecision::Scheduled { .. }
            ));
        }
        let overflow = SessionId(DEFERRED_QUEUE_DEPTH as u32 + 1);
        assert_eq!(
            dispatcher.schedule(overflow, &symbol("circle", 0.9)),
            DispatchDecision::QueueFull {
                action: "search".into()
            }
        );
        assert_eq!(dispatcher.run_deferred(), DEFERRED_QUEUE_DEPTH);
        assert!(matches!(
            dispatcher.schedule(overflow, &symbol("circle", 0.9)),
            DispatchDecision::Scheduled { .. }
        ));
    }

    #[test]
    fn replacing_bindings_drops_queued_calls() {
        let calls = Calls::default();
        let mut dispatcher = dispatcher(&calls);
        dispatcher.schedule(SessionId(1), &symbol("circle", 0.9));
        let dropped = dispatcher.replace_bindings(vec![recording("prev", &calls)]);
        assert_eq!(dropped, 1);
        assert_eq!(dispatcher.run_deferred(), 0);

        dispatcher.schedule(SessionId(2), &symbol("left", 0.7));
        dispatcher.run_deferred();
        assert_eq!(*calls.borrow(), vec!["prev:left".to_string()]);
        assert_eq!(dispatcher.bindings()[0].description(), "record prev");
    }
}
