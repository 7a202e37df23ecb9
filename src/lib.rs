//! Freehand stroke gesture recognition.
//!
//! Raw pointer and touch events go through [`capture::InputCapture`], which
//! seals one [`capture::SealedPath`] per drawing session. Sealed paths are
//! matched against a template corpus by [`recognition::RecognitionEngine`],
//! with [`direction::DirectionFallback`] covering strokes the matcher cannot
//! place. [`dispatch::ActionDispatcher`] maps the winning label onto at most
//! one bound handler and runs it on a deferred queue.
//!
//! [`pipeline::GesturePipeline`] wires the stages together for a host event
//! loop.

pub mod capture;
pub mod config;
pub mod direction;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod recognition;
pub mod types;

pub use capture::{CaptureOutput, EndReason, InputCapture, InputEvent, PointerButton, SealedPath};
pub use config::GestureConfig;
pub use direction::{Direction, DirectionFallback};
pub use dispatch::{ActionBinding, ActionDispatcher, DispatchDecision};
pub use error::{ConfigError, GestureError, MatchError};
pub use pipeline::{
    CompletionStatus, GesturePipeline, RecognitionOutcome, RecognitionWorker, ResultSource,
};
pub use recognition::{RecognitionEngine, Template, TemplateSet};
pub use types::{GestureKind, GestureResult, Point, SessionId};
