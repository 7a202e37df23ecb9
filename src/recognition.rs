use std::sync::Arc;

use crate::{
    config::{GestureConfig, DEFAULT_RESAMPLE_POINTS},
    error::MatchError,
    types::{clamp_confidence, GestureKind, GestureResult, Point},
};

mod dtw;
mod templates;

#[cfg(test)]
mod tests;

use dtw::dtw_distance;
use templates::prepare_points;
pub use templates::{builtin_strokes, Template, TemplateSet};

pub const MAX_RANKED: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCandidate<'a> {
    pub label: &'a str,
    pub kind: GestureKind,
    pub distance: f32,
    pub confidence: f32,
}

/// Template matcher. Stateless apart from its read-only corpus, so the same
/// path always yields the same result.
#[derive(Clone, Debug)]
pub struct RecognitionEngine {
    templates: Arc<TemplateSet>,
    min_points: usize,
    max_acceptable_distance: f32,
}

impl Default for RecognitionEngine {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl RecognitionEngine {
    pub fn new(config: &GestureConfig) -> Self {
        let resample_points = config.recognition.resample_points;
        let templates = if resample_points == DEFAULT_RESAMPLE_POINTS {
            TemplateSet::builtin()
        } else {
            match TemplateSet::from_strokes(builtin_strokes(), resample_points) {
                Ok(set) => Arc::new(set),
                Err(err) => {
                    log::error!(
                        "gesture: builtin_corpus_failed resample_points={} err={}",
                        resample_points,
                        err
                    );
                    Arc::new(TemplateSet::empty(resample_points))
                }
            }
        };
        Self::from_shared(config, templates)
    }

    pub fn with_templates(config: &GestureConfig, templates: TemplateSet) -> Self {
        Self::from_shared(config, Arc::new(templates))
    }

    fn from_shared(config: &GestureConfig, templates: Arc<TemplateSet>) -> Self {
        Self {
            templates,
            min_points: config.capture.min_points,
            max_acceptable_distance: config.recognition.max_acceptable_distance,
        }
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Classifies a sealed path. Short paths return unknown without touching
    /// the corpus; matcher failures are logged and also return unknown.
    pub fn recognize(&self, path: &[Point]) -> GestureResult {
        if path.len() < self.min_points {
            return GestureResult::unknown();
        }
        match self.best_match(path) {
            Ok(best) => GestureResult::new(best.kind, best.label, best.confidence),
            Err(err) => {
                log::warn!("gesture: match_failed points={} err={}", path.len(), err);
                GestureResult::unknown()
            }
        }
    }

    pub fn best_match(&self, path: &[Point]) -> Result<MatchCandidate<'_>, MatchError> {
        let prepared = self.prepare(path)?;
        let mut best: Option<MatchCandidate<'_>> = None;
        for template in self.templates.iter() {
            let candidate = self.compare(&prepared, template)?;
            // Strict comparison keeps the earlier template on ties.
            if best.map_or(true, |b| candidate.distance < b.distance) {
                best = Some(candidate);
            }
        }
        best.ok_or(MatchError::EmptyCorpus)
    }

    /// Up to `limit` closest templates, nearest first, capped at [`MAX_RANKED`].
    pub fn rank(
        &self,
        path: &[Point],
        limit: usize,
    ) -> Result<heapless::Vec<MatchCandidate<'_>, MAX_RANKED>, MatchError> {
        let prepared = self.prepare(path)?;
        if self.templates.is_empty() {
            return Err(MatchError::EmptyCorpus);
        }
        let cap = limit.min(MAX_RANKED);
        let mut ranked: heapless::Vec<MatchCandidate<'_>, MAX_RANKED> = heapless::Vec::new();
        if cap == 0 {
            return Ok(ranked);
        }
        for template in self.templates.iter() {
            let candidate = self.compare(&prepared, template)?;
            // Ties go after existing entries so corpus order is kept.
            let at = ranked
                .iter()
                .position(|c| c.distance > candidate.distance)
                .unwrap_or(ranked.len());
            if at >= cap {
                continue;
            }
            if ranked.len() == cap {
                ranked.pop();
            }
            // Below the cap here, and the cap never exceeds the capacity.
            let _ = ranked.insert(at, candidate);
        }
        Ok(ranked)
    }

    /// Resamples and normalizes a path the same way the corpus was built.
    pub fn prepare(&self, path: &[Point]) -> Result<Vec<Point>, MatchError> {
        if path.len() < self.min_points {
            return Err(MatchError::TooFewPoints {
                len: path.len(),
                min: self.min_points,
            });
        }
        if path.iter().any(|p| !p.is_finite()) {
            return Err(MatchError::NonFinite);
        }
        prepare_points(path, self.templates.resample_points()).ok_or(MatchError::Degenerate)
    }

    pub fn confidence(&self, distance: f32) -> f32 {
        clamp_confidence(1.0 - distance / self.max_acceptable_distance)
    }

    fn compare<'a>(
        &self,
        prepared: &[Point],
        template: &'a Template,
    ) -> Result<MatchCandidate<'a>, MatchError> {
        let distance = dtw_distance(prepared, template.points()).ok_or(MatchError::Degenerate)?;
        if !distance.is_finite() {
            return Err(MatchError::NonFinite);
        }
        Ok(MatchCandidate {
            label: template.label(),
            kind: template.kind(),
            distance,
            confidence: self.confidence(distance),
        })
    }
}
