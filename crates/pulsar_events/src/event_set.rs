//! # Event Set
//!
//! Ordered list of [`BoundInvocation`]s fired front to back.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::InvocationError;
use crate::invocation::{BoundInvocation, InvokeOutcome, SkipReason, UnsupportedParam};
use crate::scene::Scene;

/// What a pass does when an entry raises an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first error and return it. Later entries do not run.
    #[default]
    Abort,
    /// Run every entry and collect errors in the report.
    Continue,
}

/// Per-entry results of one pass over an [`EventSet`].
#[derive(Debug, Default)]
pub struct InvocationReport {
    pub invoked: usize,
    pub skipped: Vec<(usize, SkipReason)>,
    pub failures: Vec<(usize, InvocationError)>,
    /// Parameters that were passed their default, by entry index.
    pub unsupported: Vec<(usize, UnsupportedParam)>,
}

impl InvocationReport {
    /// Every entry was invoked without error and with all its arguments.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty() && self.unsupported.is_empty()
    }

    fn record(&mut self, index: usize, outcome: InvokeOutcome) {
        match outcome {
            InvokeOutcome::Invoked { unsupported } => {
                self.invoked += 1;
                self.unsupported
                    .extend(unsupported.into_iter().map(|param| (index, param)));
            }
            InvokeOutcome::Skipped(reason) => self.skipped.push((index, reason)),
        }
    }
}

/// Custom events attached to a component.
///
/// Insertion order is invocation order and duplicates are allowed. The entries
/// are only exposed as a shared slice; changes go through the set itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSet {
    #[serde(default)]
    events: Vec<BoundInvocation>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every entry in order, stopping at the first error.
    pub fn invoke(&self, scene: &mut dyn Scene) -> Result<InvocationReport, InvocationError> {
        self.invoke_with_policy(scene, FailurePolicy::Abort)
    }

    /// Invoke every entry in order.
    ///
    /// With [`FailurePolicy::Abort`] the first error is returned and the
    /// remaining entries are not run. With [`FailurePolicy::Continue`] errors are
    /// collected in the report and this never returns `Err`.
    pub fn invoke_with_policy(
        &self,
        scene: &mut dyn Scene,
        policy: FailurePolicy,
    ) -> Result<InvocationReport, InvocationError> {
        let mut report = InvocationReport::default();
        for (index, event) in self.events.iter().enumerate() {
            match event.invoke(scene) {
                Ok(outcome) => report.record(index, outcome),
                Err(err) if policy == FailurePolicy::Continue => {
                    warn!(index, error = %err, "custom event failed, continuing");
                    report.failures.push((index, err));
                }
                Err(err) => return Err(err),
            }
        }
        debug!(
            invoked = report.invoked,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            defaulted = report.unsupported.len(),
            "custom events fired"
        );
        Ok(report)
    }

    /// Append an entry. `None` is ignored.
    pub fn add_event(&mut self, event: impl Into<Option<BoundInvocation>>) {
        if let Some(event) = event.into() {
            self.events.push(event);
        }
    }

    /// Remove the first entry equal to `event`. Returns whether one was removed.
    pub fn remove_event(&mut self, event: &BoundInvocation) -> bool {
        match self.events.iter().position(|e| e == event) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn events(&self) -> &[BoundInvocation] {
        &self.events
    }

    pub fn event_mut(&mut self, index: usize) -> Option<&mut BoundInvocation> {
        self.events.get_mut(index)
    }

    /// Move an entry to a new position, as a drag in the editor list does.
    pub fn move_event(&mut self, from: usize, to: usize) -> bool {
        if from >= self.events.len() || to >= self.events.len() {
            return false;
        }
        let event = self.events.remove(from);
        self.events.insert(to, event);
        true
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundInvocation> {
        self.events.iter()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl FromIterator<BoundInvocation> for EventSet {
    fn from_iter<I: IntoIterator<Item = BoundInvocation>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a BoundInvocation;
    type IntoIter = std::slice::Iter<'a, BoundInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
