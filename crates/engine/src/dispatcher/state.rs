//! Gesture request bookkeeping, free of I/O and timers.
//!
//! The dispatcher task feeds every event through this machine and performs
//! the side effects the returned outcome asks for.

use crate::proximity::ProximityGate;
use gestures_events::ActionCode;
use std::time::Duration;
use tokio::time::Instant;

/// Identifies one gesture request, so a reading or timeout meant for an
/// earlier request can be told apart from one for the current request.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingProximity,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub action: ActionCode,
    /// Set while waiting for the proximity sensor.
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Another request is in flight; this one is dropped.
    Busy,
    /// Subscribe to the sensor and wait until the deadline.
    AwaitProximity(PendingRequest),
    /// Execute now.
    Armed(PendingRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// No matching request is waiting.
    Stale,
    /// Something covers the screen; keep waiting.
    Near,
    /// Clear to execute.
    Far(PendingRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOutcome {
    Stale,
    /// The wait ran out; the request is gone.
    Expired(PendingRequest),
}

#[derive(Debug)]
pub struct DispatchState {
    phase: Phase,
    pending: Option<PendingRequest>,
    next_id: RequestId,
}

impl Default for DispatchState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            next_id: 1,
        }
    }
}

impl DispatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// When the current proximity wait gives up, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::AwaitingProximity => self.pending.and_then(|p| p.deadline),
            _ => None,
        }
    }

    /// Start a request for `action`. `proximity_timeout` is `Some` when the
    /// proximity check applies.
    pub fn request(
        &mut self,
        action: ActionCode,
        proximity_timeout: Option<Duration>,
        now: Instant,
    ) -> RequestOutcome {
        if self.pending.is_some() {
            return RequestOutcome::Busy;
        }

        let id = self.next_id;
        self.next_id += 1;

        match proximity_timeout {
            Some(timeout) => {
                let request = PendingRequest {
                    id,
                    action,
                    deadline: Some(now + timeout),
                };
                self.enter(Phase::AwaitingProximity, request);
                RequestOutcome::AwaitProximity(request)
            }
            None => {
                let request = PendingRequest {
                    id,
                    action,
                    deadline: None,
                };
                self.enter(Phase::Armed, request);
                RequestOutcome::Armed(request)
            }
        }
    }

    pub fn on_reading(&mut self, id: RequestId, distance: f32, maximum_range: f32) -> ReadingOutcome {
        let Some(request) = self.awaiting(id) else {
            return ReadingOutcome::Stale;
        };
        if !ProximityGate::is_far(distance, maximum_range) {
            return ReadingOutcome::Near;
        }

        let armed = PendingRequest {
            deadline: None,
            ..request
        };
        self.enter(Phase::Armed, armed);
        ReadingOutcome::Far(armed)
    }

    pub fn on_timeout(&mut self, id: RequestId) -> TimeoutOutcome {
        match self.awaiting(id) {
            Some(request) => {
                self.clear();
                TimeoutOutcome::Expired(request)
            }
            None => TimeoutOutcome::Stale,
        }
    }

    /// The armed request `id` was handed to the executor.
    pub fn complete(&mut self, id: RequestId) -> bool {
        match self.pending {
            Some(request) if request.id == id && self.phase == Phase::Armed => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    /// Drop whatever is pending.
    pub fn cancel(&mut self) -> Option<PendingRequest> {
        let request = self.pending;
        self.clear();
        request
    }

    fn awaiting(&self, id: RequestId) -> Option<PendingRequest> {
        match self.pending {
            Some(request) if request.id == id && self.phase == Phase::AwaitingProximity => {
                Some(request)
            }
            _ => None,
        }
    }

    fn enter(&mut self, phase: Phase, request: PendingRequest) {
        self.phase = phase;
        self.pending = Some(request);
    }

    fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(250);
    const RANGE: f32 = 5.0;

    fn awaiting(state: &mut DispatchState, action: ActionCode) -> PendingRequest {
        match state.request(action, Some(TIMEOUT), Instant::now()) {
            RequestOutcome::AwaitProximity(request) => request,
            other => panic!("expected a proximity wait, got {other:?}"),
        }
    }

    #[test]
    fn test_ungated_request_is_armed() {
        let mut state = DispatchState::new();
        let outcome = state.request(ActionCode::Camera, None, Instant::now());

        let RequestOutcome::Armed(request) = outcome else {
            panic!("expected armed, got {outcome:?}");
        };
        assert_eq!(state.phase(), Phase::Armed);
        assert_eq!(state.deadline(), None);
        assert!(state.complete(request.id));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_gated_request_sets_deadline() {
        let mut state = DispatchState::new();
        let now = Instant::now();
        let outcome = state.request(ActionCode::Camera, Some(TIMEOUT), now);

        assert!(matches!(outcome, RequestOutcome::AwaitProximity(_)));
        assert_eq!(state.phase(), Phase::AwaitingProximity);
        assert_eq!(state.deadline(), Some(now + TIMEOUT));
    }

    #[test]
    fn test_second_request_is_busy_and_leaves_first_alone() {
        let mut state = DispatchState::new();
        let first = awaiting(&mut state, ActionCode::Camera);

        assert_eq!(
            state.request(ActionCode::Flashlight, None, Instant::now()),
            RequestOutcome::Busy
        );
        assert_eq!(state.pending(), Some(&first));
        assert_eq!(state.phase(), Phase::AwaitingProximity);
    }

    #[test]
    fn test_far_reading_arms_request() {
        let mut state = DispatchState::new();
        let request = awaiting(&mut state, ActionCode::Dialer);

        let ReadingOutcome::Far(armed) = state.on_reading(request.id, RANGE, RANGE) else {
            panic!("expected far");
        };
        assert_eq!(armed.action, ActionCode::Dialer);
        assert_eq!(state.phase(), Phase::Armed);
        assert_eq!(state.deadline(), None);

        // The timer for the same request may still fire; it must not matter.
        assert_eq!(state.on_timeout(request.id), TimeoutOutcome::Stale);
        assert!(state.complete(request.id));
    }

    #[test]
    fn test_near_reading_keeps_waiting() {
        let mut state = DispatchState::new();
        let request = awaiting(&mut state, ActionCode::Dialer);

        assert_eq!(state.on_reading(request.id, 0.0, RANGE), ReadingOutcome::Near);
        assert_eq!(state.phase(), Phase::AwaitingProximity);
        assert!(matches!(
            state.on_reading(request.id, RANGE, RANGE),
            ReadingOutcome::Far(_)
        ));
    }

    #[test]
    fn test_timeout_discards_request() {
        let mut state = DispatchState::new();
        let request = awaiting(&mut state, ActionCode::Camera);

        assert_eq!(state.on_timeout(request.id), TimeoutOutcome::Expired(request));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_late_reading_is_stale() {
        let mut state = DispatchState::new();
        let request = awaiting(&mut state, ActionCode::Camera);
        state.on_timeout(request.id);

        assert_eq!(state.on_reading(request.id, RANGE, RANGE), ReadingOutcome::Stale);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_reading_for_an_older_request_is_stale() {
        let mut state = DispatchState::new();
        let old = awaiting(&mut state, ActionCode::Camera);
        state.on_timeout(old.id);
        let current = awaiting(&mut state, ActionCode::Flashlight);

        assert_eq!(state.on_reading(old.id, RANGE, RANGE), ReadingOutcome::Stale);
        assert_eq!(state.pending(), Some(&current));
    }

    #[test]
    fn test_cancel_returns_pending_request() {
        let mut state = DispatchState::new();
        let request = awaiting(&mut state, ActionCode::Email);

        assert_eq!(state.cancel(), Some(request));
        assert_eq!(state.cancel(), None);
        assert!(!state.complete(request.id));
    }
}
