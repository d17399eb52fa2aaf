//! Recording session state machine

use std::fmt;
use thiserror::Error;

/// Recording session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Configured,
    Recording,
    Draining,
    Finished,
    Failed,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Configured => "configured",
            Self::Recording => "recording",
            Self::Draining => "draining",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }

    /// Whether the session has produced its single outcome
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Recording session entity.
///
/// State machine:
///   IDLE -> CONFIGURED (configure)
///   CONFIGURED -> RECORDING (start)
///   RECORDING -> DRAINING (stop)
///   DRAINING -> FINISHED (complete)
///   CONFIGURED | RECORDING | DRAINING -> FAILED (fail)
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: SessionState,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    fn transition(
        &mut self,
        from: &[SessionState],
        to: SessionState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if !from.contains(&self.state) {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to CONFIGURED
    pub fn configure(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(&[SessionState::Idle], SessionState::Configured, "set up")
    }

    /// Transition from CONFIGURED to RECORDING
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[SessionState::Configured],
            SessionState::Recording,
            "start recording",
        )
    }

    /// Transition from RECORDING to DRAINING
    pub fn stop(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[SessionState::Recording],
            SessionState::Draining,
            "stop recording",
        )
    }

    /// Transition from DRAINING to FINISHED
    pub fn complete(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[SessionState::Draining],
            SessionState::Finished,
            "complete recording",
        )
    }

    /// Transition from any live state to FAILED
    pub fn fail(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            &[
                SessionState::Configured,
                SessionState::Recording,
                SessionState::Draining,
            ],
            SessionState::Failed,
            "fail recording",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draining() -> RecordingSession {
        let mut session = RecordingSession::new();
        session.configure().unwrap();
        session.start().unwrap();
        session.stop().unwrap();
        session
    }

    #[test]
    fn new_session_is_idle() {
        let session = RecordingSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_terminal());
    }

    #[test]
    fn full_cycle() {
        let mut session = draining();
        assert_eq!(session.state(), SessionState::Draining);

        session.complete().unwrap();
        assert_eq!(session.state(), SessionState::Finished);
        assert!(session.is_terminal());
    }

    #[test]
    fn start_without_configure_fails() {
        let mut session = RecordingSession::new();

        let err = session.start().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn stop_without_start_fails() {
        let mut session = RecordingSession::new();
        session.configure().unwrap();

        let err = session.stop().unwrap_err();
        assert_eq!(err.current_state, SessionState::Configured);
    }

    #[test]
    fn complete_requires_draining() {
        let mut session = RecordingSession::new();
        session.configure().unwrap();
        session.start().unwrap();

        let err = session.complete().unwrap_err();
        assert_eq!(err.current_state, SessionState::Recording);
    }

    #[test]
    fn fail_from_every_live_state() {
        let mut configured = RecordingSession::new();
        configured.configure().unwrap();
        assert!(configured.fail().is_ok());

        let mut recording = RecordingSession::new();
        recording.configure().unwrap();
        recording.start().unwrap();
        assert!(recording.fail().is_ok());

        let mut session = draining();
        assert!(session.fail().is_ok());
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn terminal_states_accept_no_second_outcome() {
        let mut finished = draining();
        finished.complete().unwrap();
        assert!(finished.fail().is_err());
        assert!(finished.complete().is_err());

        let mut failed = draining();
        failed.fail().unwrap();
        assert!(failed.complete().is_err());
        assert!(failed.fail().is_err());
    }

    #[test]
    fn fail_from_idle_is_rejected() {
        let mut session = RecordingSession::new();
        assert!(session.fail().is_err());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Draining.to_string(), "draining");
        assert_eq!(SessionState::Failed.to_string(), "failed");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Idle,
            action: "stop recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stop recording"));
        assert!(msg.contains("idle"));
    }
}
