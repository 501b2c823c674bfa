use updater_core::UpdatePhase;

use crate::error::{OrchestratorError, Result};

pub struct PhaseStateMachine;

impl PhaseStateMachine {
    pub fn validate_transition(from: &UpdatePhase, to: &UpdatePhase) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: *from,
                to: *to,
            })
        }
    }

    /// Forward advance, in-place retry, and the Validation -> Implementation rewind.
    fn allowed_transitions(from: &UpdatePhase) -> Vec<UpdatePhase> {
        match from {
            UpdatePhase::Analysis => vec![UpdatePhase::Implementation, UpdatePhase::Analysis],
            UpdatePhase::Implementation => {
                vec![UpdatePhase::Validation, UpdatePhase::Implementation]
            }
            UpdatePhase::Validation => vec![
                UpdatePhase::Publish,
                UpdatePhase::Validation,
                UpdatePhase::Implementation,
            ],
            UpdatePhase::Publish => vec![UpdatePhase::Publish],
        }
    }

    pub fn next_phase(current: &UpdatePhase) -> Option<UpdatePhase> {
        match current {
            UpdatePhase::Analysis => Some(UpdatePhase::Implementation),
            UpdatePhase::Implementation => Some(UpdatePhase::Validation),
            UpdatePhase::Validation => Some(UpdatePhase::Publish),
            UpdatePhase::Publish => None,
        }
    }

    pub fn previous_phase(current: &UpdatePhase) -> Option<UpdatePhase> {
        match current {
            UpdatePhase::Analysis => None,
            UpdatePhase::Implementation => Some(UpdatePhase::Analysis),
            UpdatePhase::Validation => Some(UpdatePhase::Implementation),
            UpdatePhase::Publish => Some(UpdatePhase::Validation),
        }
    }

    /// Phase the next attempt runs after `failed` returned `error`.
    ///
    /// A rejected review verdict needs new edits, so with `rewind` set it goes
    /// back to Implementation. Everything else retries in place.
    pub fn retry_target(failed: &UpdatePhase, error: &OrchestratorError, rewind: bool) -> UpdatePhase {
        match (failed, error) {
            (UpdatePhase::Validation, OrchestratorError::ReviewRejected { .. }) if rewind => {
                Self::previous_phase(failed).unwrap_or(*failed)
            }
            _ => *failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(from: UpdatePhase, to: UpdatePhase) -> bool {
        PhaseStateMachine::validate_transition(&from, &to).is_ok()
    }

    #[test]
    fn test_valid_transitions() {
        assert!(allowed(UpdatePhase::Analysis, UpdatePhase::Implementation));
        assert!(allowed(UpdatePhase::Validation, UpdatePhase::Publish));
        assert!(allowed(UpdatePhase::Publish, UpdatePhase::Publish));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!allowed(UpdatePhase::Analysis, UpdatePhase::Publish));
        assert!(!allowed(UpdatePhase::Implementation, UpdatePhase::Analysis));
        assert!(!allowed(UpdatePhase::Publish, UpdatePhase::Validation));
    }

    #[test]
    fn test_validation_can_rewind() {
        assert!(allowed(UpdatePhase::Validation, UpdatePhase::Implementation));
    }

    #[test]
    fn test_next_phase() {
        assert_eq!(
            PhaseStateMachine::next_phase(&UpdatePhase::Analysis),
            Some(UpdatePhase::Implementation)
        );
        assert_eq!(PhaseStateMachine::next_phase(&UpdatePhase::Publish), None);
    }

    #[test]
    fn test_retry_target_rewinds_rejected_review() {
        let rejected = OrchestratorError::ReviewRejected {
            error_count: 2,
            planned: 1,
        };
        assert_eq!(
            PhaseStateMachine::retry_target(&UpdatePhase::Validation, &rejected, true),
            UpdatePhase::Implementation
        );
        assert_eq!(
            PhaseStateMachine::retry_target(&UpdatePhase::Validation, &rejected, false),
            UpdatePhase::Validation
        );
    }

    #[test]
    fn test_retry_target_in_place_for_other_errors() {
        let timeout = OrchestratorError::PhaseTimeout {
            phase: UpdatePhase::Validation,
            timeout_ms: 1,
        };
        assert_eq!(
            PhaseStateMachine::retry_target(&UpdatePhase::Validation, &timeout, true),
            UpdatePhase::Validation
        );
        assert_eq!(
            PhaseStateMachine::retry_target(&UpdatePhase::Analysis, &timeout, true),
            UpdatePhase::Analysis
        );
    }
}
