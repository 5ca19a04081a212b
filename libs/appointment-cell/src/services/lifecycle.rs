// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Appointment state machine: `Upcoming` is the only non-terminal state.
/// Transfer keeps the status at `Upcoming` and is modelled as a guard,
/// not a state.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed. Re-asserting
    /// `Upcoming` on an upcoming appointment is a no-op.
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if current_status == AppointmentStatus::Upcoming && new_status == AppointmentStatus::Upcoming {
            return Ok(());
        }

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Upcoming => vec![
                AppointmentStatus::Done,
                AppointmentStatus::Canceled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Done => vec![],
            AppointmentStatus::Canceled => vec![],
        }
    }

    /// Rescheduling and transfer only apply to upcoming appointments.
    pub fn ensure_reschedulable(&self, current_status: AppointmentStatus) -> Result<(), AppointmentError> {
        if current_status.is_terminal() {
            warn!("Attempt to move a {} appointment", current_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: AppointmentStatus::Upcoming,
            });
        }
        Ok(())
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
