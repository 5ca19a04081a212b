//! Who may do what to an appointment.
//!
//! Every operation is authorised once, by looking the caller's role and
//! relationship to the appointment up in [`PERMISSIONS`].

use tracing::warn;

use shared_models::auth::{CallerIdentity, Role};

use crate::models::{AppointmentError, AppointmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    View,
    Update,
    Cancel,
    SetStatus(AppointmentStatus),
    Transfer,
}

/// How the caller relates to the appointment being acted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    pub is_patient: bool,
    pub is_doctor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Any,
    OwnAsPatient,
    OwnAsDoctor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionPattern {
    Exactly(Action),
    AnyStatus,
}

impl ActionPattern {
    fn matches(&self, action: Action) -> bool {
        match self {
            ActionPattern::Exactly(expected) => *expected == action,
            ActionPattern::AnyStatus => matches!(action, Action::SetStatus(_)),
        }
    }
}

struct Permission {
    role: Role,
    action: ActionPattern,
    scope: Scope,
}

const fn allow(role: Role, action: ActionPattern, scope: Scope) -> Permission {
    Permission { role, action, scope }
}

const PERMISSIONS: &[Permission] = &[
    allow(Role::Patient, ActionPattern::Exactly(Action::Create), Scope::Any),

    allow(Role::Admin, ActionPattern::Exactly(Action::View), Scope::Any),
    allow(Role::Patient, ActionPattern::Exactly(Action::View), Scope::OwnAsPatient),
    allow(Role::Doctor, ActionPattern::Exactly(Action::View), Scope::OwnAsDoctor),

    allow(Role::Admin, ActionPattern::Exactly(Action::Update), Scope::Any),
    allow(Role::Patient, ActionPattern::Exactly(Action::Update), Scope::OwnAsPatient),

    allow(Role::Admin, ActionPattern::Exactly(Action::Cancel), Scope::Any),
    allow(Role::Patient, ActionPattern::Exactly(Action::Cancel), Scope::OwnAsPatient),
    allow(Role::Doctor, ActionPattern::Exactly(Action::Cancel), Scope::OwnAsDoctor),

    allow(Role::Admin, ActionPattern::AnyStatus, Scope::Any),
    allow(Role::Doctor, ActionPattern::AnyStatus, Scope::OwnAsDoctor),
    allow(Role::Patient, ActionPattern::Exactly(Action::SetStatus(AppointmentStatus::Canceled)), Scope::OwnAsPatient),

    allow(Role::Admin, ActionPattern::Exactly(Action::Transfer), Scope::Any),
    allow(Role::Doctor, ActionPattern::Exactly(Action::Transfer), Scope::OwnAsDoctor),
];

impl Scope {
    fn admits(&self, ownership: Ownership) -> bool {
        match self {
            Scope::Any => true,
            Scope::OwnAsPatient => ownership.is_patient,
            Scope::OwnAsDoctor => ownership.is_doctor,
        }
    }
}

pub fn is_permitted(role: Role, action: Action, ownership: Ownership) -> bool {
    PERMISSIONS.iter().any(|permission| {
        permission.role == role && permission.action.matches(action) && permission.scope.admits(ownership)
    })
}

pub fn authorize(caller: &CallerIdentity, action: Action, ownership: Ownership) -> Result<(), AppointmentError> {
    if is_permitted(caller.role, action, ownership) {
        return Ok(());
    }

    warn!("{} {} denied {:?} (ownership {:?})", caller.role, caller.user_id, action, ownership);
    Err(AppointmentError::Unauthorized(describe_denial(caller.role, action)))
}

fn describe_denial(role: Role, action: Action) -> String {
    match (role, action) {
        (_, Action::Create) => "Only patients can create appointments".to_string(),
        (Role::Patient, Action::SetStatus(_)) => "Patients may only cancel their own appointments".to_string(),
        (_, Action::Transfer) => "Only an admin or the assigned doctor can transfer this appointment".to_string(),
        _ => format!("{} may not perform {:?} on this appointment", role, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    const NONE: Ownership = Ownership { is_patient: false, is_doctor: false };
    const PATIENT: Ownership = Ownership { is_patient: true, is_doctor: false };
    const DOCTOR: Ownership = Ownership { is_patient: false, is_doctor: true };

    #[test]
    fn test_only_patients_create() {
        assert!(is_permitted(Role::Patient, Action::Create, NONE));
        assert!(!is_permitted(Role::Doctor, Action::Create, NONE));
        assert!(!is_permitted(Role::Admin, Action::Create, NONE));
    }

    #[test]
    fn test_admin_sets_any_status() {
        for status in [Upcoming, Done, Canceled] {
            assert!(is_permitted(Role::Admin, Action::SetStatus(status), NONE));
        }
    }

    #[test]
    fn test_doctor_status_updates_require_ownership() {
        assert!(is_permitted(Role::Doctor, Action::SetStatus(Done), DOCTOR));
        assert!(!is_permitted(Role::Doctor, Action::SetStatus(Done), NONE));
    }

    #[test]
    fn test_patient_may_only_cancel_own() {
        assert!(is_permitted(Role::Patient, Action::SetStatus(Canceled), PATIENT));
        assert!(!is_permitted(Role::Patient, Action::SetStatus(Done), PATIENT));
        assert!(!is_permitted(Role::Patient, Action::SetStatus(Canceled), NONE));
        assert!(is_permitted(Role::Patient, Action::Cancel, PATIENT));
        assert!(!is_permitted(Role::Patient, Action::Cancel, NONE));
    }

    #[test]
    fn test_transfer_is_admin_or_owning_doctor() {
        assert!(is_permitted(Role::Admin, Action::Transfer, NONE));
        assert!(is_permitted(Role::Doctor, Action::Transfer, DOCTOR));
        assert!(!is_permitted(Role::Doctor, Action::Transfer, NONE));
        assert!(!is_permitted(Role::Patient, Action::Transfer, PATIENT));
    }

    #[test]
    fn test_update_is_admin_or_owning_patient() {
        assert!(is_permitted(Role::Admin, Action::Update, NONE));
        assert!(is_permitted(Role::Patient, Action::Update, PATIENT));
        assert!(!is_permitted(Role::Doctor, Action::Update, DOCTOR));
    }

    #[test]
    fn test_denial_is_an_authorization_error() {
        let caller = CallerIdentity::new(uuid::Uuid::new_v4(), Role::Doctor);
        assert!(matches!(
            authorize(&caller, Action::Create, NONE),
            Err(AppointmentError::Unauthorized(_))
        ));
    }
}
