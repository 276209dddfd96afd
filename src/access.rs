use crate::scheduler::SchedError;

/// Consultation, prise et modification de rendez-vous.
pub const LEVEL_STAFF: u8 = 1;
/// Gestion des médecins et de leurs horaires.
pub const LEVEL_ADMIN: u8 = 2;

/// Contrôle d'accès fourni par l'hôte (authentification hors de cette lib).
pub trait PermissionGate {
    fn has_permission(&self, minimum_level: u8) -> bool;
}

/// Niveau fixe, p. ex. passé en argument de la CLI.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StaticLevel(pub u8);

impl PermissionGate for StaticLevel {
    fn has_permission(&self, minimum_level: u8) -> bool {
        self.0 >= minimum_level
    }
}

pub fn require(gate: &dyn PermissionGate, minimum_level: u8) -> Result<(), SchedError> {
    if gate.has_permission(minimum_level) {
        Ok(())
    } else {
        tracing::warn!(required = minimum_level, "permission denied");
        Err(SchedError::PermissionDenied {
            required: minimum_level,
        })
    }
}
