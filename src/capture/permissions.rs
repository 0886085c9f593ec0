use std::collections::HashSet;

use serde::Serialize;

/// Platform permissions the preview depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    Camera,
    RecordAudio,
}

/// Everything that must be granted before capture may start.
pub const REQUIRED_PERMISSIONS: &[Permission] = &[Permission::Camera, Permission::RecordAudio];

/// Supplied by the host to report what the user has granted.
///
/// The core never asks the platform directly; requesting permissions and
/// showing rationale UI stay with the host.
pub trait PermissionProvider: Send + Sync {
    fn is_granted(&self, permission: Permission) -> bool;
}

/// Required permissions the provider reports as not granted, in
/// declaration order.
pub fn missing_permissions(provider: &dyn PermissionProvider) -> Vec<Permission> {
    REQUIRED_PERMISSIONS
        .iter()
        .copied()
        .filter(|p| !provider.is_granted(*p))
        .collect()
}

/// Fixed set of granted permissions, for hosts without a runtime
/// permission model and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<Permission>,
}

impl StaticPermissions {
    pub fn all_granted() -> Self {
        Self {
            granted: REQUIRED_PERMISSIONS.iter().copied().collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn granting(permissions: &[Permission]) -> Self {
        Self {
            granted: permissions.iter().copied().collect(),
        }
    }
}

impl PermissionProvider for StaticPermissions {
    fn is_granted(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
