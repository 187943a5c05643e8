//! Permission checks and role-assignment rules.
//!
//! All functions accept anything implementing [`RoleRef`], so a raw role string
//! coming from a session can be checked directly. Unknown roles resolve to
//! [`RoleInfo::UNKNOWN`] and are denied everything.
use serde::Serialize;

use crate::{
    EngineError, ResultEngine,
    roles::{Permission, Role, RoleInfo, RoleRef},
};

pub fn has_permission<R: RoleRef + ?Sized>(role: &R, permission: Permission) -> bool {
    role.role_info().grants(permission)
}

pub fn has_any_permission<R: RoleRef + ?Sized>(role: &R, permissions: &[Permission]) -> bool {
    let info = role.role_info();
    permissions.iter().any(|p| info.grants(*p))
}

/// `true` when every listed permission is granted. An unknown role is refused
/// even for an empty list.
pub fn has_all_permissions<R: RoleRef + ?Sized>(role: &R, permissions: &[Permission]) -> bool {
    let info = role.role_info();
    !info.is_unknown() && permissions.iter().all(|p| info.grants(*p))
}

/// Rank difference between two roles: positive when `a` outranks `b`.
pub fn compare_levels<A, B>(a: &A, b: &B) -> i32
where
    A: RoleRef + ?Sized,
    B: RoleRef + ?Sized,
{
    i32::from(a.role_info().rank) - i32::from(b.role_info().rank)
}

/// Outcome of a role-assignment check. `reason` is set only when denied and is
/// meant to be shown verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleChangeDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl RoleChangeDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    /// Converts a denial into [`EngineError::PermissionDenied`].
    pub fn into_result(self) -> ResultEngine<()> {
        match self.reason {
            Some(reason) if !self.allowed => Err(EngineError::PermissionDenied(reason)),
            _ => Ok(()),
        }
    }
}

/// Decides whether `acting` may give `target` to a user.
pub fn can_assign_role<A, T>(acting: &A, target: &T) -> RoleChangeDecision
where
    A: RoleRef + ?Sized,
    T: RoleRef + ?Sized,
{
    let acting = acting.role_info();
    let target = target.role_info();
    let decision = decide(acting, target);
    if let Some(reason) = &decision.reason {
        tracing::debug!(
            acting = acting.display_name,
            target = target.display_name,
            "role change denied: {reason}"
        );
    }
    decision
}

fn decide(acting: &RoleInfo, target: &RoleInfo) -> RoleChangeDecision {
    if !acting.grants(Permission::ManageRoles) {
        return RoleChangeDecision::deny(format!(
            "{} role does not have permission to manage roles",
            acting.display_name
        ));
    }
    if target.is_unknown() {
        return RoleChangeDecision::deny("cannot assign an unknown role".to_string());
    }
    if target.rank > acting.rank {
        return RoleChangeDecision::deny(format!(
            "insufficient rank: {} ({}) cannot assign {} ({})",
            acting.display_name, acting.rank, target.display_name, target.rank
        ));
    }
    if target.role == Some(Role::Owner) && acting.role != Some(Role::Owner) {
        return RoleChangeDecision::deny("only an owner can assign the owner role".to_string());
    }
    RoleChangeDecision::allow()
}
