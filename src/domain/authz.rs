//! Authorization guard.
//!
//! Every guarded operation funnels through [`authorize`]: a pure decision over
//! the caller's identity, the roles the operation accepts and the owner of the
//! resource it touches. Nothing here reads storage; callers fetch the resource
//! first and hand over its owner id.

use super::{Identity, Role, UserId};

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const STORE_OWNER_ONLY: &[Role] = &[Role::StoreOwner];

/// Which roles an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated identity.
    Authenticated,
    OneOf(&'static [Role]),
}

impl RoleRequirement {
    fn permits(self, role: Role) -> bool {
        match self {
            Self::Authenticated => true,
            Self::OneOf(roles) => roles.contains(&role),
        }
    }
}

/// The owning user of the resource an operation mutates or reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Store(UserId),
    Rating(UserId),
}

impl Ownership {
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        match self {
            Self::Store(id) | Self::Rating(id) => *id,
        }
    }

    const fn noun(&self) -> &'static str {
        match self {
            Self::Store(_) => "stores",
            Self::Rating(_) => "ratings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    RoleNotPermitted { role: Role },
    NotOwner { resource: &'static str },
}

impl DenyReason {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Unauthenticated => "Authentication required".to_string(),
            Self::RoleNotPermitted { role } => {
                format!("Access denied for role '{role}'")
            }
            Self::NotOwner { resource } => format!("You can only manage your own {resource}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether `identity` may perform an operation.
///
/// Checks run in a fixed order: authentication, then role, then ownership.
/// An identity with the right role but the wrong id is still denied; no role,
/// admin included, overrides ownership.
#[must_use]
pub fn authorize(
    identity: Option<&Identity>,
    roles: RoleRequirement,
    ownership: Option<Ownership>,
) -> Decision {
    let Some(identity) = identity else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if !roles.permits(identity.role) {
        return Decision::Deny(DenyReason::RoleNotPermitted {
            role: identity.role,
        });
    }

    if let Some(ownership) = ownership {
        if identity.id != ownership.owner_id() {
            return Decision::Deny(DenyReason::NotOwner {
                resource: ownership.noun(),
            });
        }
    }

    Decision::Allow
}

/// Like [`authorize`], but hands back the identity on success so callers can
/// use it as the acting user.
pub fn require(
    identity: Option<&Identity>,
    roles: RoleRequirement,
    ownership: Option<Ownership>,
) -> Result<&Identity, DenyReason> {
    match (authorize(identity, roles, ownership), identity) {
        (Decision::Allow, Some(identity)) => Ok(identity),
        (Decision::Deny(reason), _) => Err(reason),
        (Decision::Allow, None) => Err(DenyReason::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: i32, role: Role) -> Identity {
        Identity {
            id: UserId::new(id),
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        let decision = authorize(None, RoleRequirement::Authenticated, None);
        assert_eq!(decision, Decision::Deny(DenyReason::Unauthenticated));

        let decision = authorize(
            None,
            RoleRequirement::OneOf(ADMIN_ONLY),
            Some(Ownership::Store(UserId::new(1))),
        );
        assert_eq!(decision, Decision::Deny(DenyReason::Unauthenticated));
    }

    #[test]
    fn test_role_outside_requirement_is_forbidden() {
        let user = identity(1, Role::User);
        let decision = authorize(Some(&user), RoleRequirement::OneOf(ADMIN_ONLY), None);
        assert_eq!(
            decision,
            Decision::Deny(DenyReason::RoleNotPermitted { role: Role::User })
        );

        let admin = identity(2, Role::Admin);
        let decision = authorize(Some(&admin), RoleRequirement::OneOf(STORE_OWNER_ONLY), None);
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_store_owner_cannot_touch_another_owners_store() {
        let owner = identity(3, Role::StoreOwner);
        let decision = authorize(
            Some(&owner),
            RoleRequirement::Authenticated,
            Some(Ownership::Store(UserId::new(4))),
        );
        assert_eq!(
            decision,
            Decision::Deny(DenyReason::NotOwner { resource: "stores" })
        );

        let decision = authorize(
            Some(&owner),
            RoleRequirement::Authenticated,
            Some(Ownership::Store(UserId::new(3))),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_admin_does_not_bypass_ownership() {
        let admin = identity(9, Role::Admin);
        assert_eq!(
            authorize(
                Some(&admin),
                RoleRequirement::Authenticated,
                Some(Ownership::Store(UserId::new(1))),
            ),
            Decision::Deny(DenyReason::NotOwner { resource: "stores" })
        );
        assert_eq!(
            authorize(
                Some(&admin),
                RoleRequirement::Authenticated,
                Some(Ownership::Rating(UserId::new(1))),
            ),
            Decision::Deny(DenyReason::NotOwner { resource: "ratings" })
        );
    }

    #[test]
    fn test_rating_is_strictly_self_owned() {
        for role in Role::ALL {
            let caller = identity(5, role);
            let foreign = Some(Ownership::Rating(UserId::new(6)));
            assert!(!authorize(Some(&caller), RoleRequirement::Authenticated, foreign).is_allowed());

            let own = Some(Ownership::Rating(UserId::new(5)));
            assert!(authorize(Some(&caller), RoleRequirement::Authenticated, own).is_allowed());
        }
    }

    #[test]
    fn test_require_returns_identity() {
        let user = identity(11, Role::User);
        let acting = require(Some(&user), RoleRequirement::Authenticated, None).unwrap();
        assert_eq!(acting.id, UserId::new(11));

        assert_eq!(
            require(None, RoleRequirement::Authenticated, None).unwrap_err(),
            DenyReason::Unauthenticated
        );
    }
}
