use std::collections::BTreeMap;
use std::fmt;

use sprunje_core::DynamicValue;

/// The authenticated caller of a request, extracted by the auth middleware
/// and placed into request extensions. Permission checks and ownership
/// policies read from this (§4.3, §5).
#[derive(Debug, Clone)]
pub struct Principal {
    /// The authenticated caller's identifier.
    pub id: DynamicValue,
    /// Permission slugs granted to this caller (e.g. "crud6.users.read").
    pub permissions: Vec<String>,
    /// Additional attributes from the authentication source.
    pub attributes: BTreeMap<String, String>,
}

impl Principal {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Decides whether a principal may act on a specific record beyond the
/// coarse-grained permission check, e.g. "owns this row" (§5).
pub trait RecordAccessPolicy: Send + Sync {
    fn allows(&self, principal: &Principal, owner_field: Option<&DynamicValue>) -> bool;
}

/// Grants access only when the record's owner field equals the principal's id.
pub struct OwnershipBasedPolicy;

impl RecordAccessPolicy for OwnershipBasedPolicy {
    fn allows(&self, principal: &Principal, owner_field: Option<&DynamicValue>) -> bool {
        owner_field.is_some_and(|owner| owner == &principal.id)
    }
}

/// Errors that can occur while authenticating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials { reason: String },
    Forbidden { permission: String },
    Internal { message: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "no authentication credentials provided"),
            Self::InvalidCredentials { reason } => write!(f, "invalid credentials: {reason}"),
            Self::Forbidden { permission } => write!(f, "missing required permission '{permission}'"),
            Self::Internal { message } => write!(f, "authentication error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_principal(permissions: Vec<&str>) -> Principal {
        Principal {
            id: DynamicValue::Integer(1),
            permissions: permissions.into_iter().map(String::from).collect(),
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn has_permission_returns_true_for_matching_permission() {
        let principal = make_principal(vec!["crud6.users.read"]);
        assert!(principal.has_permission("crud6.users.read"));
    }

    #[test]
    fn has_permission_returns_false_for_missing_permission() {
        let principal = make_principal(vec!["crud6.users.read"]);
        assert!(!principal.has_permission("crud6.users.delete"));
    }

    #[test]
    fn ownership_policy_allows_matching_owner() {
        let principal = make_principal(vec![]);
        let policy = OwnershipBasedPolicy;
        assert!(policy.allows(&principal, Some(&DynamicValue::Integer(1))));
    }

    #[test]
    fn ownership_policy_rejects_mismatched_owner() {
        let principal = make_principal(vec![]);
        let policy = OwnershipBasedPolicy;
        assert!(!policy.allows(&principal, Some(&DynamicValue::Integer(2))));
    }

    #[test]
    fn ownership_policy_rejects_absent_owner() {
        let principal = make_principal(vec![]);
        let policy = OwnershipBasedPolicy;
        assert!(!policy.allows(&principal, None));
    }

    #[test]
    fn auth_error_display_forbidden() {
        let err = AuthError::Forbidden {
            permission: "crud6.users.delete".into(),
        };
        assert!(err.to_string().contains("crud6.users.delete"));
    }

    #[test]
    fn auth_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(AuthError::MissingCredentials);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn principal_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Principal>();
    }
}
