use std::fmt;

use crate::services::auth::token::TokenClaims;

/// A single permission scope such as `post:drinks`.
///
/// Compared literally against the token's `permissions` claim: no hierarchy,
/// no wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission(&'static str);

impl Permission {
    pub const GET_DRINKS_DETAIL: Permission = Permission::from_static("get:drinks-detail");
    pub const POST_DRINKS: Permission = Permission::from_static("post:drinks");
    pub const PATCH_DRINKS: Permission = Permission::from_static("patch:drinks");
    pub const DELETE_DRINKS: Permission = Permission::from_static("delete:drinks");

    pub const fn from_static(scope: &'static str) -> Self {
        Self(scope)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// True iff `required` is literally one of the token's permissions.
pub fn has_permission(required: &Permission, claims: &TokenClaims) -> bool {
    claims
        .permissions()
        .is_some_and(|granted| granted.iter().any(|p| p == required.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &[&str]) -> TokenClaims {
        TokenClaims::for_tests(Some(permissions.iter().map(|p| p.to_string()).collect()))
    }

    #[test]
    fn granted_permission_matches() {
        let claims = claims(&["get:drinks-detail", "post:drinks"]);

        assert!(has_permission(&Permission::POST_DRINKS, &claims));
        assert!(has_permission(&Permission::GET_DRINKS_DETAIL, &claims));
        assert!(!has_permission(&Permission::DELETE_DRINKS, &claims));
    }

    #[test]
    fn absent_or_empty_permissions_never_match() {
        let none = TokenClaims::for_tests(None);
        let empty = claims(&[]);

        for required in [Permission::POST_DRINKS, Permission::from_static("anything")] {
            assert!(!has_permission(&required, &none));
            assert!(!has_permission(&required, &empty));
        }
    }

    #[test]
    fn comparison_is_literal() {
        let claims = claims(&["post:drinks", "patch:*", "DELETE:DRINKS"]);

        assert!(!has_permission(&Permission::from_static("post:drink"), &claims));
        assert!(!has_permission(&Permission::PATCH_DRINKS, &claims));
        assert!(!has_permission(&Permission::DELETE_DRINKS, &claims));
        assert!(has_permission(&Permission::from_static("patch:*"), &claims));
    }

    #[test]
    fn displays_as_the_raw_scope() {
        assert_eq!(Permission::POST_DRINKS.to_string(), "post:drinks");
    }
}
