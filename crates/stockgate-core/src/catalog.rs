//! Static permission catalog.
//!
//! The catalog is the single source of truth for valid permission
//! tokens. It is built once at process start and injected into the
//! stores that validate permission assignments — there is no global
//! mutable state.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{StockgateError, StockgateResult};

/// Permission token granting unconditional allow (reserved for the
/// `super_admin` role).
pub const WILDCARD: &str = "*";

/// Reserved role name with implicit wildcard authority. Cannot be
/// deleted or renamed.
pub const SUPER_ADMIN: &str = "super_admin";

/// Reserved role name for bounded administrators. Its authority comes
/// entirely from its assigned permission set; the Hierarchy Guard is
/// what protects it from same-rank edits.
pub const SUB_ADMIN: &str = "sub_admin";

/// Immutable registry of valid permission tokens, grouped by resource
/// domain. Domains exist for presentation and validation only; the
/// authorization engine treats tokens as flat strings.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    groups: BTreeMap<&'static str, Vec<String>>,
    flat: BTreeSet<String>,
}

impl PermissionCatalog {
    /// The built-in catalog: product, user and role management plus
    /// the admin wildcard.
    pub fn builtin() -> Self {
        Self::from_groups([
            (
                "PRODUCT",
                vec![
                    "product.read",
                    "product.create",
                    "product.update",
                    "product.delete",
                ],
            ),
            (
                "USER",
                vec![
                    "user.read",
                    "user.create",
                    "user.update",
                    "user.delete",
                    "user.manage_permissions",
                ],
            ),
            ("ROLE", vec!["role.read", "role.manage"]),
            ("ADMIN", vec![WILDCARD]),
        ])
    }

    fn from_groups<const N: usize>(groups: [(&'static str, Vec<&str>); N]) -> Self {
        let groups: BTreeMap<&'static str, Vec<String>> = groups
            .into_iter()
            .map(|(domain, tokens)| (domain, tokens.into_iter().map(String::from).collect()))
            .collect();
        let flat = groups.values().flatten().cloned().collect();
        Self { groups, flat }
    }

    /// Whether `token` is a known permission (the wildcard included).
    pub fn is_valid(&self, token: &str) -> bool {
        self.flat.contains(token)
    }

    /// The flattened set of every valid token.
    pub fn all_tokens(&self) -> &BTreeSet<String> {
        &self.flat
    }

    /// Tokens grouped by resource domain.
    pub fn groups(&self) -> &BTreeMap<&'static str, Vec<String>> {
        &self.groups
    }

    /// All tokens belonging to one domain, or an empty slice for an
    /// unknown domain.
    pub fn domain_tokens(&self, domain: &str) -> &[String] {
        self.groups.get(domain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Validate a set of tokens for assignment to a role or user
    /// override, failing on the first unknown token.
    pub fn validate<'a, I>(&self, tokens: I) -> StockgateResult<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        for token in tokens {
            if !self.is_valid(token) {
                return Err(StockgateError::validation(format!(
                    "unknown permission token: {token}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tokens_are_valid() {
        let catalog = PermissionCatalog::builtin();
        assert!(catalog.is_valid("product.create"));
        assert!(catalog.is_valid("user.manage_permissions"));
        assert!(catalog.is_valid("role.manage"));
        assert!(catalog.is_valid(WILDCARD));
    }

    #[test]
    fn unknown_token_is_invalid() {
        let catalog = PermissionCatalog::builtin();
        assert!(!catalog.is_valid("warehouse.burn_down"));
        assert!(!catalog.is_valid(""));
    }

    #[test]
    fn validate_names_the_offending_token() {
        let catalog = PermissionCatalog::builtin();
        let tokens = vec!["product.read".to_string(), "bogus.token".to_string()];
        let err = catalog.validate(&tokens).unwrap_err();
        match err {
            StockgateError::Validation { message } => {
                assert!(message.contains("bogus.token"), "got: {message}");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn groups_cover_the_flat_set() {
        let catalog = PermissionCatalog::builtin();
        let from_groups: usize = catalog.groups().values().map(Vec::len).sum();
        assert_eq!(from_groups, catalog.all_tokens().len());
        assert_eq!(catalog.domain_tokens("PRODUCT").len(), 4);
        assert!(catalog.domain_tokens("NOPE").is_empty());
    }
}
