//! Secret vault collaborator

/// Resolves opaque secret references to their plaintext values.
///
/// Absence of a value is not an error; callers treat the reference itself
/// as the literal secret in that case.
#[cfg_attr(test, mockall::automock)]
pub trait SecretVault: Send + Sync {
    fn string_secret(&self, reference: &str) -> Option<String>;
}

/// Resolve `reference` and hand the plaintext to `f`.
///
/// The resolved value lives exactly as long as the call: it is dropped as
/// soon as `f` returns, on every path including unwinding.
pub fn with_string_secret<T>(
    vault: &dyn SecretVault,
    reference: &str,
    f: impl FnOnce(Option<&str>) -> T,
) -> T {
    let secret = vault.string_secret(reference);
    f(secret.as_deref())
}
