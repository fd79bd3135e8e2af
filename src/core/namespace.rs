//! Machine namespacing.
//!
//! Every machine stores its current state under a reserved fragment key derived
//! from its name. Keys carrying the reserved prefix belong to machines; all
//! other keys are page-level data shared by every machine.

/// Prefix reserved for machine state keys.
pub const NAMESPACE_PREFIX: &str = "yg-";

/// Name used when a machine is mounted without one.
pub const DEFAULT_MACHINE_NAME: &str = "#";

/// Derive the fragment key holding a machine's current state.
///
/// # Example
///
/// ```rust
/// use hashstate::core::namespace_key;
///
/// assert_eq!(namespace_key(Some("app")), "yg-app");
/// assert_eq!(namespace_key(None), "yg-#");
/// ```
pub fn namespace_key(machine_name: Option<&str>) -> String {
    format!(
        "{NAMESPACE_PREFIX}{}",
        machine_name.unwrap_or(DEFAULT_MACHINE_NAME)
    )
}

/// Check whether a fragment key is reserved for a machine.
pub fn is_namespaced(key: &str) -> bool {
    key.starts_with(NAMESPACE_PREFIX)
}
