//! Href builders for state links.
//!
//! Links are plain fragments: following one is an ordinary fragment change,
//! so every mounted machine picks it up through the usual notification.

use crate::core::{namespace_key, HashParams, QueryUpdate};
use crate::location::{HistoryMode, Location};
use tracing::debug;

fn link_params(
    params: &HashParams,
    key: &str,
    to: &str,
    data: &QueryUpdate,
    replace: bool,
) -> HashParams {
    let mut params = params.clone();
    if replace {
        params.retain_namespaced();
    }
    params.set(key, to);
    params.apply(data);
    params
}

/// Fragment a link to state `to` of the machine stored under `key` points at.
///
/// # Example
///
/// ```rust
/// use hashstate::core::{HashParams, QueryUpdate};
/// use hashstate::links::state_href;
///
/// let params = HashParams::parse("#?yg-app=step1&tab=2");
/// let href = state_href(&params, "yg-app", "step2", &QueryUpdate::new().set("id", 7), false);
///
/// assert_eq!(href, "#?yg-app=step2&tab=2&id=7");
/// ```
pub fn state_href(
    params: &HashParams,
    key: &str,
    to: &str,
    data: &QueryUpdate,
    replace: bool,
) -> String {
    link_params(params, key, to, data, replace).to_fragment()
}

/// Fragment a link to state `to` of another machine points at. `None` names
/// the default machine.
pub fn external_href(
    params: &HashParams,
    machine: Option<&str>,
    to: &str,
    data: &QueryUpdate,
) -> String {
    link_params(params, &namespace_key(machine), to, data, false).to_fragment()
}

/// Move another machine to `to` with a push entry.
pub fn navigate_external(location: &Location, machine: Option<&str>, to: &str, data: &QueryUpdate) {
    let key = namespace_key(machine);
    let params = link_params(&location.params(), &key, to, data, false);
    debug!(machine = %key, to, "navigating external machine");
    location.write(&params, HistoryMode::Push);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_href_with_replace_drops_page_keys() {
        let params = HashParams::parse("#?yg-app=step1&yg-nav=home&tab=2");

        let href = state_href(&params, "yg-app", "step2", &QueryUpdate::new(), true);

        assert_eq!(href, "#?yg-app=step2&yg-nav=home");
    }

    #[test]
    fn state_href_removes_keys_given_none() {
        let params = HashParams::parse("#?yg-app=step1&tab=2");

        let href = state_href(&params, "yg-app", "step1", &QueryUpdate::new().remove("tab"), false);

        assert_eq!(href, "#?yg-app=step1");
    }

    #[test]
    fn external_href_targets_named_machine() {
        let params = HashParams::parse("#?yg-app=step1");

        let href = external_href(&params, Some("settings"), "profile", &QueryUpdate::new());

        assert_eq!(href, "#?yg-app=step1&yg-settings=profile");
    }

    #[test]
    fn external_href_defaults_to_unnamed_machine() {
        let href = external_href(&HashParams::new(), None, "open", &QueryUpdate::new());

        assert_eq!(href, "#?yg-%23=open");
    }

    #[test]
    fn navigate_external_pushes_entry() {
        let location = Location::with_fragment("#?yg-app=step1");

        navigate_external(&location, Some("settings"), "security", &QueryUpdate::new());

        assert_eq!(location.fragment(), "#?yg-app=step1&yg-settings=security");
        assert_eq!(location.history_len(), 2);
    }
}
