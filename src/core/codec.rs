//! Fragment codec.
//!
//! A fragment carries state only when it starts with the `#?` marker; the
//! remainder is an ordinary `application/x-www-form-urlencoded` query string.
//! Anything else decodes to an empty parameter set.

use super::namespace::is_namespaced;
use super::query::QueryUpdate;

/// Marker that opens a state-carrying fragment.
pub const FRAGMENT_MARKER: &str = "#?";

/// Ordered set of unique fragment parameters.
///
/// Keys keep the position of their first occurrence; when a fragment repeats a
/// key, the last value wins.
///
/// # Example
///
/// ```rust
/// use hashstate::core::HashParams;
///
/// let params = HashParams::parse("#?yg-app=step1&userId=123&yg-settings=profile");
/// assert_eq!(params.get("yg-app"), Some("step1"));
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.to_fragment(), "#?yg-app=step1&userId=123&yg-settings=profile");
///
/// assert!(HashParams::parse("#section-2").is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashParams {
    pairs: Vec<(String, String)>,
}

impl HashParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Decode a fragment such as `#?a=1&b=2`.
    pub fn parse(fragment: &str) -> Self {
        match fragment.strip_prefix(FRAGMENT_MARKER) {
            Some(query) => Self::parse_query(query),
            None => Self::new(),
        }
    }

    /// Decode a bare query string (no marker).
    pub fn parse_query(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.pairs[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Set `key` to `value`, keeping the key's position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.pairs[i].1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.pairs.remove(i).1)
    }

    /// Keep only the pairs for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.pairs.retain(|(key, value)| keep(key, value));
    }

    /// Drop every page-level key, keeping all machines' state keys.
    pub fn retain_namespaced(&mut self) {
        self.retain(|key, _| is_namespaced(key));
    }

    /// Apply an update: `None` deletes a key, any value sets its string form.
    pub fn apply(&mut self, update: &QueryUpdate) {
        for (key, value) in update.iter() {
            match value {
                Some(value) => self.set(key, value.to_string()),
                None => {
                    self.remove(key);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as a bare query string (no marker).
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Encode as a fragment. An empty set encodes to the empty fragment.
    pub fn to_fragment(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{FRAGMENT_MARKER}{}", self.to_query_string())
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.pairs.iter().position(|(k, _)| k == key)
    }
}

impl<K, V> FromIterator<(K, V)> for HashParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_marked_fragment() {
        let params = HashParams::parse("#?yg-test=page1&count=5&name=test");

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("yg-test"), Some("page1"));
        assert_eq!(params.get("count"), Some("5"));
        assert_eq!(params.get("name"), Some("test"));
    }

    #[test]
    fn unmarked_fragment_carries_no_state() {
        assert!(HashParams::parse("").is_empty());
        assert!(HashParams::parse("#").is_empty());
        assert!(HashParams::parse("#yg-test=page1").is_empty());
        assert!(HashParams::parse("?yg-test=page1").is_empty());
        assert!(HashParams::parse("not-a-valid-hash").is_empty());
    }

    #[test]
    fn percent_and_plus_are_decoded() {
        let params = HashParams::parse("#?greeting=hello%20world&q=a+b&amp=%26");

        assert_eq!(params.get("greeting"), Some("hello world"));
        assert_eq!(params.get("q"), Some("a b"));
        assert_eq!(params.get("amp"), Some("&"));
    }

    #[test]
    fn last_duplicate_wins_at_first_position() {
        let params = HashParams::parse("#?a=1&b=2&a=3");

        assert_eq!(params.get("a"), Some("3"));
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn key_without_value_is_empty_string() {
        let params = HashParams::parse("#?flag&x=1");
        assert_eq!(params.get("flag"), Some(""));
    }

    #[test]
    fn empty_set_encodes_to_empty_fragment() {
        assert_eq!(HashParams::new().to_fragment(), "");
    }

    #[test]
    fn special_characters_are_encoded() {
        let mut params = HashParams::new();
        params.set("name", "a b&c=d");

        assert_eq!(params.to_fragment(), "#?name=a+b%26c%3Dd");
        assert_eq!(HashParams::parse(&params.to_fragment()), params);
    }

    #[test]
    fn set_keeps_existing_position() {
        let mut params = HashParams::parse("#?yg-a=one&x=1&yg-b=two");
        params.set("yg-a", "three");

        assert_eq!(params.to_fragment(), "#?yg-a=three&x=1&yg-b=two");
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut params = HashParams::parse("#?x=1&y=2");

        assert_eq!(params.remove("x"), Some("1".to_string()));
        assert_eq!(params.remove("x"), None);
        assert_eq!(params.to_fragment(), "#?y=2");
    }

    #[test]
    fn retain_namespaced_drops_page_data() {
        let mut params = HashParams::parse("#?yg-m=S1&foo=bar&yg-n=S2");
        params.retain_namespaced();

        assert_eq!(params.to_fragment(), "#?yg-m=S1&yg-n=S2");
    }

    #[test]
    fn apply_sets_and_deletes() {
        let mut params = HashParams::parse("#?flarn=1234&keep=yes");
        let update = QueryUpdate::new().remove("flarn").set("count", 42);
        params.apply(&update);

        assert_eq!(params.to_fragment(), "#?keep=yes&count=42");
    }
}
