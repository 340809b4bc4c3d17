use crate::error::{BrainError, BrainResult};

/// Separator joining key segments.
pub const KEY_SEPARATOR: char = ':';

/// Reserved segment holding the user directory hash.
const USERS_SEGMENT: &str = "users";

/// Builds and parses fully-qualified store keys.
///
/// Data keys live at `app:data:<logical>`; the user directory hash lives
/// at `app:users`, deliberately outside the data tree so bulk data
/// operations never touch it.
#[derive(Clone, Debug)]
pub struct KeyNamespace {
    app_prefix: String,
    data_prefix: String,
    // Precomputed `<prefix>:` anchors used by key/unkey.
    app_anchor: String,
    data_anchor: String,
    users_key: String,
}

impl KeyNamespace {
    /// Create a namespace. Neither prefix may contain the separator.
    pub fn new(app_prefix: impl Into<String>, data_prefix: impl Into<String>) -> BrainResult<Self> {
        let app_prefix = app_prefix.into();
        let data_prefix = data_prefix.into();
        for (label, value) in [("app prefix", &app_prefix), ("data prefix", &data_prefix)] {
            if value.contains(KEY_SEPARATOR) {
                return Err(BrainError::Config(format!(
                    "{label} {value:?} must not contain {KEY_SEPARATOR:?}"
                )));
            }
        }
        Ok(Self {
            app_anchor: format!("{app_prefix}{KEY_SEPARATOR}"),
            data_anchor: format!("{data_prefix}{KEY_SEPARATOR}"),
            users_key: format!("{app_prefix}{KEY_SEPARATOR}{USERS_SEGMENT}"),
            app_prefix,
            data_prefix,
        })
    }

    pub fn app_prefix(&self) -> &str {
        &self.app_prefix
    }

    pub fn data_prefix(&self) -> &str {
        &self.data_prefix
    }

    /// Fully-qualified data key for a logical key.
    pub fn key(&self, logical: &str) -> String {
        format!("{}{}{}", self.app_anchor, self.data_anchor, logical)
    }

    /// Inverse of [`key`](Self::key): strip a leading `app:` anchor, then
    /// a leading `data:` anchor.
    ///
    /// Each strip is a single prefix-anchored removal, so a logical key
    /// whose own content starts with the data anchor still round-trips
    /// intact: only the one anchor `key` added is removed.
    pub fn unkey(&self, full: &str) -> String {
        let rest = full.strip_prefix(&self.app_anchor).unwrap_or(full);
        let rest = rest.strip_prefix(&self.data_anchor).unwrap_or(rest);
        rest.to_string()
    }

    /// Fixed key of the user directory hash.
    pub fn users_key(&self) -> &str {
        &self.users_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> KeyNamespace {
        KeyNamespace::new("app", "data").unwrap()
    }

    #[test]
    fn key_joins_segments() {
        assert_eq!(ns().key("quotes"), "app:data:quotes");
        assert_eq!(ns().key(""), "app:data:");
    }

    #[test]
    fn unkey_inverts_key() {
        let ns = ns();
        for logical in ["quotes", "a:b:c", "users", ""] {
            assert_eq!(ns.unkey(&ns.key(logical)), logical, "logical {logical:?}");
        }
    }

    #[test]
    fn unkey_is_prefix_anchored() {
        let ns = ns();
        // Mid-string occurrences of the anchors are untouched.
        assert_eq!(ns.unkey("other:app:data:x"), "other:app:data:x");
        assert_eq!(ns.unkey("app:other:data:x"), "other:data:x");
    }

    #[test]
    fn unkey_strips_each_anchor_once() {
        // A logical key that itself starts with `data:` keeps that
        // segment: only the anchor `key` added comes back off.
        let ns = ns();
        assert_eq!(ns.unkey(&ns.key("data:inner")), "data:inner");
        assert_eq!(ns.unkey("app:data:data:data:x"), "data:data:x");
    }

    #[test]
    fn users_key_outside_data_tree() {
        let ns = ns();
        assert_eq!(ns.users_key(), "app:users");
        // No logical key maps onto the users key while the data prefix is
        // non-empty.
        assert_ne!(ns.key("users"), ns.users_key());
        assert!(!ns.users_key().starts_with(&ns.key("")));
    }

    #[test]
    fn prefixes_may_not_contain_separator() {
        assert!(matches!(
            KeyNamespace::new("app:x", "data"),
            Err(BrainError::Config(_))
        ));
        assert!(matches!(
            KeyNamespace::new("app", "da:ta"),
            Err(BrainError::Config(_))
        ));
    }

    #[test]
    fn accessors() {
        let ns = ns();
        assert_eq!(ns.app_prefix(), "app");
        assert_eq!(ns.data_prefix(), "data");
    }
}
