//! Template fields derived from a file name.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::case;
use crate::config::{AUTHOR_KEY, ConfigSource, EMAIL_KEY, LINK_KEY};

/// Locale-style timestamp, e.g. `10/15/2026, 3:04:05 PM`.
const DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Memo slots for every name-derived view. An empty cell means "not computed
/// since the last assignment", which is distinct from a computed empty string.
#[derive(Debug, Default)]
struct NameCache {
    camel: OnceCell<String>,
    pascal: OnceCell<String>,
    snake: OnceCell<String>,
    kebab: OnceCell<String>,
    lower_dot: OnceCell<String>,
    upper: OnceCell<String>,
}

/// A file name and the case-converted views templates refer to.
///
/// Derived views are computed on first read and memoized until [`Fields::set_name`]
/// is called again. Author metadata is read from configuration on every call.
pub struct Fields {
    name: String,
    cache: NameCache,
    config: Arc<dyn ConfigSource>,
}

impl Fields {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self {
            name: String::new(),
            cache: NameCache::default(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the name and drop every memoized view, even if `name` is
    /// unchanged.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.cache = NameCache::default();
    }

    pub fn camel_case_name(&self) -> &str {
        self.cache.camel.get_or_init(|| case::camel_case(&self.name))
    }

    pub fn pascal_case_name(&self) -> &str {
        self.cache
            .pascal
            .get_or_init(|| case::upper_first(self.camel_case_name()))
    }

    pub fn snake_case_name(&self) -> &str {
        self.cache.snake.get_or_init(|| case::snake_case(&self.name))
    }

    pub fn kebab_case_name(&self) -> &str {
        self.cache.kebab.get_or_init(|| case::kebab_case(&self.name))
    }

    pub fn lower_dot_case_name(&self) -> &str {
        self.cache
            .lower_dot
            .get_or_init(|| case::lower_dot_case(self.snake_case_name()))
    }

    pub fn upper_case_name(&self) -> &str {
        self.cache.upper.get_or_init(|| case::upper_case(&self.name))
    }

    /// Placeholder that tells the renderer to drop the whole line.
    pub fn omit_line(&self) -> Option<&str> {
        None
    }

    pub fn date(&self) -> String {
        chrono::Local::now().format(DATE_FORMAT).to_string()
    }

    pub fn author(&self) -> Option<String> {
        self.config.get(AUTHOR_KEY)
    }

    pub fn email(&self) -> Option<String> {
        self.config.get(EMAIL_KEY)
    }

    pub fn link(&self) -> Option<String> {
        self.config.get(LINK_KEY)
    }

    /// Read every field once, keyed by its template placeholder name.
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            name: self.name.clone(),
            camel_case_name: self.camel_case_name().to_owned(),
            pascal_case_name: self.pascal_case_name().to_owned(),
            snake_case_name: self.snake_case_name().to_owned(),
            kebab_case_name: self.kebab_case_name().to_owned(),
            lower_dot_case_name: self.lower_dot_case_name().to_owned(),
            upper_case_name: self.upper_case_name().to_owned(),
            omit_line: None,
            date: self.date(),
            author: self.author(),
            email: self.email(),
            link: self.link(),
        }
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fields")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub name: String,
    pub camel_case_name: String,
    pub pascal_case_name: String,
    pub snake_case_name: String,
    pub kebab_case_name: String,
    pub lower_dot_case_name: String,
    pub upper_case_name: String,
    pub omit_line: Option<String>,
    pub date: String,
    pub author: Option<String>,
    pub email: Option<String>,
    pub link: Option<String>,
}

impl FieldSnapshot {
    /// Placeholder name and value pairs, in template order.
    pub fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("name", Some(self.name.as_str())),
            ("camelCaseName", Some(self.camel_case_name.as_str())),
            ("pascalCaseName", Some(self.pascal_case_name.as_str())),
            ("snakeCaseName", Some(self.snake_case_name.as_str())),
            ("kebabCaseName", Some(self.kebab_case_name.as_str())),
            ("lowerDotCaseName", Some(self.lower_dot_case_name.as_str())),
            ("upperCaseName", Some(self.upper_case_name.as_str())),
            ("omitLine", self.omit_line.as_deref()),
            ("date", Some(self.date.as_str())),
            ("author", self.author.as_deref()),
            ("email", self.email.as_deref()),
            ("link", self.link.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use std::sync::Mutex;

    fn fields_named(name: &str) -> Fields {
        let mut fields = Fields::new(Arc::new(MapConfig::new()));
        fields.set_name(name);
        fields
    }

    /// Settings whose values can change between reads.
    struct SharedConfig(Mutex<MapConfig>);

    impl ConfigSource for SharedConfig {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key)
        }
    }

    #[test]
    fn derives_every_case_from_name() {
        let fields = fields_named("my-cool_file");
        assert_eq!(fields.name(), "my-cool_file");
        assert_eq!(fields.camel_case_name(), "myCoolFile");
        assert_eq!(fields.pascal_case_name(), "MyCoolFile");
        assert_eq!(fields.snake_case_name(), "my_cool_file");
        assert_eq!(fields.kebab_case_name(), "my-cool-file");
        assert_eq!(fields.lower_dot_case_name(), "my.cool.file");
        assert_eq!(fields.upper_case_name(), "MY-COOL_FILE");
        assert_eq!(fields.omit_line(), None);
    }

    #[test]
    fn derived_views_stay_consistent_with_each_other() {
        for name in ["fooBar", "XMLHttpRequest", "a b c", "user.service", "x", ""] {
            let fields = fields_named(name);
            assert_eq!(
                fields.pascal_case_name(),
                case::upper_first(fields.camel_case_name())
            );
            assert_eq!(
                fields.lower_dot_case_name(),
                fields.snake_case_name().replace('_', ".")
            );
            assert_eq!(fields.upper_case_name(), name.to_uppercase());
        }
    }

    #[test]
    fn computed_once_until_name_changes() {
        let mut fields = fields_named("first-name");
        assert!(fields.cache.snake.get().is_none());
        let first = fields.snake_case_name().as_ptr();
        let again = fields.snake_case_name().as_ptr();
        assert_eq!(first, again);

        fields.set_name("second-name");
        assert!(fields.cache.snake.get().is_none());
        assert_eq!(fields.snake_case_name(), "second_name");
        assert_eq!(fields.lower_dot_case_name(), "second.name");
    }

    #[test]
    fn reassigning_same_name_still_resets() {
        let mut fields = fields_named("same");
        fields.camel_case_name();
        fields.upper_case_name();
        assert!(fields.cache.camel.get().is_some());

        fields.set_name("same");
        assert!(fields.cache.camel.get().is_none());
        assert!(fields.cache.upper.get().is_none());
        assert_eq!(fields.camel_case_name(), "same");
    }

    #[test]
    fn empty_result_is_cached_as_a_value() {
        let fields = fields_named("--");
        assert_eq!(fields.kebab_case_name(), "");
        assert_eq!(fields.cache.kebab.get().map(String::as_str), Some(""));
    }

    #[test]
    fn author_fields_are_read_fresh() {
        let shared = Arc::new(SharedConfig(Mutex::new(MapConfig::new())));
        let fields = Fields::new(shared.clone());
        assert_eq!(fields.author(), None);

        shared.0.lock().unwrap().set(AUTHOR_KEY, "Ada");
        shared.0.lock().unwrap().set(LINK_KEY, "https://example.com");
        assert_eq!(fields.author().as_deref(), Some("Ada"));
        assert_eq!(fields.link().as_deref(), Some("https://example.com"));

        shared.0.lock().unwrap().set(AUTHOR_KEY, "Grace");
        assert_eq!(fields.author().as_deref(), Some("Grace"));
        assert_eq!(fields.email(), None);
    }

    #[test]
    fn snapshot_serializes_with_placeholder_names() {
        let config = MapConfig::new().with(EMAIL_KEY, "ada@example.com");
        let mut fields = Fields::new(Arc::new(config));
        fields.set_name("userProfile");

        let snapshot = fields.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["pascalCaseName"], "UserProfile");
        assert_eq!(json["lowerDotCaseName"], "user.profile");
        assert_eq!(json["omitLine"], serde_json::Value::Null);
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["author"], serde_json::Value::Null);

        let entries = snapshot.entries();
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[3], ("snakeCaseName", Some("user_profile")));
    }

    #[test]
    fn date_uses_locale_layout() {
        let date = fields_named("x").date();
        assert!(date.contains(", "));
        assert!(date.ends_with("AM") || date.ends_with("PM"));
    }
}
