use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// A profile as returned by the directory service.
///
/// The document is kept verbatim; only a handful of fields are ever read.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProfileRecord(Value);

impl ProfileRecord {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    /// Display name, if the profile has a non-empty one.
    pub fn name(&self) -> Option<&str> {
        self.field("name")
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.field("avatar_url")
    }

    pub fn html_url(&self) -> Option<&str> {
        self.field("html_url")
    }

    pub fn avatar_url_parsed(&self) -> Option<Url> {
        self.avatar_url()
            .and_then(|raw| Url::parse(raw).ok())
    }

    pub fn html_url_parsed(&self) -> Option<Url> {
        self.html_url()
            .and_then(|raw| Url::parse(raw).ok())
    }

    /// The name to print on the certificate, falling back to the identifier
    /// the profile was requested with.
    pub fn display_name<'a>(&'a self, identifier: &'a str) -> &'a str {
        self.name().unwrap_or(identifier)
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// An identifier is missing when there is nothing but whitespace in it.
pub fn is_missing(identifier: &str) -> bool {
    identifier.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn reads_known_fields() {
        let record = ProfileRecord::new(json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "html_url": "https://github.com/octocat",
            "public_repos": 8,
        }));

        assert_eq!(record.name(), Some("The Octocat"));
        assert_eq!(record.display_name("octocat"), "The Octocat");
        assert_eq!(
            record.html_url_parsed().unwrap().as_str(),
            "https://github.com/octocat"
        );
        assert_eq!(
            record.avatar_url_parsed().unwrap().host_str(),
            Some("avatars.githubusercontent.com")
        );
    }

    #[rstest]
    #[case(json!({"login": "ghost"}))]
    #[case(json!({"name": null}))]
    #[case(json!({"name": ""}))]
    #[case(json!({"name": 42}))]
    #[case(json!(["not", "an", "object"]))]
    fn display_name_falls_back_to_identifier(#[case] document: Value) {
        let record = ProfileRecord::new(document);
        assert_eq!(record.display_name("ghost"), "ghost");
        assert_eq!(record.avatar_url(), None);
    }

    #[test]
    fn unparseable_urls_are_ignored() {
        let record = ProfileRecord::new(json!({"html_url": "not a url"}));
        assert_eq!(record.html_url(), Some("not a url"));
        assert!(record.html_url_parsed().is_none());
    }

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("\t\n", true)]
    #[case("octocat", false)]
    #[case(" octocat ", false)]
    fn missing_identifiers(#[case] identifier: &str, #[case] missing: bool) {
        assert_eq!(is_missing(identifier), missing);
    }
}
