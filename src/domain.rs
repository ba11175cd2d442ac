use std::borrow::Cow;

use indexmap::IndexMap;

/// One configured tracker instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TrackerDomain {
    /// The short name used on the command line and in banners.
    pub(crate) key: &'static str,
    /// No trailing slash.
    pub(crate) base_url: Cow<'static, str>,
}

impl TrackerDomain {
    pub(crate) fn search_url(&self) -> String {
        format!("{}/rest/api/2/search", self.base_url)
    }

    pub(crate) fn browse_url(&self, issue_key: &str) -> String {
        format!("{}/browse/{issue_key}", self.base_url)
    }
}

/// Every tracker this tool knows about, in the order they are searched.
pub(crate) static REGISTRY: [TrackerDomain; 2] = [
    TrackerDomain {
        key: "JBOSS",
        base_url: Cow::Borrowed("https://issues.jboss.org"),
    },
    TrackerDomain {
        key: "HIBERNATE",
        base_url: Cow::Borrowed("https://hibernate.atlassian.net"),
    },
];

pub(crate) type Domains = IndexMap<&'static str, TrackerDomain>;

pub(crate) fn keys() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|domain| domain.key)
}

/// Build the domain map for a run. When `selected` is `None` every registered domain is used.
///
/// The result is always in registry order, never in the order keys were selected in.
pub(crate) fn select_domains<S: AsRef<str>>(selected: Option<&[S]>) -> Domains {
    REGISTRY
        .iter()
        .filter(|domain| {
            selected.map_or(true, |selected| {
                selected.iter().any(|key| key.as_ref() == domain.key)
            })
        })
        .map(|domain| (domain.key, domain.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn no_selection_keeps_every_domain() {
        let domains = select_domains::<&str>(None);
        assert_eq!(
            domains.keys().copied().collect::<Vec<_>>(),
            vec!["JBOSS", "HIBERNATE"]
        );
    }

    #[test]
    fn selection_keeps_registry_order() {
        let domains = select_domains(Some(&["HIBERNATE", "JBOSS"][..]));
        assert_eq!(
            domains.keys().copied().collect::<Vec<_>>(),
            vec!["JBOSS", "HIBERNATE"]
        );
    }

    #[test]
    fn selection_filters() {
        let domains = select_domains(Some(&["HIBERNATE".to_string()][..]));
        assert_eq!(domains.len(), 1);
        assert_eq!(
            domains.get("HIBERNATE").map(|domain| domain.base_url.as_ref()),
            Some("https://hibernate.atlassian.net")
        );
    }

    #[test]
    fn urls() {
        let domain = &REGISTRY[0];
        assert_eq!(
            domain.search_url(),
            "https://issues.jboss.org/rest/api/2/search"
        );
        assert_eq!(
            domain.browse_url("WFLY-123"),
            "https://issues.jboss.org/browse/WFLY-123"
        );
    }
}
