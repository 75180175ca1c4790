use crate::config::Config;

/// How a list of labels is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStyle {
    /// One label per line, for people.
    Lines,
    /// Space separated, for shell completion hooks.
    TabComplete,
}

/// Every label in the config, sorted lexicographically.
pub fn list(config: &Config) -> Vec<&str> {
    // Keys of the underlying BTreeMap are already ordered
    config.secrets().keys().map(String::as_str).collect()
}

pub fn resolve<'a>(config: &'a Config, label: &str) -> Option<&'a str> {
    let secret = config.secrets().get(label).map(String::as_str);
    tracing::debug!(label, found = secret.is_some(), "resolved label");

    secret
}

pub fn format_listing(labels: &[&str], style: ListingStyle) -> String {
    let separator = match style {
        ListingStyle::Lines => "\n",
        ListingStyle::TabComplete => " ",
    };

    labels.join(separator)
}

/// Shown instead of a code when the label is unknown.
pub fn not_found_message(label: &str) -> String {
    format!("Couldn't find label '{label}' in the yaml. (Try the -l switch?)")
}
