use std::collections::HashMap;

/// Merge tag sets with precedence, lowest to highest: process-wide defaults,
/// the metric's own tags, then plugin static tags. The metric's map is
/// returned untouched when there is nothing to add.
pub fn merge_tags(
    defaults: &HashMap<String, String>,
    metric_tags: HashMap<String, String>,
    plugin_tags: &HashMap<String, String>,
) -> HashMap<String, String> {
    if defaults.is_empty() && plugin_tags.is_empty() {
        return metric_tags;
    }
    let mut merged = defaults.clone();
    merged.extend(metric_tags);
    merged.extend(
        plugin_tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    merged
}

/// Apply naming rules: an override replaces the name entirely and wins over
/// prefix/suffix; otherwise prefix and suffix apply independently.
pub fn transform_name(
    name: String,
    override_name: Option<&str>,
    prefix: &str,
    suffix: &str,
) -> String {
    if let Some(override_name) = override_name {
        return override_name.to_string();
    }
    if prefix.is_empty() && suffix.is_empty() {
        return name;
    }
    format!("{prefix}{name}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn metric_tags_win_over_defaults() {
        let merged = merge_tags(
            &tags(&[("a", "default"), ("c", "kept")]),
            tags(&[("a", "metric")]),
            &HashMap::new(),
        );
        assert_eq!(merged, tags(&[("a", "metric"), ("c", "kept")]));
    }

    #[test]
    fn plugin_tags_win_over_both() {
        let merged = merge_tags(
            &tags(&[("a", "default")]),
            tags(&[("a", "metric"), ("b", "metric")]),
            &tags(&[("a", "plugin")]),
        );
        assert_eq!(merged, tags(&[("a", "plugin"), ("b", "metric")]));
    }

    #[test]
    fn no_additions_returns_metric_tags() {
        let merged = merge_tags(&HashMap::new(), tags(&[("a", "x")]), &HashMap::new());
        assert_eq!(merged, tags(&[("a", "x")]));
    }

    #[test]
    fn override_wins_over_prefix_and_suffix() {
        let name = transform_name("RITest".to_string(), Some("foobar"), "foo_", "_x");
        assert_eq!(name, "foobar");
    }

    #[test]
    fn prefix_and_suffix_compose() {
        let name = transform_name("RITest".to_string(), None, "foo_", "_bar");
        assert_eq!(name, "foo_RITest_bar");
    }

    #[test]
    fn no_rules_is_identity() {
        let name = transform_name("RITest".to_string(), None, "", "");
        assert_eq!(name, "RITest");
    }
}
