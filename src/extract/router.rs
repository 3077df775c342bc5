// src/extract/router.rs
use std::fmt;
use std::str::FromStr;

/// One `(keyword, profile)` pair. Keywords are sanitized at construction so
/// they compare against sanitized file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub keyword: String,
    pub profile: String,
}

impl RoutingRule {
    pub fn new(keyword: &str, profile: &str) -> Self {
        Self {
            keyword: sanitize_file_name(keyword),
            profile: profile.to_string(),
        }
    }
}

impl FromStr for RoutingRule {
    type Err = String;

    /// Parses the CLI form `keyword=profile`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (keyword, profile) = s
            .split_once('=')
            .ok_or_else(|| format!("expected 'keyword=profile', got '{}'", s))?;
        if keyword.trim().is_empty() || profile.trim().is_empty() {
            return Err(format!("expected 'keyword=profile', got '{}'", s));
        }
        Ok(RoutingRule::new(keyword.trim(), profile.trim()))
    }
}

impl fmt::Display for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.keyword, self.profile)
    }
}

/// Selects the extraction profile for a source file by keyword containment.
///
/// Rules are evaluated in declaration order and the first match wins; a
/// name matching two keywords always resolves to the earlier rule. No match
/// falls back to the default profile.
#[derive(Debug, Clone)]
pub struct SourceRouter {
    rules: Vec<RoutingRule>,
    default_profile: String,
}

impl SourceRouter {
    pub fn new(rules: Vec<RoutingRule>, default_profile: &str) -> Self {
        Self {
            rules,
            default_profile: default_profile.to_string(),
        }
    }

    pub fn route(&self, file_name: &str) -> &str {
        let sanitized = sanitize_file_name(file_name);
        for rule in &self.rules {
            if sanitized.contains(&rule.keyword) {
                tracing::info!(
                    "Routing '{}' to profile '{}' (matched keyword '{}')",
                    file_name,
                    rule.profile,
                    rule.keyword
                );
                return &rule.profile;
            }
        }
        tracing::debug!(
            "No routing keyword matched '{}'; using default profile '{}'",
            file_name,
            self.default_profile
        );
        &self.default_profile
    }
}

/// Lowercases and strips every non-alphanumeric character, so keyword
/// matching survives spacing, punctuation, and case noise in file names.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> SourceRouter {
        SourceRouter::new(
            vec![
                RoutingRule::new("appendix a", "custom-appendix-a"),
                RoutingRule::new("review", "custom-review"),
            ],
            "prebuilt-layout",
        )
    }

    #[test]
    fn test_sanitized_containment_match() {
        let r = router();
        assert_eq!(r.route("19_Appendix A (final).PDF"), "custom-appendix-a");
        assert_eq!(r.route("Annual-Review-2024.pdf"), "custom-review");
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        assert_eq!(router().route("random_notes.pdf"), "prebuilt-layout");
    }

    #[test]
    fn test_first_declared_rule_wins_on_ambiguity() {
        // Contains both "appendixa" and "review"; declaration order decides.
        assert_eq!(router().route("Appendix A Review.pdf"), "custom-appendix-a");
    }

    #[test]
    fn test_rule_parsing() {
        let rule: RoutingRule = "Appendix A=custom-appendix-a".parse().unwrap();
        assert_eq!(rule.keyword, "appendixa");
        assert_eq!(rule.profile, "custom-appendix-a");
        assert!("no-separator".parse::<RoutingRule>().is_err());
        assert!("=profile".parse::<RoutingRule>().is_err());
    }
}
