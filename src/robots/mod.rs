//! Robots exclusion rules and the per-domain robots gate state
//!
//! A domain starts with no robots knowledge and must have robots.txt fetched
//! out-of-band before any of its pages are served; the scheduler drives that
//! through [`RobotsState`].

mod parser;

pub use parser::parse_robots;

/// One allow/disallow rule: a path prefix and its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    pub prefix: String,
    pub allow: bool,
}

impl RobotsRule {
    pub fn allow(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            allow: true,
        }
    }

    pub fn disallow(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            allow: false,
        }
    }
}

/// Robots knowledge for one domain.
///
/// `Unknown` forces a robots.txt fetch before any page of the domain is
/// handed out; `Fetching` marks that exactly one such fetch is outstanding,
/// so re-entrant pops do not issue a second one.
#[derive(Debug, Clone)]
pub enum RobotsState {
    Unknown,
    Fetching,
    Rules(Vec<RobotsRule>),
}

/// Applies the rule list to a path.
///
/// Rules are scanned in original file order and the first matching prefix
/// decides; there is no longest-match precedence. Paths matching no rule are
/// allowed.
pub fn matches(rules: &[RobotsRule], path: &str) -> bool {
    for rule in rules {
        if path.starts_with(&rule.prefix) {
            return rule.allow;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rules_allows_everything() {
        assert!(matches(&[], "/"));
        assert!(matches(&[], "/admin"));
    }

    #[test]
    fn test_disallow_prefix() {
        let rules = vec![RobotsRule::disallow("/admin")];
        assert!(!matches(&rules, "/admin"));
        assert!(!matches(&rules, "/admin/users"));
        assert!(matches(&rules, "/public"));
    }

    #[test]
    fn test_first_match_wins_over_later_rules() {
        // A later, longer prefix never overrides an earlier match.
        let rules = vec![
            RobotsRule::disallow("/private"),
            RobotsRule::allow("/private/public"),
        ];
        assert!(!matches(&rules, "/private/public/page"));

        let reversed = vec![
            RobotsRule::allow("/private/public"),
            RobotsRule::disallow("/private"),
        ];
        assert!(matches(&reversed, "/private/public/page"));
        assert!(!matches(&reversed, "/private/other"));
    }

    #[test]
    fn test_disallow_root_blocks_all() {
        let rules = vec![RobotsRule::disallow("/")];
        assert!(!matches(&rules, "/"));
        assert!(!matches(&rules, "/anything"));
    }
}
