//! robots.txt parser
//!
//! Record-oriented: records are separated by blank lines, each starting with
//! one or more `User-agent` lines followed by `Allow`/`Disallow` lines. Only
//! records addressed to the wildcard agent contribute rules; rule order is
//! preserved exactly as written, since evaluation is first-match.

use super::RobotsRule;

/// Parses robots.txt content into an ordered rule list.
///
/// Tolerant by construction: comments (`#` to end of line), CR and CRLF line
/// endings, unknown directives, and rule values not starting with `/` are all
/// skipped without error. Garbage input yields an empty rule list, which
/// means allow-all.
pub fn parse_robots(body: &str) -> Vec<RobotsRule> {
    let mut rules = Vec::new();

    for record in records(body) {
        let mut wildcard = false;
        let mut in_agent_preamble = true;

        for (key, value) in record {
            match key.as_str() {
                "user-agent" => {
                    if !in_agent_preamble {
                        // A new agent list inside the same record block;
                        // treated as a fresh record.
                        wildcard = value == "*";
                        in_agent_preamble = true;
                    } else if value == "*" {
                        wildcard = true;
                    }
                }
                "allow" | "disallow" => {
                    in_agent_preamble = false;
                    if !wildcard || !value.starts_with('/') {
                        continue;
                    }
                    rules.push(RobotsRule {
                        prefix: value,
                        allow: key == "allow",
                    });
                }
                _ => {
                    // Crawl-delay, Sitemap and friends are not path rules
                    in_agent_preamble = false;
                }
            }
        }
    }

    rules
}

/// Splits the body into records of (lowercased key, value) pairs.
fn records(body: &str) -> Vec<Vec<(String, String)>> {
    let mut all = Vec::new();
    let mut current: Vec<(String, String)> = Vec::new();

    for raw in body.lines() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            if !current.is_empty() {
                all.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            current.push((key.trim().to_lowercase(), value.trim().to_string()));
        }
    }
    if !current.is_empty() {
        all.push(current);
    }
    all
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_disallow() {
        let rules = parse_robots("User-agent: *\nDisallow: /admin");
        assert_eq!(rules, vec![RobotsRule::disallow("/admin")]);
    }

    #[test]
    fn test_parse_preserves_file_order() {
        let body = "User-agent: *\nDisallow: /a\nAllow: /a/b\nDisallow: /c";
        let rules = parse_robots(body);
        assert_eq!(
            rules,
            vec![
                RobotsRule::disallow("/a"),
                RobotsRule::allow("/a/b"),
                RobotsRule::disallow("/c"),
            ]
        );
    }

    #[test]
    fn test_parse_ignores_other_agents() {
        let body = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nDisallow: /admin";
        let rules = parse_robots(body);
        assert_eq!(rules, vec![RobotsRule::disallow("/admin")]);
    }

    #[test]
    fn test_parse_multiple_agents_in_record() {
        let body = "User-agent: BotA\nUser-agent: *\nDisallow: /x";
        let rules = parse_robots(body);
        assert_eq!(rules, vec![RobotsRule::disallow("/x")]);
    }

    #[test]
    fn test_parse_skips_comments_and_crlf() {
        let body = "User-agent: * # everyone\r\nDisallow: /tmp # scratch\r\n";
        let rules = parse_robots(body);
        assert_eq!(rules, vec![RobotsRule::disallow("/tmp")]);
    }

    #[test]
    fn test_parse_skips_non_path_values() {
        let body = "User-agent: *\nDisallow: \nDisallow: *.gif\nDisallow: /ok";
        let rules = parse_robots(body);
        assert_eq!(rules, vec![RobotsRule::disallow("/ok")]);
    }

    #[test]
    fn test_parse_ignores_crawl_delay() {
        let body = "User-agent: *\nCrawl-delay: 10\nDisallow: /slow";
        let rules = parse_robots(body);
        assert_eq!(rules, vec![RobotsRule::disallow("/slow")]);
    }

    #[test]
    fn test_parse_garbage_is_allow_all() {
        assert!(parse_robots("this is not a robots file {{{").is_empty());
        assert!(parse_robots("").is_empty());
    }
}
