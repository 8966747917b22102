//! robots.txt retrieval and matching.
//!
//! Deliberately permissive: a robots.txt that cannot be retrieved or
//! parsed never blocks a fetch. Only an explicit `Disallow` rule in a
//! group matching our user agent does.

use reqwest::Url;
use std::time::Duration;

/// Check whether `agent` may fetch `url` according to the origin's
/// robots.txt. Permissive on any retrieval or parse failure.
pub async fn allowed(http: &reqwest::Client, url: &str, agent: &str, timeout: Duration) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return true,
    };
    let host = match parsed.host_str() {
        Some(h) => h,
        None => return true,
    };
    let robots_url = match parsed.port() {
        Some(port) => format!("{}://{}:{}/robots.txt", parsed.scheme(), host, port),
        None => format!("{}://{}/robots.txt", parsed.scheme(), host),
    };

    let body = match http
        .get(&robots_url)
        .header(reqwest::header::USER_AGENT, agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => match resp.text().await {
            Ok(text) => text,
            Err(_) => return true,
        },
        _ => return true,
    };

    RobotsTxt::parse(&body).is_allowed(agent, parsed.path())
}

/// Parsed robots.txt: user-agent groups with allow/disallow prefix rules.
#[derive(Debug, Default)]
pub struct RobotsTxt {
    groups: Vec<Group>,
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    /// `(allow, path_prefix)` in file order.
    rules: Vec<(bool, String)>,
}

impl RobotsTxt {
    /// Parse robots.txt text. Unknown directives are ignored.
    pub fn parse(text: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut current: Option<Group> = None;
        // Consecutive User-agent lines share one group.
        let mut last_was_agent = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let field = field.trim().to_ascii_lowercase();
            let value = value.trim();

            match field.as_str() {
                "user-agent" => {
                    if !last_was_agent {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(Group::default());
                    }
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_ascii_lowercase());
                    }
                    last_was_agent = true;
                }
                "disallow" | "allow" => {
                    last_was_agent = false;
                    if let Some(group) = current.as_mut() {
                        // An empty Disallow means "allow everything".
                        if !value.is_empty() {
                            group.rules.push((field == "allow", value.to_string()));
                        }
                    }
                }
                _ => {
                    last_was_agent = false;
                }
            }
        }
        if let Some(group) = current.take() {
            groups.push(group);
        }

        Self { groups }
    }

    /// Whether `agent` may fetch `path`. The most specific (longest)
    /// matching rule in the best-matching group wins; no match allows.
    pub fn is_allowed(&self, agent: &str, path: &str) -> bool {
        let agent = agent.to_ascii_lowercase();
        let path = if path.is_empty() { "/" } else { path };

        let group = self
            .groups
            .iter()
            .find(|g| g.agents.iter().any(|a| a != "*" && agent.contains(a.as_str())))
            .or_else(|| self.groups.iter().find(|g| g.agents.iter().any(|a| a == "*")));

        let Some(group) = group else {
            return true;
        };

        let mut verdict = true;
        let mut best_len = 0;
        for (allow, prefix) in &group.rules {
            if path.starts_with(prefix.as_str()) && prefix.len() > best_len {
                best_len = prefix.len();
                verdict = *allow;
            }
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comment line
User-agent: *
Disallow: /private/
Allow: /private/press/

User-agent: BadBot
Disallow: /
";

    #[test]
    fn test_wildcard_group_disallow() {
        let robots = RobotsTxt::parse(SAMPLE);
        assert!(!robots.is_allowed("Mozilla/5.0", "/private/data"));
        assert!(robots.is_allowed("Mozilla/5.0", "/public/page"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let robots = RobotsTxt::parse(SAMPLE);
        assert!(robots.is_allowed("Mozilla/5.0", "/private/press/release"));
    }

    #[test]
    fn test_specific_agent_group_preferred() {
        let robots = RobotsTxt::parse(SAMPLE);
        assert!(!robots.is_allowed("BadBot/1.0", "/anything"));
    }

    #[test]
    fn test_no_matching_group_allows() {
        let robots = RobotsTxt::parse("User-agent: OtherBot\nDisallow: /\n");
        assert!(robots.is_allowed("Mozilla/5.0", "/page"));
    }

    #[test]
    fn test_empty_disallow_allows_everything() {
        let robots = RobotsTxt::parse("User-agent: *\nDisallow:\n");
        assert!(robots.is_allowed("Mozilla/5.0", "/anywhere"));
    }

    #[test]
    fn test_garbage_input_allows() {
        let robots = RobotsTxt::parse("<!doctype html><html>not robots</html>");
        assert!(robots.is_allowed("Mozilla/5.0", "/"));
    }

    #[test]
    fn test_shared_agent_lines_form_one_group() {
        let text = "User-agent: AlphaBot\nUser-agent: BetaBot\nDisallow: /x/\n";
        let robots = RobotsTxt::parse(text);
        assert!(!robots.is_allowed("AlphaBot", "/x/y"));
        assert!(!robots.is_allowed("BetaBot", "/x/y"));
        assert!(robots.is_allowed("BetaBot", "/z"));
    }
}
