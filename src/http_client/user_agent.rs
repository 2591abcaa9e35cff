//! User agent handling for image downloads.

/// Default identity for downloads. Image CDNs commonly refuse obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Real browser user agents for impersonate mode.
pub const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

/// Pick one of the impersonation agents.
pub fn random_user_agent() -> &'static str {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos() as usize;
    IMPERSONATE_USER_AGENTS[nanos % IMPERSONATE_USER_AGENTS.len()]
}

/// Resolve the configured user agent.
/// - "" => default browser agent
/// - "impersonate" => random real browser agent
/// - other => used verbatim
pub fn resolve_user_agent(config: &str) -> String {
    match config.trim() {
        "" => BROWSER_USER_AGENT.to_string(),
        "impersonate" => random_user_agent().to_string(),
        custom => custom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent() {
        assert_eq!(resolve_user_agent(""), BROWSER_USER_AGENT);
        assert!(resolve_user_agent("impersonate").starts_with("Mozilla/5.0"));
        assert_eq!(resolve_user_agent("MyBot/1.0"), "MyBot/1.0");
    }
}
