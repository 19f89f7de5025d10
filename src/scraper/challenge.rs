//! Anti-bot interstitial detection.
//!
//! Ordinary pages may mention one of these phrases in scripts or chrome, so a
//! page only counts as a challenge when at least two distinct signals match.

/// Phrases served by the "checking your browser" interstitial, lowercase.
pub const CHALLENGE_SIGNALS: [&str; 6] = [
    "<title>just a moment...</title>",
    "checking your browser before accessing",
    "cf-browser-verification",
    "wait while we check your browser",
    "please enable javascript and cookies",
    "attention required!",
];

/// Minimum number of distinct signals for a challenge verdict.
pub const MIN_SIGNALS: usize = 2;

/// Count how many distinct signals appear in the document.
pub fn count_signals(html: &str) -> usize {
    if html.is_empty() {
        return 0;
    }
    let text = html.to_lowercase();
    CHALLENGE_SIGNALS
        .iter()
        .filter(|signal| text.contains(*signal))
        .count()
}
