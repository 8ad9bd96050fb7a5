//! User agent generation

use rand::seq::SliceRandom;

const PLATFORMS: [&str; 4] = [
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 14_2_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

const CHROME_VERSIONS: [&str; 4] = ["122.0.0.0", "123.0.0.0", "124.0.0.0", "125.0.0.0"];

/// Generate a browser-like user agent.
///
/// Some image hosts reject HEAD probes from non-browser agents.
pub fn generate_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let platform = PLATFORMS.choose(&mut rng).copied().unwrap_or(PLATFORMS[0]);
    let version = CHROME_VERSIONS
        .choose(&mut rng)
        .copied()
        .unwrap_or(CHROME_VERSIONS[0]);

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        platform, version
    )
}
