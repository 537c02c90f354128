//! Integration Test: No Blocking Calls
//!
//! **Policy**: Production code in the TUI and the core runs on tokio and MUST
//! NOT block a runtime thread.
//! **Required**: `tokio::time::sleep`, async `reqwest`, spawned tasks.

use architectural_enforcement::{report, scan_dirs, workspace_root, Rule, PRODUCTION_DIRS};

const BLOCKING_SLEEP: Rule = Rule {
    name: "Blocking sleep",
    patterns: &["thread::sleep"],
};

const BLOCKING_HTTP: Rule = Rule {
    name: "Blocking HTTP client",
    patterns: &["reqwest::blocking"],
};

const BLOCK_ON: Rule = Rule {
    name: "Nested runtime",
    patterns: &["block_on(", "Runtime::new("],
};

#[test]
fn test_no_blocking_calls_in_production_code() {
    let violations = scan_dirs(
        &workspace_root(),
        &PRODUCTION_DIRS,
        &[BLOCKING_SLEEP, BLOCKING_HTTP, BLOCK_ON],
    );

    report(
        "CRITICAL: Blocking calls found in production code!",
        &[
            "FORBIDDEN: std::thread::sleep, reqwest::blocking::*, block_on, Runtime::new",
            "REQUIRED:  tokio::time::sleep(..).await, reqwest::Client, tokio::spawn",
            "Playback pacing belongs in nexus_core::playback::spawn_playback.",
        ],
        &violations,
    );
}
