//! Integration Test: Core/UI Separation
//!
//! **Policy**: `nexus-core` holds all logic and no UI. It must not reference
//! terminal or widget crates; surfaces talk to it through `SurfaceEvent` and
//! `ConductorMessage` only.

use architectural_enforcement::{report, scan_dirs, workspace_root, Rule, CORE_DIR};

const UI_FRAMEWORK: Rule = Rule {
    name: "UI framework in core",
    patterns: &["ratatui::", "crossterm::", "use ratatui", "use crossterm"],
};

const SURFACE_CRATE: Rule = Rule {
    name: "Surface crate in core",
    patterns: &["nexus_tui"],
};

#[test]
fn test_core_has_no_ui_dependencies() {
    let violations = scan_dirs(&workspace_root(), &[CORE_DIR], &[UI_FRAMEWORK, SURFACE_CRATE]);

    report(
        "CRITICAL: UI code found in nexus-core!",
        &["Move rendering into tui/src and send state down as ConductorMessage."],
        &violations,
    );
}

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = std::fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest readable");

    for name in ["ratatui", "crossterm"] {
        assert!(
            !manifest.lines().any(|l| l.trim_start().starts_with(name)),
            "nexus-core must not depend on {name}"
        );
    }
}
