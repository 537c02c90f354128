//! Integration Test: Generated Scripts Are Never Executed
//!
//! **Policy**: Build scripts come from an AI service and are only replayed as
//! a simulated terminal session or saved to disk. Production code MUST NOT
//! spawn processes.

use architectural_enforcement::{report, scan_dirs, workspace_root, Rule, PRODUCTION_DIRS};

const PROCESS_SPAWN: Rule = Rule {
    name: "Process spawn",
    patterns: &[
        "Command::new",
        "process::Command",
        "tokio::process",
        "std::os::unix::process",
    ],
};

#[test]
fn test_production_dirs_exist() {
    let root = workspace_root();
    for dir in PRODUCTION_DIRS {
        assert!(root.join(dir).is_dir(), "missing source dir {dir}");
    }
}

#[test]
fn test_no_process_spawning_in_production_code() {
    let violations = scan_dirs(&workspace_root(), &PRODUCTION_DIRS, &[PROCESS_SPAWN]);

    report(
        "CRITICAL: Process spawning found in production code!",
        &[
            "Generated scripts are displayed by the playback engine, never run.",
            "Use nexus_core::playback to show a script and nexus_core::export to save it.",
        ],
        &violations,
    );
}
