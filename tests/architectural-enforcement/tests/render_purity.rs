//! Render Purity
//!
//! The renderer computes colors from a snapshot and the clock. It must
//! never reach for the network, the async runtime, or block the thread,
//! otherwise a slow monitoring server could stall the output device.

use architectural_enforcement::{find_forbidden, workspace_path};

const FORBIDDEN: &[&str] = &[
    "reqwest",
    "tokio::",
    "std::thread::sleep",
    "std::net",
    "std::fs",
];

#[test]
fn test_render_module_is_pure() {
    let dir = workspace_path("hostglow/core/src/render");
    assert!(dir.exists(), "missing {}", dir.display());

    let violations = find_forbidden(&dir, FORBIDDEN);
    if !violations.is_empty() {
        for v in &violations {
            eprintln!("  ❌ {v}");
        }
        panic!(
            "\nFound {} I/O or runtime reference(s) in the render module",
            violations.len()
        );
    }
}

#[test]
fn test_render_module_takes_no_write_locks() {
    let dir = workspace_path("hostglow/core/src/render");
    let violations = find_forbidden(&dir, &[".write()", "apply_poll", "inject("]);
    assert!(
        violations.is_empty(),
        "renderer must only read snapshots: {violations:#?}"
    );
}
