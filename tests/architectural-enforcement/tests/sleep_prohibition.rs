//! Sleep Prohibition
//!
//! **Policy**: production code waits on intervals, channels or I/O. The
//! only sleep allowed is the retry backoff between failed status fetches.

use architectural_enforcement::{find_sleep_violations, workspace_path};

fn assert_no_sleep(relative: &str) {
    let dir = workspace_path(relative);
    if !dir.exists() {
        return;
    }
    let violations = find_sleep_violations(&dir);
    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code:");
        for v in &violations {
            eprintln!("  ❌ {v}");
        }
        eprintln!("\n✅ Use tokio::time::interval() for periodic work");
        panic!("Found {} sleep violation(s) in {relative}", violations.len());
    }
}

#[test]
fn test_no_sleep_in_core() {
    assert_no_sleep("hostglow/core/src");
}

#[test]
fn test_no_sleep_in_daemon() {
    assert_no_sleep("hostglow/daemon/src");
}
