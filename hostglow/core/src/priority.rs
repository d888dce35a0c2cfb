//! Priority Classification
//!
//! Maps a host name to a priority class and a category color by
//! case-insensitive substring rules. The first matching rule wins, so rule
//! order matters: `"nas-server"` is a server, not storage.
//!
//! Priorities drive both grid placement (lower = earlier cell) and the
//! propagation radius of some animations (lower = wider).

use crate::color::Rgb;
use crate::host::HostObservation;

/// Priority assigned when no rule matches
pub const DEFAULT_PRIORITY: u8 = 7;

/// Category color assigned when no rule matches
pub const DEFAULT_CATEGORY_COLOR: Rgb = Rgb::new(100, 220, 100);

const PRIORITY_RULES: &[(&[&str], u8)] = &[
    (&["server", "srv"], 0),
    (&["router", "switch", "gateway"], 1),
    (&["nas", "storage"], 2),
    (&["proxmox", "esxi", "vm"], 3),
    (&["pi", "raspberry"], 4),
    (&["pc", "desktop", "workstation"], 5),
    (&["laptop", "notebook"], 6),
    (&["phone", "iphone", "android"], 8),
    (&["ipad", "tablet"], 9),
];

const CATEGORY_RULES: &[(&[&str], Rgb)] = &[
    (&["server", "srv", "proxmox", "esxi"], Rgb::new(30, 100, 255)),
    (&["router", "switch", "gateway", "ap"], Rgb::new(0, 200, 200)),
    (&["nas", "storage", "backup"], Rgb::new(150, 50, 255)),
    (&["pi", "raspberry", "esp", "tapo"], Rgb::new(255, 50, 150)),
    (&["pc", "desktop", "workstation", "mega"], Rgb::new(50, 255, 100)),
    (&["laptop", "notebook"], Rgb::new(50, 200, 180)),
    (&["phone", "iphone", "android", "pixel"], Rgb::new(255, 150, 30)),
    (&["ipad", "tablet", "pad"], Rgb::new(180, 255, 50)),
    (&["cam", "ring", "security"], Rgb::new(255, 80, 50)),
    (&["home", "assistant", "alexa"], Rgb::new(255, 200, 150)),
];

fn first_match<T: Copy>(name: &str, rules: &[(&[&str], T)], fallback: T) -> T {
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(fallback, |(_, value)| *value)
}

/// Priority class of a host name (0 = most important)
#[must_use]
pub fn priority_of(name: &str) -> u8 {
    first_match(name, PRIORITY_RULES, DEFAULT_PRIORITY)
}

/// Category color of a host name
#[must_use]
pub fn category_color(name: &str) -> Rgb {
    first_match(name, CATEGORY_RULES, DEFAULT_CATEGORY_COLOR)
}

/// Sort observations into grid order
///
/// The key is `(priority, name)`, which is a total order over distinct
/// names, so the resulting placement is independent of input order.
pub fn sort_by_priority(hosts: &mut [HostObservation]) {
    hosts.sort_by_cached_key(|h| (priority_of(&h.name), h.name.clone()));
}
