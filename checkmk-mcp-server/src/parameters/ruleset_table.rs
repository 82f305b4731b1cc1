//! Static pattern-to-ruleset seed table (spec §9 Design Notes): a cache
//! for dynamic discovery, not a replacement for it. [`lookup`] is tried
//! before falling back to [`crate::rest::CheckmkClient::discover_ruleset`].

use regex::Regex;
use std::sync::LazyLock;

struct SeedEntry {
    pattern: &'static str,
    ruleset: &'static str,
}

const SEED_TABLE: &[SeedEntry] = &[
    SeedEntry { pattern: r"(?i)temp(erature)?", ruleset: "checkgroup_parameters:temperature" },
    SeedEntry { pattern: r"(?i)filesystem|/.*\bmount", ruleset: "checkgroup_parameters:filesystem" },
    SeedEntry { pattern: r"(?i)cpu (utilization|load)", ruleset: "checkgroup_parameters:cpu_utilization_linux" },
    SeedEntry { pattern: r"(?i)memory", ruleset: "checkgroup_parameters:memory_linux" },
    SeedEntry { pattern: r"(?i)interface|nic|ethernet", ruleset: "checkgroup_parameters:interfaces" },
    SeedEntry { pattern: r"(?i)oracle.*tablespace", ruleset: "checkgroup_parameters:oracle_tablespaces" },
    SeedEntry { pattern: r"(?i)mysql.*connection", ruleset: "checkgroup_parameters:mysql_connections" },
    SeedEntry { pattern: r"(?i)https?\b", ruleset: "checkgroup_parameters:http" },
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SEED_TABLE
        .iter()
        .filter_map(|entry| Regex::new(entry.pattern).ok().map(|re| (re, entry.ruleset)))
        .collect()
});

/// Returns the first seed-table ruleset whose pattern matches `service_description`.
pub fn lookup(service_description: &str) -> Option<&'static str> {
    COMPILED
        .iter()
        .find(|(re, _)| re.is_match(service_description))
        .map(|(_, ruleset)| *ruleset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_temperature_service() {
        assert_eq!(lookup("Temperature Zone 0"), Some("checkgroup_parameters:temperature"));
    }

    #[test]
    fn matches_filesystem_service() {
        assert_eq!(lookup("Filesystem /var"), Some("checkgroup_parameters:filesystem"));
    }

    #[test]
    fn returns_none_for_unknown_service() {
        assert_eq!(lookup("Some Unrecognized Check"), None);
    }
}
