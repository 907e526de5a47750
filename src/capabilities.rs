//! FEAT feature-map parsing and caching (RFC 2389 §4)

use std::collections::{HashMap, HashSet};

/// The server's advertised feature set, as returned by `FEAT` (spec §3
/// "Feature map").
///
/// Keyed by uppercase feature name; each value is the set of value strings
/// that appeared on that feature's line (possibly containing the empty
/// string when the feature was bare, e.g. `UTF8` with no argument).
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FeatureMap {
    features: HashMap<String, HashSet<String>>,
}

impl FeatureMap {
    /// An empty feature map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the body lines of a successful `FEAT` reply.
    ///
    /// # Format
    ///
    /// Each line is a leading space followed by `NAME [value ...]`, per
    /// RFC 2389 §3.2. The leading space (if present) is trimmed; the first
    /// whitespace-delimited token becomes the uppercase feature name.
    pub fn parse(lines: &[String]) -> Self {
        let mut features: HashMap<String, HashSet<String>> = HashMap::new();

        for line in lines {
            let trimmed = line.trim_start();
            let mut parts = trimmed.split_whitespace();
            let Some(name) = parts.next() else {
                continue;
            };
            let name = name.to_uppercase();
            let values: HashSet<String> = parts.map(str::to_string).collect();
            let entry = features.entry(name).or_default();
            if values.is_empty() {
                entry.insert(String::new());
            } else {
                entry.extend(values);
            }
        }

        Self { features }
    }

    /// Whether the server advertised this feature at all.
    pub fn has(&self, feature: &str) -> bool {
        self.features.contains_key(&feature.to_uppercase())
    }

    /// The value set for a feature, if advertised.
    pub fn values(&self, feature: &str) -> Option<&HashSet<String>> {
        self.features.get(&feature.to_uppercase())
    }

    /// Whether a feature was advertised with a given value (e.g.
    /// `has_value("MLST", "type*;size;")`).
    pub fn has_value(&self, feature: &str, value: &str) -> bool {
        self.values(feature)
            .map(|v| v.iter().any(|existing| existing.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }

    /// All advertised feature names.
    pub fn names(&self) -> Vec<String> {
        self.features.keys().cloned().collect()
    }
}

/// State of the per-connection FEAT cache (spec §3 "Feature map").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureCacheState {
    /// FEAT has not been sent on this connection yet.
    #[default]
    Unfetched,
    /// The server answered `503` ("not logged in yet"); a later retry is allowed.
    NotLoggedInYet,
    /// FEAT was sent and answered with anything other than 211 or 503;
    /// further querying is disabled for this connection.
    Disabled,
    /// FEAT succeeded; the map is cached.
    Fetched,
}
