//! Per-topic coverage flags.

use std::collections::BTreeMap;

use interview_models::{TopicKey, TopicRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TrackerError};

/// One boolean per registry topic, `false` until validated coverage.
///
/// Flags only move `false -> true` through [`TopicCoverageMap::apply`].
/// The reset operations are the only way back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicCoverageMap {
    flags: BTreeMap<TopicKey, bool>,
}

impl TopicCoverageMap {
    /// All registry topics uncovered.
    pub fn new(registry: &TopicRegistry) -> Self {
        Self {
            flags: registry.keys().map(|k| (k.clone(), false)).collect(),
        }
    }

    /// Align with a registry: add missing topics as uncovered and drop unknown keys.
    pub fn reconcile(&mut self, registry: &TopicRegistry) {
        self.flags.retain(|key, _| {
            let known = registry.contains(key);
            if !known {
                debug!(topic = %key, "Dropping coverage flag for unknown topic");
            }
            known
        });
        for key in registry.keys() {
            self.flags.entry(key.clone()).or_insert(false);
        }
    }

    /// Flag for a topic, if tracked.
    pub fn get(&self, key: &TopicKey) -> Option<bool> {
        self.flags.get(key).copied()
    }

    /// Whether a topic is covered.
    pub fn is_covered(&self, key: &TopicKey) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Number of tracked topics.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no topics are tracked.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of covered topics.
    pub fn covered_count(&self) -> usize {
        self.flags.values().filter(|v| **v).count()
    }

    /// Covered / tracked; 0 when nothing is tracked.
    pub fn ratio(&self) -> f64 {
        if self.flags.is_empty() {
            0.0
        } else {
            self.covered_count() as f64 / self.flags.len() as f64
        }
    }

    /// Whether every tracked topic is covered.
    pub fn all_covered(&self) -> bool {
        !self.flags.is_empty() && self.flags.values().all(|v| *v)
    }

    /// Flags keyed by topic.
    pub fn iter(&self) -> impl Iterator<Item = (&TopicKey, bool)> {
        self.flags.iter().map(|(k, v)| (k, *v))
    }

    /// Apply validated claims. Returns the topics that became covered.
    ///
    /// Regression claims (`true -> false`) and unknown keys are ignored.
    pub fn apply(&mut self, validated: &BTreeMap<TopicKey, bool>) -> Vec<TopicKey> {
        let mut newly_covered = Vec::new();
        for (key, &claim) in validated {
            let Some(flag) = self.flags.get_mut(key) else {
                debug!(topic = %key, "Ignoring coverage claim for unknown topic");
                continue;
            };
            match (*flag, claim) {
                (false, true) => {
                    *flag = true;
                    info!(topic = %key, "Topic marked covered");
                    newly_covered.push(key.clone());
                }
                (true, false) => {
                    warn!(topic = %key, "Ignoring regression claim for covered topic");
                }
                _ => {}
            }
        }
        newly_covered
    }

    /// Explicitly mark one topic uncovered.
    pub fn reset_topic(&mut self, key: &TopicKey) -> Result<()> {
        let flag = self
            .flags
            .get_mut(key)
            .ok_or_else(|| TrackerError::UnknownTopic(key.to_string()))?;
        *flag = false;
        info!(topic = %key, "Topic coverage reset");
        Ok(())
    }

    /// Explicitly mark every topic uncovered.
    pub fn reset_all(&mut self) {
        self.flags.values_mut().for_each(|v| *v = false);
        info!("All topic coverage reset");
    }

    /// Covered topic keys in registry order.
    pub fn covered_keys<'a>(&self, registry: &'a TopicRegistry) -> Vec<&'a TopicKey> {
        registry.keys().filter(|k| self.is_covered(k)).collect()
    }

    /// Uncovered topic keys in registry order.
    pub fn missing_keys<'a>(&self, registry: &'a TopicRegistry) -> Vec<&'a TopicKey> {
        registry.keys().filter(|k| !self.is_covered(k)).collect()
    }

    /// Covered topic labels in registry order.
    pub fn covered_labels(&self, registry: &TopicRegistry) -> Vec<String> {
        registry
            .iter()
            .filter(|t| self.is_covered(&t.key))
            .map(|t| t.label.clone())
            .collect()
    }

    /// Uncovered topic labels in registry order.
    pub fn missing_labels(&self, registry: &TopicRegistry) -> Vec<String> {
        registry
            .iter()
            .filter(|t| !self.is_covered(&t.key))
            .map(|t| t.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_models::builtin_registry;

    fn claims(pairs: &[(&str, bool)]) -> BTreeMap<TopicKey, bool> {
        pairs.iter().map(|(k, v)| (TopicKey::from(*k), *v)).collect()
    }

    #[test]
    fn test_new_map_is_all_false() {
        let registry = builtin_registry();
        let map = TopicCoverageMap::new(&registry);
        assert_eq!(map.len(), 9);
        assert_eq!(map.covered_count(), 0);
        assert!(!map.all_covered());
        assert_eq!(map.missing_labels(&registry).len(), 9);
    }

    #[test]
    fn test_regression_only_through_reset() {
        let registry = builtin_registry();
        let mut map = TopicCoverageMap::new(&registry);
        let key = TopicKey::from("tiebreakers");

        let changed = map.apply(&claims(&[("tiebreakers", true)]));
        assert_eq!(changed, vec![key.clone()]);

        let changed = map.apply(&claims(&[("tiebreakers", false)]));
        assert!(changed.is_empty());
        assert!(map.is_covered(&key));

        map.reset_topic(&key).unwrap();
        assert!(!map.is_covered(&key));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let registry = builtin_registry();
        let mut map = TopicCoverageMap::new(&registry);
        assert!(map.apply(&claims(&[("weather", true)])).is_empty());
        assert_eq!(map.len(), 9);
        assert!(matches!(
            map.reset_topic(&TopicKey::from("weather")),
            Err(TrackerError::UnknownTopic(_))
        ));
    }

    #[test]
    fn test_labels_follow_registry_order() {
        let registry = builtin_registry();
        let mut map = TopicCoverageMap::new(&registry);
        map.apply(&claims(&[("tiebreakers", true), ("basic_info", true)]));
        assert_eq!(
            map.covered_labels(&registry),
            vec!["Basic Information", "Tiebreakers"]
        );
        let missing = map.missing_labels(&registry);
        assert_eq!(missing[0], "Staffing Details");
        assert_eq!(missing.len(), 7);
    }

    #[test]
    fn test_reconcile_and_reset_all() {
        let registry = builtin_registry();
        let mut map: TopicCoverageMap =
            serde_json::from_str(r#"{"basic_info": true, "legacy_topic": true}"#).unwrap();
        map.reconcile(&registry);
        assert_eq!(map.len(), 9);
        assert_eq!(map.covered_count(), 1);
        assert!(map.get(&TopicKey::from("legacy_topic")).is_none());

        map.reset_all();
        assert_eq!(map.covered_count(), 0);
        assert_eq!(map.ratio(), 0.0);
    }
}
