use super::cache::{CacheLookup, ClassificationCache};
use super::oracle::{parse_answer, ClassificationOracle};
use super::{heuristic, prompt};
use super::{ClassificationOutcome, FallbackPolicy, FallbackReason, ResolutionSource};
use crate::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tunables for the classification chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    pub fallback: FallbackPolicy,
    /// Restrict oracle options to taxonomy rows with this link key
    pub link_filter_key: Option<String>,
    /// Upper bound on one oracle call including retries, in seconds
    pub oracle_timeout_secs: u64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::Heuristic,
            link_filter_key: None,
            oracle_timeout_secs: 60,
        }
    }
}

impl ClassificationSettings {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }
}

/// Counters reported in the conversion summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationStats {
    pub cache_hits: u64,
    pub pre_filtered: u64,
    pub oracle_calls: u64,
    pub fallbacks: u64,
}

/// Resolves free text to a minor category label.
///
/// One instance lives for one conversion run and owns that run's cache.
pub struct ClassificationSubsystem {
    taxonomy: Arc<Taxonomy>,
    oracle: Option<Arc<dyn ClassificationOracle>>,
    settings: ClassificationSettings,
    cache: ClassificationCache,
    pre_filtered: AtomicU64,
    oracle_calls: AtomicU64,
    fallbacks: AtomicU64,
}

impl ClassificationSubsystem {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        oracle: Option<Arc<dyn ClassificationOracle>>,
        settings: ClassificationSettings,
    ) -> Self {
        Self {
            taxonomy,
            oracle,
            settings,
            cache: ClassificationCache::new(),
            pre_filtered: AtomicU64::new(0),
            oracle_calls: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Subsystem without an oracle; every non-pre-filtered text falls back
    pub fn heuristic_only(taxonomy: Arc<Taxonomy>, settings: ClassificationSettings) -> Self {
        Self::new(taxonomy, None, settings)
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn settings(&self) -> &ClassificationSettings {
        &self.settings
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    /// Classify using the configured link filter key
    pub async fn classify(&self, text: &str) -> ClassificationOutcome {
        let link_key = self.settings.link_filter_key.clone();
        self.classify_with_key(text, link_key.as_deref()).await
    }

    pub async fn classify_with_key(
        &self,
        text: &str,
        link_key: Option<&str>,
    ) -> ClassificationOutcome {
        let key = text.trim();
        if key.is_empty() {
            return ClassificationOutcome::Resolved {
                label: String::new(),
                source: ResolutionSource::EmptyInput,
            };
        }

        let lookup = self
            .cache
            .get_or_resolve(key, || self.resolve(key, link_key))
            .await;

        match lookup {
            CacheLookup::Hit(label) => {
                debug!(text = key, label = %label, "classification cache hit");
                ClassificationOutcome::Resolved {
                    label,
                    source: ResolutionSource::Cache,
                }
            }
            CacheLookup::Resolved(outcome) => outcome,
        }
    }

    async fn resolve(&self, text: &str, link_key: Option<&str>) -> ClassificationOutcome {
        if let Some(label) = heuristic::pre_filter(text) {
            self.pre_filtered.fetch_add(1, Ordering::Relaxed);
            debug!(text, label, "resolved by pre-filter");
            return ClassificationOutcome::Resolved {
                label: label.to_string(),
                source: ResolutionSource::PreFilter,
            };
        }

        let Some(oracle) = self.oracle.as_ref() else {
            return self.fall_back(text, FallbackReason::OracleUnavailable);
        };

        let options = self.taxonomy.options_for(link_key);
        let prompt = prompt::build_prompt(text, &options);
        self.oracle_calls.fetch_add(1, Ordering::Relaxed);

        let answer = tokio::time::timeout(
            self.settings.oracle_timeout(),
            oracle.classify(&prompt, &options),
        )
        .await;

        match answer {
            Err(_) => self.fall_back(text, FallbackReason::Timeout),
            Ok(Err(e)) => self.fall_back(text, FallbackReason::OracleError(e.to_string())),
            Ok(Ok(answer)) => match parse_answer(&answer, &options) {
                Some(label) => {
                    debug!(text, label, oracle = oracle.name(), "resolved by oracle");
                    ClassificationOutcome::Resolved {
                        label: label.to_string(),
                        source: ResolutionSource::Oracle,
                    }
                }
                None => {
                    debug!(text, answer = %answer, "oracle answer matched no option");
                    self.fall_back(text, FallbackReason::UnparseableResponse)
                }
            },
        }
    }

    fn fall_back(&self, text: &str, reason: FallbackReason) -> ClassificationOutcome {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        let label = self.settings.fallback.label_for(text);

        match &reason {
            FallbackReason::OracleUnavailable => {
                debug!(text, label, policy = %self.settings.fallback, "no oracle, using fallback")
            }
            other => {
                warn!(text, label, reason = %other, policy = %self.settings.fallback, "oracle fallback")
            }
        }

        ClassificationOutcome::Fallback {
            label: label.to_string(),
            reason,
        }
    }

    pub fn stats(&self) -> ClassificationStats {
        ClassificationStats {
            cache_hits: self.cache.hits(),
            pre_filtered: self.pre_filtered.load(Ordering::Relaxed),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ClassificationSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationSubsystem")
            .field("taxonomy_rows", &self.taxonomy.len())
            .field("oracle", &self.oracle.as_ref().map(|o| o.name().to_string()))
            .field("settings", &self.settings)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsystem(fallback: FallbackPolicy) -> ClassificationSubsystem {
        ClassificationSubsystem::heuristic_only(
            Arc::new(Taxonomy::embedded()),
            ClassificationSettings {
                fallback,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_blank_text_is_not_cached() {
        let subsystem = subsystem(FallbackPolicy::Heuristic);
        let outcome = subsystem.classify("   ").await;
        assert_eq!(outcome.label(), "");
        assert!(subsystem.cache().is_empty());
    }

    #[tokio::test]
    async fn test_pre_filter_then_cache() {
        let subsystem = subsystem(FallbackPolicy::DefaultLabel);

        let first = subsystem.classify("Pythonエンジニア").await;
        assert_eq!(
            first,
            ClassificationOutcome::Resolved {
                label: "Web・オープン系 プログラマ【PG】".to_string(),
                source: ResolutionSource::PreFilter,
            }
        );

        let second = subsystem.classify("  Pythonエンジニア ").await;
        assert!(matches!(
            second,
            ClassificationOutcome::Resolved {
                source: ResolutionSource::Cache,
                ..
            }
        ));
        assert_eq!(subsystem.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_without_oracle_policy_decides_label() {
        let heuristic = subsystem(FallbackPolicy::Heuristic);
        let outcome = heuristic.classify("人事担当").await;
        assert_eq!(
            outcome,
            ClassificationOutcome::Fallback {
                label: "人事、給与、労務、採用".to_string(),
                reason: FallbackReason::OracleUnavailable,
            }
        );

        let fixed = subsystem(FallbackPolicy::DefaultLabel);
        assert_eq!(fixed.classify("人事担当").await.label(), "その他営業関連職");
        assert_eq!(fixed.stats().fallbacks, 1);
        assert_eq!(fixed.stats().oracle_calls, 0);
    }
}
