use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of the guard step for one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Medical,
    NonMedical,
    Unclassified,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::NonMedical => "non_medical",
            Self::Unclassified => "unclassified",
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MetricsData {
    pub language_usage: HashMap<String, u64>,
    pub topic_usage: HashMap<String, u64>,
    pub visual_analyses: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment_language(&self, lang: &str) {
        let mut data = self.inner.write().await;
        *data.language_usage.entry(lang.to_ascii_lowercase()).or_insert(0) += 1;
    }

    pub async fn increment_topic(&self, topic: Topic) {
        let mut data = self.inner.write().await;
        *data.topic_usage.entry(topic.as_str().to_string()).or_insert(0) += 1;
    }

    pub async fn increment_visual(&self) {
        self.inner.write().await.visual_analyses += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
