//! Replica configuration

use std::collections::HashMap;

use replica_router::{OperationClassifier, OperationKind, ReplicaPool};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One replica URL or a list of them.
///
/// Deserializes from either a string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplicaUrls {
   One(String),
   Many(Vec<String>),
}

impl Default for ReplicaUrls {
   fn default() -> Self {
      ReplicaUrls::Many(Vec::new())
   }
}

impl ReplicaUrls {
   pub fn as_slice(&self) -> &[String] {
      match self {
         ReplicaUrls::One(url) => std::slice::from_ref(url),
         ReplicaUrls::Many(urls) => urls,
      }
   }
}

impl From<&str> for ReplicaUrls {
   fn from(url: &str) -> Self {
      ReplicaUrls::One(url.to_string())
   }
}

impl From<String> for ReplicaUrls {
   fn from(url: String) -> Self {
      ReplicaUrls::One(url)
   }
}

impl From<Vec<String>> for ReplicaUrls {
   fn from(urls: Vec<String>) -> Self {
      ReplicaUrls::Many(urls)
   }
}

impl From<Vec<&str>> for ReplicaUrls {
   fn from(urls: Vec<&str>) -> Self {
      ReplicaUrls::Many(urls.into_iter().map(str::to_string).collect())
   }
}

/// A single validated replica entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaDescriptor {
   pub url: String,
   pub weight: Option<u32>,
}

/// Read replica configuration.
///
/// # Examples
///
/// ```
/// use sqlx_read_replicas::ReplicaConfig;
///
/// let config: ReplicaConfig = serde_json::from_str(r#"{ "url": "sqlite://replica.db" }"#).unwrap();
/// assert_eq!(config.descriptors().unwrap().len(), 1);
///
/// let config: ReplicaConfig = serde_json::from_str(r#"{ "url": [] }"#).unwrap();
/// assert!(config.descriptors().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaConfig {
   /// Replica URL(s). Missing is the same as an empty list.
   #[serde(default)]
   pub url: ReplicaUrls,

   /// Optional selection weights, one per URL
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub weights: Option<Vec<u32>>,

   /// Classification overrides by operation name
   #[serde(default, skip_serializing_if = "HashMap::is_empty")]
   pub overrides: HashMap<String, OperationKind>,
}

impl ReplicaConfig {
   pub fn new(url: impl Into<ReplicaUrls>) -> Self {
      Self {
         url: url.into(),
         ..Default::default()
      }
   }

   pub fn with_weights(mut self, weights: Vec<u32>) -> Self {
      self.weights = Some(weights);
      self
   }

   pub fn with_override(mut self, name: impl Into<String>, kind: OperationKind) -> Self {
      self.overrides.insert(name.into(), kind);
      self
   }

   /// Validate the configuration and list its replicas.
   pub fn descriptors(&self) -> std::result::Result<Vec<ReplicaDescriptor>, replica_router::Error> {
      let urls = self.url.as_slice();
      if urls.is_empty() {
         return Err(replica_router::Error::NoReplicas);
      }

      match &self.weights {
         None => Ok(urls
            .iter()
            .map(|url| ReplicaDescriptor {
               url: url.clone(),
               weight: None,
            })
            .collect()),
         Some(weights) if weights.len() != urls.len() => {
            Err(replica_router::Error::WeightCountMismatch {
               replicas: urls.len(),
               weights: weights.len(),
            })
         }
         Some(weights) => Ok(urls
            .iter()
            .zip(weights)
            .map(|(url, weight)| ReplicaDescriptor {
               url: url.clone(),
               weight: Some(*weight),
            })
            .collect()),
      }
   }

   /// Classifier with this configuration's overrides applied.
   pub fn classifier(&self) -> OperationClassifier {
      OperationClassifier::new().with_overrides(
         self
            .overrides
            .iter()
            .map(|(name, kind)| (name.clone(), *kind)),
      )
   }

   /// Validate, then build one replica per descriptor.
   ///
   /// `connect` is not called at all when the configuration is invalid.
   pub fn build_pool<T, F>(&self, mut connect: F) -> Result<ReplicaPool<T>>
   where
      F: FnMut(&ReplicaDescriptor) -> Result<T>,
   {
      let descriptors = self.descriptors()?;

      if self.weights.is_some() {
         let replicas = descriptors
            .iter()
            .map(|d| -> Result<(T, u32)> { Ok((connect(d)?, d.weight.unwrap_or(1))) })
            .collect::<Result<Vec<_>>>()?;
         Ok(ReplicaPool::weighted(replicas)?)
      } else {
         let replicas = descriptors
            .iter()
            .map(&mut connect)
            .collect::<Result<Vec<_>>>()?;
         Ok(ReplicaPool::new(replicas)?)
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn test_single_url() {
      let config: ReplicaConfig = serde_json::from_value(json!({ "url": "sqlite://r1.db" })).unwrap();
      assert_eq!(
         config.descriptors().unwrap(),
         vec![ReplicaDescriptor {
            url: "sqlite://r1.db".into(),
            weight: None
         }]
      );
   }

   #[test]
   fn test_url_list_preserves_order() {
      let config = ReplicaConfig::new(vec!["a", "b", "c"]);
      let urls: Vec<String> = config
         .descriptors()
         .unwrap()
         .into_iter()
         .map(|d| d.url)
         .collect();
      assert_eq!(urls, vec!["a", "b", "c"]);
   }

   #[test]
   fn test_empty_list_and_missing_url_fail_the_same_way() {
      let empty: ReplicaConfig = serde_json::from_value(json!({ "url": [] })).unwrap();
      let missing: ReplicaConfig = serde_json::from_value(json!({})).unwrap();

      for config in [empty, missing, ReplicaConfig::default()] {
         let err = config.descriptors().unwrap_err();
         assert_eq!(err.to_string(), "At least one replica URL must be specified");
      }
   }

   #[test]
   fn test_weights_must_match_urls() {
      let config = ReplicaConfig::new(vec!["a", "b"]).with_weights(vec![1]);
      assert_eq!(
         config.descriptors().unwrap_err(),
         replica_router::Error::WeightCountMismatch {
            replicas: 2,
            weights: 1
         }
      );
   }

   #[test]
   fn test_overrides_feed_classifier() {
      let config: ReplicaConfig = serde_json::from_value(json!({
         "url": "a",
         "overrides": { "queryRaw": "read" }
      }))
      .unwrap();

      assert_eq!(config.classifier().classify("queryRaw"), OperationKind::Read);
   }

   #[test]
   fn test_build_pool_does_not_connect_when_invalid() {
      let mut calls = 0;
      let result = ReplicaConfig::default().build_pool(|d| {
         calls += 1;
         Ok(d.url.clone())
      });

      assert!(matches!(
         result,
         Err(crate::Error::Configuration(replica_router::Error::NoReplicas))
      ));
      assert_eq!(calls, 0);
   }

   #[test]
   fn test_build_pool_weighted() {
      let pool = ReplicaConfig::new(vec!["a", "b"])
         .with_weights(vec![0, 5])
         .build_pool(|d| Ok(d.url.clone()))
         .unwrap();

      assert_eq!(pool.len(), 2);
      assert_eq!(pool.select(), "b");
   }
}
