//! Replica pool and replica selection

use std::ops::Index;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::{Error, Result};

/// Non-empty set of replicas.
///
/// Selection is stateless: every call draws from the thread-local RNG, so the
/// pool can be shared between any number of concurrent call chains without
/// locking and without a shared cursor.
#[derive(Debug, Clone)]
pub struct ReplicaPool<T> {
   replicas: Vec<T>,
   weights: Option<WeightedIndex<u32>>,
}

impl<T> ReplicaPool<T> {
   /// Build a pool that picks uniformly among `replicas`.
   ///
   /// Fails with [`Error::NoReplicas`] when `replicas` is empty.
   pub fn new(replicas: Vec<T>) -> Result<Self> {
      if replicas.is_empty() {
         return Err(Error::NoReplicas);
      }

      Ok(Self {
         replicas,
         weights: None,
      })
   }

   /// Build a pool that picks replicas in proportion to their weight.
   ///
   /// A replica with weight zero is never selected, but at least one weight
   /// must be non-zero. The weights must sum to at most `u32::MAX`.
   pub fn weighted(replicas: Vec<(T, u32)>) -> Result<Self> {
      if replicas.is_empty() {
         return Err(Error::NoReplicas);
      }

      let (replicas, weights): (Vec<T>, Vec<u32>) = replicas.into_iter().unzip();
      // WeightedIndex sums in u32 without an overflow check
      weights
         .iter()
         .try_fold(0u32, |total, weight| total.checked_add(*weight))
         .ok_or(Error::InvalidWeights)?;
      let weights = WeightedIndex::new(weights).map_err(|_| Error::InvalidWeights)?;

      Ok(Self {
         replicas,
         weights: Some(weights),
      })
   }

   /// Pick the index of a replica.
   pub fn select_index(&self) -> usize {
      let mut rng = rand::thread_rng();
      match &self.weights {
         Some(weights) => weights.sample(&mut rng),
         None => rng.gen_range(0..self.replicas.len()),
      }
   }

   /// Pick a replica.
   pub fn select(&self) -> &T {
      &self.replicas[self.select_index()]
   }

   pub fn get(&self, index: usize) -> Option<&T> {
      self.replicas.get(index)
   }

   pub fn len(&self) -> usize {
      self.replicas.len()
   }

   /// Always false; kept for API symmetry with `len`.
   pub fn is_empty(&self) -> bool {
      self.replicas.is_empty()
   }

   pub fn iter(&self) -> impl Iterator<Item = &T> {
      self.replicas.iter()
   }
}

impl<T> Index<usize> for ReplicaPool<T> {
   type Output = T;

   fn index(&self, index: usize) -> &T {
      &self.replicas[index]
   }
}
