//! Adapter for remote knowledge-base search services.
//!
//! The network protocol lives outside this crate. A client implements
//! [`SearchClient`], and [`RemoteGenerator`] turns it into a
//! [`CandidateGenerator`] whose batch lookup is a single round trip.

use super::CandidateGenerator;
use crate::candidate::{BatchResult, CandidateSet};
use crate::error::Result;
use std::collections::HashMap;
use std::io;

/// Client for a remote knowledge-base search service.
///
/// Failures are reported as I/O errors and surface from the generator as
/// [`LinkError::Lookup`](crate::error::LinkError::Lookup). Retries, if
/// wanted, belong inside the client.
pub trait SearchClient: Send + Sync {
    /// Identifiers matching `query`, best first.
    fn search(&self, query: &str) -> io::Result<Vec<String>>;

    /// Identifiers for each query, in one request.
    ///
    /// Queries missing from the reply are treated as having no match.
    fn batch_search(&self, queries: &[String]) -> io::Result<HashMap<String, Vec<String>>>;
}

impl<C: SearchClient + ?Sized> SearchClient for std::sync::Arc<C> {
    fn search(&self, query: &str) -> io::Result<Vec<String>> {
        (**self).search(query)
    }

    fn batch_search(&self, queries: &[String]) -> io::Result<HashMap<String, Vec<String>>> {
        (**self).batch_search(queries)
    }
}

/// Candidate generator backed by a [`SearchClient`].
#[derive(Debug, Clone)]
pub struct RemoteGenerator<C> {
    client: C,
}

impl<C: SearchClient> RemoteGenerator<C> {
    /// Wraps the given client.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Gets a reference to the client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: SearchClient> CandidateGenerator for RemoteGenerator<C> {
    type Query = String;
    type Candidate = String;

    fn find_candidates(&self, query: &String) -> Result<CandidateSet<String>> {
        Ok(self.client.search(query)?.into_iter().collect())
    }

    fn batch_find_candidates(&self, queries: &[String]) -> Result<BatchResult<String, String>> {
        let mut reply = self.client.batch_search(queries)?;
        let mut results = BatchResult::with_capacity_and_hasher(queries.len(), Default::default());
        for query in queries {
            if results.contains_key(query) {
                continue;
            }
            let ids = reply.remove(query).unwrap_or_default();
            results.insert(query.clone(), ids.into_iter().collect());
        }
        Ok(results)
    }
}
