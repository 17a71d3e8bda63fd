//! Provider abstraction and the ordered fallback chain.

use async_trait::async_trait;

use crate::error::{SearchError, SearchResult};
use crate::suggestion::PlaceSuggestion;

/// A place-search provider resolving free text to coordinate suggestions.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Provider name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Resolve `query` to ranked suggestions. An empty result is not an
    /// error; it simply lets the chain try the next provider.
    async fn search(&self, query: &str) -> SearchResult<Vec<PlaceSuggestion>>;
}

/// Providers tried in a fixed priority order until one yields results.
pub struct ProviderChain {
    providers: Vec<Box<dyn PlaceProvider>>,
}

impl ProviderChain {
    /// Build a chain from providers in priority order.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn PlaceProvider>>) -> Self {
        Self { providers }
    }

    /// Number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Query providers in order until one yields a non-empty result.
    ///
    /// Returns `Ok(vec![])` when every provider answered but none had hits.
    ///
    /// # Errors
    ///
    /// Returns the last provider error when every provider failed, or
    /// [`SearchError::NoProviders`] for an empty chain.
    pub async fn search(&self, query: &str) -> SearchResult<Vec<PlaceSuggestion>> {
        let mut last_error: Option<SearchError> = None;
        let mut any_answered = false;

        for provider in &self.providers {
            match provider.search(query).await {
                Ok(found) if found.is_empty() => {
                    tracing::debug!(provider = provider.name(), query, "no hits, trying next");
                    any_answered = true;
                }
                Ok(found) => {
                    tracing::debug!(
                        provider = provider.name(),
                        hits = found.len(),
                        query,
                        "search resolved"
                    );
                    return Ok(found);
                }
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %error,
                        "provider failed, trying next"
                    );
                    last_error = Some(error);
                }
            }
        }

        if any_answered {
            return Ok(Vec::new());
        }
        Err(last_error.unwrap_or(SearchError::NoProviders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        name: &'static str,
        outcome: fn() -> SearchResult<Vec<PlaceSuggestion>>,
    }

    #[async_trait]
    impl PlaceProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _query: &str) -> SearchResult<Vec<PlaceSuggestion>> {
            (self.outcome)()
        }
    }

    fn hit() -> PlaceSuggestion {
        PlaceSuggestion {
            id: "a_1".to_string(),
            title: "Helsinki".to_string(),
            subtitle: "Finland".to_string(),
            lat: "60.1699".to_string(),
            lon: "24.9384".to_string(),
        }
    }

    #[tokio::test]
    async fn first_provider_with_hits_wins() {
        let chain = ProviderChain::new(vec![
            Box::new(Scripted {
                name: "empty",
                outcome: || Ok(vec![]),
            }),
            Box::new(Scripted {
                name: "hits",
                outcome: || Ok(vec![hit()]),
            }),
            Box::new(Scripted {
                name: "unreachable",
                outcome: || {
                    panic!("chain must stop at the first provider with hits")
                },
            }),
        ]);

        let found = chain.search("Helsinki").await.expect("results");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Helsinki");
    }

    #[tokio::test]
    async fn failures_fall_through_to_later_providers() {
        let chain = ProviderChain::new(vec![
            Box::new(Scripted {
                name: "down",
                outcome: || {
                    Err(SearchError::Status {
                        provider: "down",
                        status: 502,
                    })
                },
            }),
            Box::new(Scripted {
                name: "hits",
                outcome: || Ok(vec![hit()]),
            }),
        ]);

        let found = chain.search("Helsinki").await.expect("results");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn all_empty_is_ok_but_empty() {
        let chain = ProviderChain::new(vec![
            Box::new(Scripted {
                name: "a",
                outcome: || Ok(vec![]),
            }),
            Box::new(Scripted {
                name: "b",
                outcome: || Ok(vec![]),
            }),
        ]);

        let found = chain.search("nowhere").await.expect("empty results");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn all_failed_returns_last_error() {
        let chain = ProviderChain::new(vec![Box::new(Scripted {
            name: "down",
            outcome: || {
                Err(SearchError::Status {
                    provider: "down",
                    status: 500,
                })
            },
        })]);

        let error = chain.search("x").await.unwrap_err();
        assert!(matches!(error, SearchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let chain = ProviderChain::new(vec![]);
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        let error = chain.search("x").await.unwrap_err();
        assert!(matches!(error, SearchError::NoProviders));
    }
}
