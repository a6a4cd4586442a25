//! Query translation orchestrator
//!
//! Ties the pipeline together: availability gate, cache lookup, prompt
//! construction, the timeout-bounded model call, response validation, and
//! the write-through cache update. The public surface never fails — every
//! internal error degrades to an empty predicate list, so a broken query
//! adds zero filters instead of breaking the caller's listing.

use crate::cache::CacheStore;
use crate::client::{Availability, GenerationParams, ModelClient, ModelError};
use crate::config::Config;
use crate::locale::{self, Locale};
use crate::{parse, prompt};
use nlfilter_predicate::{fingerprint, OperatorSet, Predicate};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a translation attempt produced no result. Callers only ever see the
/// empty list; the category lands in the logs.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

/// Per-call processing state. Built fresh for every query; nothing here is
/// shared across concurrent calls.
struct ProcessingContext<'a> {
    locale: Locale,
    query: &'a str,
    columns: &'a [String],
}

/// Facade translating free-text queries into validated predicate lists.
///
/// The model client and cache store are injected at construction; there is
/// no runtime service lookup and no fallback construction.
pub struct QueryTranslator {
    client: Arc<dyn ModelClient>,
    cache: Arc<dyn CacheStore>,
    config: Config,
    operators: OperatorSet,
    default_locale: Locale,
}

impl QueryTranslator {
    pub fn new(client: Arc<dyn ModelClient>, cache: Arc<dyn CacheStore>, config: Config) -> Self {
        let operators = config.validation.operator_set();
        let default_locale = config.default_locale;
        Self {
            client,
            cache,
            config,
            operators,
            default_locale,
        }
    }

    /// Whether the backend can take requests right now. Logs the failing
    /// condition so operators can diagnose misconfiguration.
    pub fn availability(&self) -> Availability {
        let availability = if self.config.model.model.trim().is_empty() {
            Availability::unavailable("model id is not configured")
        } else {
            self.client.availability()
        };

        if let Availability::Unavailable { reason } = &availability {
            tracing::warn!(%reason, "backend unavailable");
        }
        availability
    }

    /// True iff the backend is available and the trimmed query's Unicode
    /// character length is within the configured bounds. Never fails.
    pub fn can_process(&self, query: &str) -> bool {
        if !self.availability().is_available() {
            return false;
        }

        let query = query.trim();
        let length = query.chars().count();

        !query.is_empty()
            && length >= self.config.validation.min_length
            && length <= self.config.validation.max_length
    }

    /// Translate a query into predicates, serving from cache when possible.
    ///
    /// Fail-open-to-nothing: any failure along the way yields an empty
    /// list. Empty results are deliberately not cached so a transient
    /// backend hiccup is retried on the next identical query instead of
    /// being frozen for the TTL window.
    pub async fn process_query(&self, query: &str, columns: &[String]) -> Vec<Predicate> {
        let context = ProcessingContext {
            locale: locale::detect(query).unwrap_or(self.default_locale),
            query: query.trim(),
            columns,
        };

        if let Availability::Unavailable { reason } = self.availability() {
            tracing::warn!(query = context.query, %reason, "cannot process query");
            return Vec::new();
        }

        let cache_key = fingerprint(
            context.query,
            context.columns,
            context.locale.as_tag(),
            &self.config.cache.prefix,
        );

        if self.config.cache.enabled {
            if let Some(cached) = self.cache.get(&cache_key).await {
                tracing::info!(query = context.query, "using cached result");
                return cached;
            }
        }

        match self.translate(&context).await {
            Ok(predicates) => {
                if self.config.cache.enabled && !predicates.is_empty() {
                    let ttl = Duration::from_secs(self.config.cache.ttl_secs);
                    self.cache.put(&cache_key, predicates.clone(), ttl).await;
                }
                tracing::info!(
                    query = context.query,
                    locale = %context.locale,
                    result_count = predicates.len(),
                    "processed query"
                );
                predicates
            }
            Err(error) => {
                tracing::error!(
                    query = context.query,
                    columns = ?context.columns,
                    %error,
                    "translation failed, applying no filters"
                );
                Vec::new()
            }
        }
    }

    async fn translate(
        &self,
        context: &ProcessingContext<'_>,
    ) -> Result<Vec<Predicate>, TranslateError> {
        let system = prompt::system_prompt(&self.operators, context.locale);
        let user = prompt::user_prompt(context.query, context.columns);
        let params = GenerationParams::from(&self.config.model);

        let timeout = Duration::from_secs(self.config.model.timeout_secs);
        let raw = tokio::time::timeout(timeout, self.client.complete(&system, &user, &params))
            .await
            .map_err(|_| TranslateError::Timeout(timeout))??;

        Ok(parse::parse_predicates(&raw, &self.operators))
    }

    /// Set the locale used for cache keys and prompt hints when detection
    /// finds nothing in the query text.
    pub fn set_locale(&mut self, tag: &str) {
        match Locale::from_tag(tag) {
            Some(locale) => self.default_locale = locale,
            None => {
                tracing::warn!(tag, current = %self.default_locale, "unknown locale tag, keeping current locale");
            }
        }
    }

    /// Wire names of the enabled operators, in canonical order.
    pub fn supported_filter_types(&self) -> Vec<&'static str> {
        self.operators.names()
    }

    pub fn operator_set(&self) -> &OperatorSet {
        &self.operators
    }
}
