//! Natural-language filter translation engine
//!
//! Turns a free-text query (in any language) into an ordered list of
//! structured filter predicates by delegating interpretation to a remote
//! LLM backend, then validating, normalizing and caching the result.
//!
//! The pipeline, leaves first: locale detection ([`locale`]), prompt
//! construction ([`prompt`]), the model client boundary ([`client`]),
//! response parsing/validation ([`parse`]), the injected cache store
//! ([`cache`]) and the orchestrating [`QueryTranslator`].
//!
//! Every failure inside the pipeline degrades to "apply no filters" —
//! a broken or unanswerable query never breaks the surrounding listing.

pub mod cache;
pub mod client;
pub mod config;
pub mod locale;
pub mod logging;
pub mod parse;
pub mod prompt;
pub mod translator;

pub use nlfilter_predicate::{
    fingerprint, FilterOperator, FilterValue, OperatorSet, Predicate, ValueShape,
};

pub use cache::{CacheStore, MemoryCache};
pub use client::{Availability, GenerationParams, ModelClient, ModelError, OpenAiClient};
pub use config::{CacheConfig, Config, ConfigError, LoggingConfig, ModelConfig, ValidationConfig};
pub use locale::Locale;
pub use translator::{QueryTranslator, TranslateError};
