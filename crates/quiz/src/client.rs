//! High-level quiz client: resolve, normalize, explicit outcome states.

use std::time::Duration;

use tracing::{debug, warn};

use crate::endpoint::{ResolverMemo, chapter_question_candidates, chapter_resource, resolve};
use crate::error::QuizError;
use crate::fetch::{FetchError, Fetcher, HttpFetcher};
use crate::normalize::{NormalizeIssue, normalize};
use crate::record::QuestionRecord;

/// Quiz client configuration.
#[derive(Debug, Clone)]
pub struct QuizClientConfig {
	/// Base URL prefixed to every candidate route. Empty for same-origin.
	pub base_url: String,
	/// Per-request timeout for the HTTP fetcher.
	pub request_timeout: Duration,
}

impl Default for QuizClientConfig {
	fn default() -> Self {
		Self {
			base_url: String::new(),
			request_timeout: Duration::from_secs(10),
		}
	}
}

impl QuizClientConfig {
	/// Set the base URL.
	#[must_use]
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	/// Set the per-request timeout.
	#[must_use]
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}
}

/// How a [`ChapterQuestions`] result came to be.
///
/// Callers render each state explicitly; there is no silent empty list and
/// no stale loading indicator to leave behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
	/// Records were fetched from the given endpoint.
	Loaded {
		/// The endpoint that answered.
		endpoint: String,
	},
	/// The endpoint answered but held no usable records.
	Empty {
		/// The endpoint that answered.
		endpoint: String,
	},
	/// Every candidate endpoint failed; nothing was fetched.
	Unavailable,
}

/// Questions of one chapter, with the state that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterQuestions {
	/// Canonical records, possibly empty.
	pub questions: Vec<QuestionRecord>,
	/// How the fetch ended.
	pub state: FetchState,
	/// Normalization conditions worth surfacing.
	pub issues: Vec<NormalizeIssue>,
}

/// Client for the quiz question resource.
///
/// Owns the fetcher and the per-resource endpoint memo; one instance per
/// page (or per backend) is the intended shape — the memo is deliberately
/// not global.
#[derive(Debug)]
pub struct QuizClient<F> {
	fetcher: F,
	memo: ResolverMemo,
	config: QuizClientConfig,
}

impl QuizClient<HttpFetcher> {
	/// Build a client over a real HTTP fetcher.
	///
	/// # Errors
	///
	/// [`FetchError::Client`] when the HTTP client cannot be constructed.
	pub fn http(config: QuizClientConfig) -> Result<Self, FetchError> {
		let fetcher = HttpFetcher::new(config.request_timeout)?;
		Ok(Self::with_fetcher(fetcher, config))
	}
}

impl<F: Fetcher> QuizClient<F> {
	/// Build a client over any fetcher.
	pub fn with_fetcher(fetcher: F, config: QuizClientConfig) -> Self {
		Self {
			fetcher,
			memo: ResolverMemo::new(),
			config,
		}
	}

	/// Fetch and normalize the questions of a chapter.
	///
	/// Walks the candidate endpoints for the chapter, normalizes whatever
	/// the first working one returned, and reports the outcome as an
	/// explicit [`FetchState`]. Endpoint exhaustion degrades to
	/// [`FetchState::Unavailable`] with an empty list; it never panics and
	/// never hangs.
	pub async fn chapter_questions(&self, chapter_id: &str) -> ChapterQuestions {
		let resource = chapter_resource(chapter_id);
		let candidates =
			chapter_question_candidates(&self.config.base_url, chapter_id, &self.memo);
		match resolve(&resource, &candidates, &self.fetcher, &self.memo).await {
			Ok(resolved) => {
				let normalized = normalize(&resolved.response.body, chapter_id);
				debug!(
					chapter = chapter_id,
					endpoint = %resolved.candidate.url,
					count = normalized.questions.len(),
					"chapter questions fetched"
				);
				let endpoint = resolved.candidate.url;
				let state = if normalized.questions.is_empty() {
					FetchState::Empty { endpoint }
				} else {
					FetchState::Loaded { endpoint }
				};
				ChapterQuestions {
					questions: normalized.questions,
					state,
					issues: normalized.issues,
				}
			}
			Err(QuizError::EndpointExhausted { .. }) => {
				warn!(chapter = chapter_id, "no endpoint served the chapter questions");
				ChapterQuestions {
					questions: Vec::new(),
					state: FetchState::Unavailable,
					issues: Vec::new(),
				}
			}
		}
	}

	/// The endpoint memo, for inspection.
	pub fn memo(&self) -> &ResolverMemo {
		&self.memo
	}
}
