//! Endpoint discovery: ordered candidates, tiered fallback, adaptive memo.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{QuizError, Result};
use crate::fetch::{FetchResponse, Fetcher};

/// Priority group of a candidate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
	/// Preferred routes, tried first.
	Primary,
	/// Legacy and alternate route shapes.
	Fallback,
}

/// One candidate backend route for a logical resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
	/// Fully-built request URL.
	pub url: String,
	/// Priority group.
	pub tier: Tier,
}

/// Memory of which route shape worked per logical resource.
///
/// Advisory only: concurrent resolutions may race on the write and the last
/// writer wins; a stale memo costs one extra request. Owned by the caller,
/// typically one per client — there is no global instance.
#[derive(Debug, Default)]
pub struct ResolverMemo {
	preferred: Mutex<HashMap<String, String>>,
}

impl ResolverMemo {
	/// Create an empty memo.
	pub fn new() -> Self {
		Self::default()
	}

	/// The remembered URL for a resource, if any.
	pub fn preferred(&self, resource: &str) -> Option<String> {
		self.preferred.lock().get(resource).cloned()
	}

	/// Remember the URL that worked for a resource.
	pub fn remember(&self, resource: &str, url: &str) {
		self.preferred
			.lock()
			.insert(resource.to_owned(), url.to_owned());
	}
}

/// Logical resource key for the questions of one chapter.
pub fn chapter_resource(chapter_id: &str) -> String {
	format!("chapter-questions:{chapter_id}")
}

/// Candidate routes for the questions of one chapter, in resolution order.
///
/// A previously successful route (from `memo`) is promoted to the front as
/// a primary candidate; the remaining candidates keep their documented
/// order: the current route first, then singular/plural and RESTful
/// variants.
pub fn chapter_question_candidates(
	base_url: &str,
	chapter_id: &str,
	memo: &ResolverMemo,
) -> Vec<EndpointCandidate> {
	let primary = [format!(
		"{base_url}/api/ai/quiz/questions/chapter/{chapter_id}?fresh=1"
	)];
	let fallback = [
		format!("{base_url}/api/quiz/questions/chapter/{chapter_id}"),
		format!("{base_url}/api/questions/chapter/{chapter_id}"),
		format!("{base_url}/api/quiz/chapters/{chapter_id}/questions"),
		format!("{base_url}/api/quiz/question/chapter/{chapter_id}"),
	];

	let mut candidates = Vec::with_capacity(primary.len() + fallback.len() + 1);
	let preferred = memo.preferred(&chapter_resource(chapter_id));
	if let Some(url) = &preferred {
		candidates.push(EndpointCandidate {
			url: url.clone(),
			tier: Tier::Primary,
		});
	}
	for url in primary {
		if preferred.as_deref() != Some(url.as_str()) {
			candidates.push(EndpointCandidate {
				url,
				tier: Tier::Primary,
			});
		}
	}
	for url in fallback {
		if preferred.as_deref() != Some(url.as_str()) {
			candidates.push(EndpointCandidate {
				url,
				tier: Tier::Fallback,
			});
		}
	}
	candidates
}

/// A successful resolution: the response and the candidate that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
	/// The successful response.
	pub response: FetchResponse,
	/// The candidate that answered.
	pub candidate: EndpointCandidate,
}

/// Walk `candidates` in order until one returns a usable response.
///
/// All primary candidates are tried before any fallback candidate. A `404`
/// or `400` advances to the next candidate within the tier; any other
/// failure (error status or transport error) abandons the rest of the tier.
/// The first success is memoized as the preferred route for `resource`.
///
/// # Errors
///
/// [`QuizError::EndpointExhausted`] when no candidate succeeded.
pub async fn resolve<F: Fetcher>(
	resource: &str,
	candidates: &[EndpointCandidate],
	fetcher: &F,
	memo: &ResolverMemo,
) -> Result<Resolved> {
	for tier in [Tier::Primary, Tier::Fallback] {
		for candidate in candidates.iter().filter(|c| c.tier == tier) {
			match fetcher.get(&candidate.url).await {
				Ok(response) if response.is_success() => {
					debug!(url = %candidate.url, "endpoint resolved");
					memo.remember(resource, &candidate.url);
					return Ok(Resolved {
						response,
						candidate: candidate.clone(),
					});
				}
				Ok(response) if matches!(response.status, 404 | 400) => {
					debug!(url = %candidate.url, status = response.status, "candidate missing, trying next");
				}
				Ok(response) => {
					warn!(url = %candidate.url, status = response.status, "candidate failed, abandoning tier");
					break;
				}
				Err(err) => {
					warn!(url = %candidate.url, error = %err, "candidate unreachable, abandoning tier");
					break;
				}
			}
		}
	}
	warn!(resource, "every endpoint candidate failed");
	Err(QuizError::EndpointExhausted {
		resource: resource.to_owned(),
	})
}
