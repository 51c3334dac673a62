//! Quiz data client: endpoint discovery, cascading fallback, and payload
//! normalization.
//!
//! Backends for the quiz resource have historically exposed several route
//! shapes and several response payload shapes. This crate discovers a
//! working route among a prioritized set of candidates ([`resolve`]),
//! remembers what worked ([`ResolverMemo`]), and maps whatever payload came
//! back into one canonical record list ([`normalize`]).
//!
//! Failures degrade to explicit states instead of exceptions: exhausting
//! every candidate yields [`QuizError::EndpointExhausted`], which
//! [`QuizClient`] turns into an [`Unavailable`](FetchState::Unavailable)
//! result the caller can render, and unrecognized payload shapes yield an
//! empty list plus a reported [`NormalizeIssue`].

#![warn(missing_docs)]

mod client;
mod endpoint;
mod error;
mod fetch;
mod normalize;
mod record;

pub use client::{ChapterQuestions, FetchState, QuizClient, QuizClientConfig};
pub use endpoint::{
	EndpointCandidate, Resolved, ResolverMemo, Tier, chapter_question_candidates, chapter_resource,
	resolve,
};
pub use error::{QuizError, Result};
pub use fetch::{FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use normalize::{NormalizeIssue, Normalized, normalize, parse_options};
pub use record::{QuestionOption, QuestionRecord};
