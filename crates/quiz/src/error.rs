//! Quiz client error taxonomy.

/// A convenient type alias for `Result` with `E` = [`QuizError`].
pub type Result<T, E = QuizError> = std::result::Result<T, E>;

/// Hard failures of the data-fetch path.
///
/// Soft conditions (unrecognized payload shapes, unparsable option lists)
/// are reported as [`NormalizeIssue`](crate::NormalizeIssue)s instead, so a
/// partially-usable response still yields records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum QuizError {
	/// Every candidate endpoint of every tier failed.
	#[error("every candidate endpoint for `{resource}` failed")]
	EndpointExhausted {
		/// Logical resource the resolution was for.
		resource: String,
	},
}
