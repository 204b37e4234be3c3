//! # Pack-Configuration Source Arbiter
//!
//! Reconciles pack-configuration candidates coming from the pattern cascade
//! ("parsed"), from historical brand lookups ("learned"), and from web
//! search ("web_search"), selecting exactly one per invocation.
//!
//! A pure function over three optional candidates; the winner keeps its
//! source tag so the UI can display provenance.

use crate::types::{Confidence, PackConfigCandidate};
use tracing::debug;

/// Select one pack-configuration candidate from the three sources
///
/// Policy: prefer `learned` over `parsed` unless `parsed` exists and the
/// learned candidate is not high confidence; prefer `web_search` only as a
/// fallback when neither `learned` nor `parsed` is present.
///
/// # Examples
///
/// ```rust
/// use invoice_mapper::arbiter::arbitrate;
///
/// assert_eq!(arbitrate(None, None, None), None);
/// ```
pub fn arbitrate(
    parsed: Option<PackConfigCandidate>,
    learned: Option<PackConfigCandidate>,
    web_search: Option<PackConfigCandidate>,
) -> Option<PackConfigCandidate> {
    if let Some(learned) = learned {
        if parsed.is_none() || learned.confidence == Some(Confidence::High) {
            debug!(
                confidence = ?learned.confidence,
                sample_count = ?learned.sample_count,
                "Arbiter chose learned candidate"
            );
            return Some(learned);
        }
    }
    if let Some(parsed) = parsed {
        debug!("Arbiter chose parsed candidate");
        return Some(parsed);
    }
    if web_search.is_some() {
        debug!("Arbiter fell back to web-search candidate");
    }
    web_search
}
