//! Best-match selection across all stubs.

use super::criteria::evaluate_stub;
use super::request::IncomingRequest;
use super::result::MatchResult;
use crate::mapping::{StubMapping, UrlMatch};

/// Bonus that makes any `url` exact stub outrank pattern and path stubs.
const EXACT_URL_BONUS: usize = 100;

/// How specific a stub is: one point per query, body and header matcher,
/// plus [`EXACT_URL_BONUS`] for `url` exact matching.
pub fn specificity(stub: &StubMapping) -> usize {
    let pattern = &stub.request;
    let mut score =
        pattern.query_parameters.len() + pattern.body_patterns.len() + pattern.headers.len();
    if matches!(pattern.url_match(), UrlMatch::Exact(_)) {
        score += EXACT_URL_BONUS;
    }
    score
}

/// Select the stub that best fits `request`.
///
/// Every stub is evaluated. Among full matches the highest [`specificity`]
/// wins; otherwise the highest diagnostic score wins as the near-miss. Ties go
/// to the earlier stub. A stub that matches no criterion is never reported as
/// a near-miss.
pub fn find_best_match(request: &IncomingRequest, stubs: &[StubMapping]) -> MatchResult {
    let mut best_match: Option<(usize, usize)> = None;
    let mut near_miss: Option<(usize, u32)> = None;
    let mut evaluations = Vec::with_capacity(stubs.len());

    for (index, stub) in stubs.iter().enumerate() {
        let evaluation = evaluate_stub(stub, request);
        if evaluation.matched() {
            let score = specificity(stub);
            if best_match.map_or(true, |(_, best)| score > best) {
                best_match = Some((index, score));
            }
        } else {
            let score = evaluation.diagnostic_score();
            if score > near_miss.map_or(0, |(_, best)| best) {
                near_miss = Some((index, score));
            }
        }
        evaluations.push(evaluation);
    }

    let (index, matched) = match (best_match, near_miss) {
        (Some((index, _)), _) => (index, true),
        (None, Some((index, _))) => (index, false),
        (None, None) => return MatchResult::no_match(),
    };

    MatchResult {
        matched,
        index: Some(index),
        stub: Some(stubs[index].clone()),
        evaluation: evaluations.swap_remove(index),
    }
}
