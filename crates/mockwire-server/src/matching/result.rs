//! Outcome of evaluating stubs against a request.

use crate::mapping::StubMapping;

/// Which criterion a diff record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffCriterion {
    Query,
    Header,
}

/// How a criterion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// The request carries no value at all for the name
    NotPresent,
    /// The request carries values, but not the expected ones
    Mismatch,
}

/// One failed query parameter or header matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDiff {
    pub criterion: DiffCriterion,
    pub kind: DiffKind,
    pub name: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// Per-criterion evaluation of a single stub.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub method: bool,
    pub url: bool,
    pub query: bool,
    pub body: bool,
    pub headers: bool,
    pub diffs: Vec<MatchDiff>,
}

impl Evaluation {
    pub fn matched(&self) -> bool {
        self.method && self.url && self.query && self.body && self.headers
    }

    /// Weighted closeness used to pick the near-miss stub.
    pub fn diagnostic_score(&self) -> u32 {
        let mut score = 0;
        if self.method {
            score += 1;
        }
        if self.url {
            score += 2;
        }
        if self.query {
            score += 4;
        }
        if self.body {
            score += 8;
        }
        if self.headers {
            score += 16;
        }
        score
    }
}

/// Result of [`find_best_match`](super::find_best_match).
///
/// When `matched` is true `stub` is the selected stub. Otherwise `stub` is the
/// closest near-miss, or `None` when no stub scored at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    /// Position of `stub` in the repository
    pub index: Option<usize>,
    pub stub: Option<StubMapping>,
    pub evaluation: Evaluation,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn query_diffs(&self) -> impl Iterator<Item = &MatchDiff> {
        self.evaluation
            .diffs
            .iter()
            .filter(|d| d.criterion == DiffCriterion::Query)
    }

    pub fn header_diffs(&self) -> impl Iterator<Item = &MatchDiff> {
        self.evaluation
            .diffs
            .iter()
            .filter(|d| d.criterion == DiffCriterion::Header)
    }

    /// Body patterns were evaluated and failed
    pub fn body_mismatch(&self) -> bool {
        self.stub.is_some() && !self.evaluation.body
    }
}
