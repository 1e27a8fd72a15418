// Trade matching: tolerance bands, 1-for-1 and N-for-1 searches, and the
// request-level orchestration that ties them to package valuation.

pub mod band;
pub mod combo;
pub mod single;
pub mod suggest;
