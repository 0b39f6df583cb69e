use std::fmt;

/// Transport-agnostic classification of a finished request.
///
/// The store only ever yields `Ok`, `Created` or `NotFound`; `BadRequest`
/// and `Forbidden` are produced by the dispatch pipeline before the store
/// is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Created,
    BadRequest,
    Forbidden,
    NotFound,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Created => "created",
            Outcome::BadRequest => "bad_request",
            Outcome::Forbidden => "forbidden",
            Outcome::NotFound => "not_found",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
