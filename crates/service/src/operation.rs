use std::fmt;

use crate::outcome::Outcome;

/// The six CRUD verbs every kind supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    ReadOne,
    ReadAll,
    Update,
    DeleteOne,
    DeleteAll,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Create,
        Operation::ReadOne,
        Operation::ReadAll,
        Operation::Update,
        Operation::DeleteOne,
        Operation::DeleteAll,
    ];

    /// Whether the operation mutates the store.
    pub fn is_write(self) -> bool {
        !matches!(self, Operation::ReadOne | Operation::ReadAll)
    }

    /// Whether the operation addresses a single id.
    pub fn is_item(self) -> bool {
        matches!(self, Operation::ReadOne | Operation::Update | Operation::DeleteOne)
    }

    /// Whether a resource body must be decoded from the request.
    pub fn needs_body(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }

    pub fn success_outcome(self) -> Outcome {
        match self {
            Operation::Create => Outcome::Created,
            _ => Outcome::Ok,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::ReadOne => "read_one",
            Operation::ReadAll => "read_all",
            Operation::Update => "update",
            Operation::DeleteOne => "delete_one",
            Operation::DeleteAll => "delete_all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_consistent() {
        let writes: Vec<_> = Operation::ALL.iter().filter(|op| op.is_write()).collect();
        assert_eq!(writes.len(), 4);

        for op in Operation::ALL {
            // every verb carrying a body is a write
            if op.needs_body() {
                assert!(op.is_write());
            }
        }
        assert!(Operation::Update.is_item());
        assert!(!Operation::DeleteAll.is_item());
        assert_eq!(Operation::Create.success_outcome(), Outcome::Created);
        assert_eq!(Operation::DeleteOne.success_outcome(), Outcome::Ok);
    }
}
