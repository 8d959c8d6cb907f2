/// Outcome of asking a room to admit a participant. The three cases are
/// mutually exclusive and exhaustive for any join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    Full,
}
