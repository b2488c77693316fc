/// What a handle can ask of the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Invite the other member to a call.
    StartCall,
    /// Accept the invitation we are ringing with.
    AcceptCall,
    /// Decline the invitation we are ringing with.
    RejectCall,
    /// Hang up. A no-op when no call is underway.
    EndCall,
    /// After `ended` or `rejected`, start over with a fresh attempt.
    Rejoin,
    /// Tear everything down and stop the loop.
    Shutdown,
}
