//! Reconciles an externally held "should be presented" flag with the
//! coordinator and the host.

/// What the coordinator does after comparing the three flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The host is busy with an unrelated presentation; check again after
    /// the backoff.
    RetryAfterBackoff,
    Dismiss,
    /// The coordinator believes it is presenting but the host shows nothing.
    /// Trust the host.
    Reset,
    None,
}

/// Decide the action for one observation of the flags.
///
/// `desired && !is_presenting && !host_active` is left to the `present` path.
pub fn decide(desired: bool, is_presenting: bool, host_active: bool) -> SyncAction {
    match (desired, is_presenting, host_active) {
        (true, false, true) => SyncAction::RetryAfterBackoff,
        (true, false, false) => SyncAction::None,
        (false, true, _) => SyncAction::Dismiss,
        (true, true, false) => SyncAction::Reset,
        (true, true, true) => SyncAction::None,
        (false, false, _) => SyncAction::None,
    }
}
