//! Consumed authentication capability.
//!
//! Identity and session establishment live in an external service; the
//! admin core only ever asks "is there an active session?" before showing
//! anything, and calls [`AuthProvider::sign_out`] on logout. Nothing else
//! crosses this seam.

/// An established operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider-assigned user id.
    pub user_id: String,
    /// Operator email, for display.
    pub email: String,
}

/// Session capability supplied by the external authentication service.
#[allow(async_fn_in_trait)]
pub trait AuthProvider: Send + Sync {
    /// The current session, if one is active.
    fn current_session(&self) -> Option<Session>;

    /// End the current session.
    async fn sign_out(&self);
}
