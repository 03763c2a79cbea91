//! Session-stored admin state.

/// Session keys for admin authentication data.
pub mod keys {
    /// Set to `true` once the admin has logged in.
    pub const ADMIN_AUTHENTICATED: &str = "admin_authenticated";
}
