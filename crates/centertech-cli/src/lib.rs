//! Centertech CLI Library
//!
//! Terminal front end for the storefront utility layer: session role and
//! token, the local user store, the draw countdown, and the admin users
//! listing from the remote service.

pub mod countdown_cmd;
pub mod remote_cmd;
pub mod sanitize_cmd;
pub mod session_cmd;
pub mod users_cmd;
