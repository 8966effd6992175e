/// Chatter auth material: password hashing, the per-request session
/// snapshot, and the authorization policy. Pure — no I/O, no web types —
/// so every decision path is testable without a server or a database.

pub mod password;
pub mod policy;
pub mod session;
