pub mod api;

/// User id 1 is the root account: it is always an administrator and can
/// never be banned or deleted. The flag is re-asserted at every startup.
pub const ROOT_USER_ID: i64 = 1;
