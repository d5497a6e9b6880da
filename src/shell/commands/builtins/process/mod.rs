pub mod exec;
pub mod sleep;

use std::time::Duration;

/// How often blocking builtins look at their cancellation token.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
