/// Exit codes of the linkshelf CLI, following the BSD convention where possible.
///
/// Successful termination
pub const SUCCESS: i32 = 0;

/// Command line usage error or failed command
pub const USAGE: i32 = 64;

/// Operation was cancelled by the user
pub const CANCEL: i32 = 130;
