//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (invalid input, rejected state change)
pub const DATAERR: i32 = 65;

/// Cannot open input (unknown id or username)
pub const NOINPUT: i32 = 66;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Can't create output file
pub const CANTCREAT: i32 = 73;

/// Input/output error
pub const IOERR: i32 = 74;

/// Permission denied (bad credentials, wrong role)
pub const NOPERM: i32 = 77;

/// Configuration error
pub const CONFIG: i32 = 78;
