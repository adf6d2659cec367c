//! Exit codes returned by `sheetsum`.
//!
//! Scripts branch on these, so a code keeps its meaning once released.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | CLI usage error (bad args, missing file)           |
//! | 3    | Rule set invalid (TOML or validation error)        |
//! | 4    | A data file could not be loaded                    |
//! | 5    | History file could not be written                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required files.
pub const EXIT_USAGE: u8 = 2;

/// Rule set failed to parse or validate.
pub const EXIT_RULESET_INVALID: u8 = 3;

/// Data file unreadable, undecodable, unsupported, or the pool is full.
pub const EXIT_LOAD_FAILED: u8 = 4;

/// History file could not be written.
pub const EXIT_HISTORY_IO: u8 = 5;
