//! CLI Exit Code Registry
//!
//! Single source of truth for `multimarca` exit codes. Scripts that drive
//! monthly reconciliations branch on these, so a code never changes meaning.
//!
//! | Code | Name                  | Triggered by                                      |
//! |------|-----------------------|---------------------------------------------------|
//! | 0    | `EXIT_SUCCESS`        | Command completed                                 |
//! | 1    | `EXIT_ERROR`          | Unexpected failure (serialization, export write)  |
//! | 2    | `EXIT_USAGE`          | Bad arguments (clap also exits 2 on parse errors) |
//! | 3    | `EXIT_INVALID_CONFIG` | Config TOML unparseable or fails validation       |
//! | 4    | `EXIT_FILE_READ`      | Config or data file missing / unreadable          |
//! | 5    | `EXIT_MISSING_MAPPING`| Required field unmapped, or mapped column absent  |
//! | 6    | `EXIT_NO_ACTIVE`      | Master roster empty for the selected cycle        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant with the next free number
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Config file is not valid TOML, has unknown keys, names an unknown brand,
/// or names the same brand twice.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// A config or data file could not be read or parsed.
pub const EXIT_FILE_READ: u8 = 4;

/// A required semantic field has no column, or a mapped column is not in
/// the file's header row.
pub const EXIT_MISSING_MAPPING: u8 = 5;

/// No active accounts in the master file for the selected cycle.
/// JSON output is still written so the empty result can be inspected.
pub const EXIT_NO_ACTIVE: u8 = 6;
