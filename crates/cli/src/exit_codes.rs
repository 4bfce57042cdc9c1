//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | link             | Config, schema and file I/O failures     |
//! | 10-19   | rate             | AI provider codes                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own parse failures.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Link (3-9)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// A source lacks one or more required columns. Nothing was processed.
pub const EXIT_MISSING_COLUMNS: u8 = 4;

/// An input could not be read or an output could not be written.
pub const EXIT_IO: u8 = 5;

// =============================================================================
// Rate (10-19)
// =============================================================================

/// No API key from --api-key, STORELINK_OPENAI_KEY or the key file.
pub const EXIT_MISSING_KEY: u8 = 10;
