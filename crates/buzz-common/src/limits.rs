//! Centralized limits and thresholds for the buzz compiler front end.
//!
//! These constants are observable: they appear in diagnostics ("Can't have
//! more than 255 local variables") and the 255 caps match the byte-code
//! layer's single-byte slot encoding, so they must not drift per call site.

/// Maximum number of local variables per function frame.
///
/// Local slots are encoded as a single byte in the byte-code layer, so a
/// frame can address at most 255 slots.
pub const MAX_LOCALS: usize = 255;

/// Maximum number of upvalues (captured variables) per function frame.
pub const MAX_UPVALUES: usize = 255;

/// Maximum number of parameters in a function signature.
pub const MAX_PARAMETERS: usize = 255;

/// Maximum number of inline `catch` clauses attached to one call.
pub const MAX_CATCH_CLAUSES: usize = 255;

/// Deepest token look-ahead the grammar requires.
///
/// Distinguishing a user-typed declaration (`Prefix.Type variable = ...`)
/// from an expression statement needs three tokens past `current`.
pub const MAX_LOOKAHEAD: usize = 3;

/// Number of source lines shown above the caret in rendered diagnostics.
pub const DIAGNOSTIC_CONTEXT_LINES: u32 = 3;
