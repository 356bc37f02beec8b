//! Targets used with the [log] macros of this crate.
//!
//! No logger is installed by the library; binaries pick their own.

/// Strategy dispatch and per-solve summaries
pub const SOLVE: &str = "solve";

/// Events inside a search (bindings, conflicts, backtracks)
pub const SEARCH: &str = "search";

/// Instance transformations
pub const REDUCTION: &str = "reduction";

/// Text decoders
pub const PARSE: &str = "parse";
