//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success (at least one match, or a non-search command)    |
//! | 1    | Search ran but found no combination                      |
//! | 2    | CLI usage error (bad args, invalid search parameters)    |
//! | 3    | Input could not be parsed into any amount                |
//! | 4    | Target is unreachable (pre-check or bounds)              |
//! | 5    | Ledger conflict (item already finalized, bad index)      |
//! | 6    | I/O error (unreadable input, unwritable ledger)          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` if a `ReconError` can produce it

use combimatch_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Search completed without finding a combination.
/// Like `grep(1)`, exit 1 means "nothing matched."
pub const EXIT_NO_MATCH: u8 = 1;

/// Usage error - bad arguments, out-of-range search parameters.
pub const EXIT_USAGE: u8 = 2;

/// No amount could be read from the input.
pub const EXIT_PARSE: u8 = 3;

/// Pre-check or bounds proved no subset can reach the window.
pub const EXIT_INFEASIBLE: u8 = 4;

/// Finalizing would reuse a consumed item, or the result index is wrong.
pub const EXIT_LEDGER_CONFLICT: u8 = 5;

/// Cannot read input or write the ledger.
pub const EXIT_IO: u8 = 6;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::InvalidParams(_) => EXIT_USAGE,
        ReconError::AmountParse { .. } | ReconError::MissingColumn { .. } => EXIT_PARSE,
        ReconError::Ledger(_) => EXIT_LEDGER_CONFLICT,
        ReconError::Io(_) | ReconError::Worker(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_NO_MATCH,
            EXIT_USAGE,
            EXIT_PARSE,
            EXIT_INFEASIBLE,
            EXIT_LEDGER_CONFLICT,
            EXIT_IO,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn recon_errors_map_to_codes() {
        assert_eq!(recon_exit_code(&ReconError::InvalidParams(vec![])), EXIT_USAGE);
        assert_eq!(
            recon_exit_code(&ReconError::MissingColumn { column: "Amount".into() }),
            EXIT_PARSE
        );
        assert_eq!(recon_exit_code(&ReconError::Ledger("taken".into())), EXIT_LEDGER_CONFLICT);
        assert_eq!(recon_exit_code(&ReconError::Io("denied".into())), EXIT_IO);
    }
}
