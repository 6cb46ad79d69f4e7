//! Flag combination rules.
//!
//! Rules are checked in order and the first violation wins. All of them
//! run before any file is touched.

use crate::models::RunFlags;

use super::PlanError;

/// Reject contradictory flag sets.
///
/// `default_head_available` is whether the stock head ident exists; it
/// decides whether dropping the tail still leaves a head to open with.
pub fn validate_flags(flags: &RunFlags, default_head_available: bool) -> Result<(), PlanError> {
    let custom_head = flags.custom_head.is_some();
    let custom_tail = flags.custom_tail.is_some();

    if flags.skip_bumper && (custom_head || custom_tail || flags.no_head || flags.no_tail) {
        return Err(PlanError::invalid(
            "--skip-bumper cannot be combined with --head, --tail, --no-head or --no-tail",
        ));
    }

    if flags.no_head && custom_head {
        return Err(PlanError::invalid(
            "--no-head and --head contradict each other",
        ));
    }

    if flags.no_tail && custom_tail {
        return Err(PlanError::invalid(
            "--no-tail and --tail contradict each other",
        ));
    }

    if flags.no_tail && !custom_head && !default_head_available {
        return Err(PlanError::invalid(
            "--no-tail needs a head ident, but no --head was given and the default head is missing",
        ));
    }

    // A deliverable that opens with a head ident closes with the tail block.
    if !flags.skip_bumper && flags.no_tail && !flags.no_head {
        return Err(PlanError::invalid(
            "--no-tail requires --no-head: a head ident must be followed by the tail",
        ));
    }

    Ok(())
}
