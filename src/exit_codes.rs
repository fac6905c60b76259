//! Exit code constants for the jig CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, missing project or template, invalid spec)
//! - 2: Template or render failure
//! - 3: Shell command failure
//! - 4: Prompt failure (terminal interaction)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, unknown action.
pub const USER_ERROR: i32 = 1;

/// Template parse/evaluation failure or filesystem failure while rendering.
pub const RENDER_FAILURE: i32 = 2;

/// A shell command from an `exec` step exited unsuccessfully.
pub const SHELL_FAILURE: i32 = 3;

/// Interactive prompt could not be completed.
pub const PROMPT_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            RENDER_FAILURE,
            SHELL_FAILURE,
            PROMPT_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
