//! Boundary checks for front-end input
//!
//! Lengths are counted in Unicode scalar values after trimming.

use crate::error::{Error, Result};

pub const PROMPT_MIN_CHARS: usize = 5;
pub const PROMPT_MAX_CHARS: usize = 300;
pub const OPTION_MIN_CHARS: usize = 1;
pub const OPTION_MAX_CHARS: usize = 150;

pub fn validate_prompt(prompt: &str) -> Result<()> {
    check_length("prompt", prompt, PROMPT_MIN_CHARS, PROMPT_MAX_CHARS)
}

pub fn validate_option(field: &'static str, option: &str) -> Result<()> {
    check_length(field, option, OPTION_MIN_CHARS, OPTION_MAX_CHARS)
}

fn check_length(field: &'static str, text: &str, min: usize, max: usize) -> Result<()> {
    let len = text.trim().chars().count();
    if !(min..=max).contains(&len) {
        return Err(Error::Validation {
            field,
            reason: format!("length {} is outside {}..={}", len, min, max),
        });
    }
    Ok(())
}
