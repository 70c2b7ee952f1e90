use regex::Regex;

use super::{E2EError, E2EResult};

/// Check that `output` matches the regular expression `pattern`
pub fn assert_matches(output: &str, pattern: &str) -> E2EResult<()> {
    let re = Regex::new(pattern)
        .map_err(|e| E2EError::Config(format!("bad pattern /{}/: {}", pattern, e)))?;

    if re.is_match(output) {
        return Ok(());
    }

    Err(E2EError::Assertion {
        pattern: pattern.to_string(),
        output: output.to_string(),
    })
}
