use std::env;

/// Reads an environment variable and splits it into trimmed, non-empty entries.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `delimiter`: The character separating entries.
///
/// # Returns
/// - `None` when the variable is unset or contains no entries, so callers can
///   fall back to their defaults.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Option<Vec<String>> {
    let raw = env::var(var).ok()?;
    let entries: Vec<String> = raw
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

/// Reads a single trimmed, non-empty environment variable.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_skips_blank_entries() {
        env::set_var("MARQUEE_TEST_SPLIT", " seoul ; ;busan;");
        assert_eq!(
            get_env_var_as_vec("MARQUEE_TEST_SPLIT", ';'),
            Some(vec!["seoul".to_string(), "busan".to_string()])
        );

        env::set_var("MARQUEE_TEST_SPLIT_EMPTY", " ; ");
        assert_eq!(get_env_var_as_vec("MARQUEE_TEST_SPLIT_EMPTY", ';'), None);
        assert_eq!(get_env_var_as_vec("MARQUEE_TEST_SPLIT_UNSET", ';'), None);
    }
}
