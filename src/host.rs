//! Capabilities the search and clone workflow needs from its surroundings.
//!
//! The terminal front end implements these in `output`; tests use recording
//! fakes.

use crate::error::Result;

/// Reports results to the user.
pub trait Notifier {
    fn info(&self, message: &str);

    /// A warning that stays visible until the user dismisses it.
    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Lets the user choose one entry from a list.
pub trait Prompter {
    /// Returns the chosen entry, or `None` when the user backs out.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<String>>;
}

/// Splits a comma-joined project list as handed to the picker.
pub fn parse_project_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn join_project_list(names: &[String]) -> String {
    names.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_list() {
        assert_eq!(
            parse_project_list("egerrit/org.eclipse.egerrit, jgit,,"),
            vec!["egerrit/org.eclipse.egerrit", "jgit"]
        );
        assert!(parse_project_list("").is_empty());
    }

    #[test]
    fn test_join_keeps_order_and_duplicates() {
        let names = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(join_project_list(&names), "b,a,b");
        assert_eq!(parse_project_list(&join_project_list(&names)), names);
    }
}
