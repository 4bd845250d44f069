use std::io::BufRead;

use console::Term;
use log::warn;

use crate::error::Result;
use crate::host::{Notifier, Prompter};

use super::styling::{highlight, level_tag, muted};

/// Prints notifications to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        eprintln!("{} {message}", level_tag("info"));
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {message}", level_tag("warn"));
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", level_tag("error"));
    }
}

/// Numbered picker read from the terminal.
///
/// Accepts an index, an exact name, or a fragment matching exactly one
/// entry. An empty line cancels.
pub struct ConsolePrompter {
    term: Term,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePrompter {
    /// Reads one answer. Without a terminal the answer comes from stdin, so
    /// redirected stderr or piped input still work.
    fn read_choice(&self) -> Result<String> {
        if self.term.is_term() {
            return Ok(self.term.read_line()?);
        }

        let line = read_line_from(&mut std::io::stdin().lock())?;
        if line.is_empty() {
            warn!("No project selection on standard input");
        }
        Ok(line)
    }

    fn pick<F>(&self, prompt: &str, items: &[String], mut read: F) -> Result<Option<String>>
    where
        F: FnMut() -> Result<String>,
    {
        for (index, item) in items.iter().enumerate() {
            self.term
                .write_line(&format!("  {:>3}  {}", highlight(index + 1), item))?;
        }

        loop {
            self.term
                .write_str(&format!("{} {} ", prompt, muted("(number or name, empty to cancel):")))?;
            let input = read()?;

            match resolve_choice(&input, items) {
                Choice::Cancel => return Ok(None),
                Choice::Picked(item) => return Ok(Some(item.to_owned())),
                Choice::Ambiguous(count) => {
                    self.term
                        .write_line(&format!("'{}' matches {count} projects", input.trim()))?;
                }
                Choice::NoMatch => {
                    self.term
                        .write_line(&format!("No project matches '{}'", input.trim()))?;
                }
            }
        }
    }
}

impl Prompter for ConsolePrompter {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<String>> {
        self.pick(prompt, items, || self.read_choice())
    }
}

/// One line without its terminator; empty at end of input.
fn read_line_from(reader: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[derive(Debug, PartialEq, Eq)]
enum Choice<'a> {
    Cancel,
    Picked(&'a str),
    Ambiguous(usize),
    NoMatch,
}

fn resolve_choice<'a>(input: &str, items: &'a [String]) -> Choice<'a> {
    let input = input.trim();
    if input.is_empty() {
        return Choice::Cancel;
    }

    if let Ok(number) = input.parse::<usize>() {
        if let Some(item) = number.checked_sub(1).and_then(|i| items.get(i)) {
            return Choice::Picked(item);
        }
    }

    if let Some(item) = items.iter().find(|item| item.as_str() == input) {
        return Choice::Picked(item);
    }

    let needle = input.to_lowercase();
    let matches: Vec<&String> = items
        .iter()
        .filter(|item| item.to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [] => Choice::NoMatch,
        [only] => Choice::Picked(only),
        many => Choice::Ambiguous(many.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        vec![
            "egerrit/org.eclipse.egerrit".to_string(),
            "jgit/jgit".to_string(),
            "egit/egit".to_string(),
        ]
    }

    #[test]
    fn test_empty_input_cancels() {
        assert_eq!(resolve_choice("  \n", &items()), Choice::Cancel);
    }

    #[test]
    fn test_pick_by_number() {
        let items = items();
        assert_eq!(resolve_choice("2", &items), Choice::Picked("jgit/jgit"));
    }

    #[test]
    fn test_out_of_range_number_falls_back_to_name_match() {
        let items = items();
        assert_eq!(resolve_choice("0", &items), Choice::NoMatch);
        assert_eq!(resolve_choice("9", &items), Choice::NoMatch);
    }

    #[test]
    fn test_pick_by_exact_name_and_fragment() {
        let items = items();
        assert_eq!(resolve_choice("egit/egit", &items), Choice::Picked("egit/egit"));
        assert_eq!(
            resolve_choice("ORG.ECLIPSE", &items),
            Choice::Picked("egerrit/org.eclipse.egerrit")
        );
    }

    #[test]
    fn test_ambiguous_fragment() {
        let items = items();
        assert_eq!(resolve_choice("git", &items), Choice::Ambiguous(2));
        assert_eq!(resolve_choice("e", &items), Choice::Ambiguous(3));
    }

    #[test]
    fn test_piped_answers_are_read_line_by_line() {
        let mut input = std::io::Cursor::new("jgit\r\n2\n");
        assert_eq!(read_line_from(&mut input).unwrap(), "jgit");
        assert_eq!(read_line_from(&mut input).unwrap(), "2");
        assert_eq!(read_line_from(&mut input).unwrap(), "");
    }

    #[test]
    fn test_pick_retries_until_unique_answer() {
        let prompter = ConsolePrompter {
            term: Term::buffered_stderr(),
        };
        let mut answers = vec!["git", "nothing", "egit/egit"].into_iter();

        let picked = prompter
            .pick("Project", &items(), || Ok(answers.next().unwrap_or_default().to_owned()))
            .unwrap();

        assert_eq!(picked.as_deref(), Some("egit/egit"));
        assert_eq!(answers.next(), None);
    }

    #[test]
    fn test_pick_ends_on_empty_input() {
        let prompter = ConsolePrompter {
            term: Term::buffered_stderr(),
        };
        let picked = prompter.pick("Project", &items(), || Ok(String::new())).unwrap();
        assert_eq!(picked, None);
    }
}
