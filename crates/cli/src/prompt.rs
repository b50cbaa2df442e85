//! Interactive confirmation on the terminal.

use std::io::{self, BufRead, Write};

use sonique_app::confirm::Confirmer;

/// Asks on stderr and reads one line from stdin. Anything but an explicit
/// yes declines, including a closed stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [o/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("o\n"));
        assert!(is_yes(" Oui "));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("non"));
        assert!(!is_yes("peut-être"));
    }
}
