//! Interactive questions on the terminal.

use std::io::{self, BufRead, Write};

use cyber_elx_core::Confirm;

/// Asks confirmation questions on stdin/stdout.
///
/// Overwrite questions default to no, upload questions default to yes.
/// When stdin is closed the default answer is used.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(&self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{} {} ", question, hint);
        if io::stdout().flush().is_err() {
            return default;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                println!();
                default
            }
            Ok(_) => parse_answer(&input, default),
        }
    }
}

impl Confirm for TerminalPrompt {
    fn confirm_overwrite(&mut self, path: &str, reason: &str) -> bool {
        self.ask(&format!("{} {}. Overwrite?", path, reason), false)
    }

    fn confirm_upload(&mut self, path: &str, reason: &str) -> bool {
        self.ask(&format!("{} {}. Upload anyway?", path, reason), true)
    }
}

/// Interprets a yes/no answer; anything unrecognized gives the default.
pub fn parse_answer(input: &str, default: bool) -> bool {
    let answer = input.trim();
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        true
    } else if answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no") {
        false
    } else {
        default
    }
}

/// Prints `question` and reads one line of input.
pub fn read_line(question: &str) -> io::Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no input available",
        ));
    }
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y\n", false));
        assert!(parse_answer("YES", false));
        assert!(!parse_answer("n", true));
        assert!(!parse_answer(" No \n", true));
    }

    #[test]
    fn test_parse_answer_falls_back_to_default() {
        assert!(parse_answer("\n", true));
        assert!(!parse_answer("", false));
        assert!(!parse_answer("maybe", false));
    }
}
