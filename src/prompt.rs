use std::io::{self, BufRead, Write};

/// Asks a yes/no `question`, defaulting to no.
///
/// Only `y` or `yes` (any case) count as consent. End of input is a no.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W, question: &str) -> io::Result<bool> {
    write!(output, "{question} [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(reply: &str) -> (bool, String) {
        let mut out = Vec::new();
        let yes = confirm(reply.as_bytes(), &mut out, "Proceed?").unwrap();
        (yes, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_yes_answers() {
        assert!(ask("y\n").0);
        assert!(ask("YES\n").0);
        assert!(ask("  Yes  \n").0);
    }

    #[test]
    fn test_no_answers() {
        assert!(!ask("n\n").0);
        assert!(!ask("\n").0);
        assert!(!ask("yep\n").0);
    }

    #[test]
    fn test_eof_is_no() {
        let (yes, out) = ask("");
        assert!(!yes);
        assert_eq!(out, "Proceed? [y/N]: \n");
    }

    #[test]
    fn test_question_written() {
        let (_, out) = ask("y\n");
        assert_eq!(out, "Proceed? [y/N]: ");
    }
}
