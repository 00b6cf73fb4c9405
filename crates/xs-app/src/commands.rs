use std::io::{self, Write};

use xs_terminal::CommandOutput;

/// Prompt printed before every input line.
pub const PROMPT: &str = "xs@web:~$ ";

/// ANSI sequence clearing the screen and homing the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Write a command result to the terminal.
pub fn process_command_output(
    result: xs_types::error::Result<CommandOutput>,
    out: &mut impl Write,
) -> io::Result<()> {
    match result {
        Ok(CommandOutput::Text(text)) => {
            for l in text.lines() {
                writeln!(out, "{l}")?;
            }
        },
        Ok(CommandOutput::Clear) => write!(out, "{CLEAR_SCREEN}")?,
        Ok(CommandOutput::None) => {},
        Err(e) => writeln!(out, "[err] {e}")?,
    }
    out.flush()
}

/// Whether the line ends the session.
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use xs_types::error::XsError;

    use super::*;

    fn render(result: xs_types::error::Result<CommandOutput>) -> String {
        let mut buf = Vec::new();
        process_command_output(result, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_is_written_line_by_line() {
        assert_eq!(render(Ok(CommandOutput::Text("a\nb".into()))), "a\nb\n");
    }

    #[test]
    fn none_writes_nothing() {
        assert_eq!(render(Ok(CommandOutput::None)), "");
    }

    #[test]
    fn clear_emits_ansi() {
        assert_eq!(render(Ok(CommandOutput::Clear)), CLEAR_SCREEN);
    }

    #[test]
    fn errors_are_prefixed() {
        let out = render(Err(XsError::NotFound("/nope".into())));
        assert_eq!(out, "[err] not found: /nope\n");
    }

    #[test]
    fn exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("  quit "));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("ls"));
    }
}
