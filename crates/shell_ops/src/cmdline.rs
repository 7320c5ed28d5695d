//! Command-line splitting for configured commands and `execute` parameters

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandLineError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("trailing escape character")]
    TrailingEscape,
}

/// Split a command line into words.
///
/// Whitespace separates words; single and double quotes group them. On Unix
/// a backslash escapes the next character outside single quotes. On Windows
/// backslashes are path separators and stay literal.
pub fn split_command_line(line: &str) -> Result<Vec<String>, CommandLineError> {
    let escapes = cfg!(not(windows));
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                in_word = true;
                let quote = c;
                loop {
                    match chars.next() {
                        Some(q) if q == quote => break,
                        Some('\\') if escapes && quote == '"' => match chars.next() {
                            Some(next) => current.push(next),
                            None => return Err(CommandLineError::UnterminatedQuote(quote)),
                        },
                        Some(other) => current.push(other),
                        None => return Err(CommandLineError::UnterminatedQuote(quote)),
                    }
                }
            }
            '\\' if escapes => {
                in_word = true;
                match chars.next() {
                    Some(next) => current.push(next),
                    None => return Err(CommandLineError::TrailingEscape),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(
            split_command_line("  firefox --new-tab  url ").unwrap(),
            vec!["firefox", "--new-tab", "url"]
        );
        assert!(split_command_line("   ").unwrap().is_empty());
    }

    #[test]
    fn test_quotes_group() {
        assert_eq!(
            split_command_line("mybrowser 'https://a.b/c?d=e f'").unwrap(),
            vec!["mybrowser", "https://a.b/c?d=e f"]
        );
        assert_eq!(
            split_command_line("\"C:/Program Files/app.exe\" -x").unwrap(),
            vec!["C:/Program Files/app.exe", "-x"]
        );
        assert_eq!(split_command_line("''").unwrap(), vec![""]);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            split_command_line("app 'oops"),
            Err(CommandLineError::UnterminatedQuote('\''))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_escapes() {
        assert_eq!(
            split_command_line(r"a\ b c").unwrap(),
            vec!["a b", "c"]
        );
        assert_eq!(split_command_line(r"x\"), Err(CommandLineError::TrailingEscape));
    }
}
