// Shell command lines
// Lexed only far enough to find the leading executable token.

use thiserror::Error;

/// Reasons a command line cannot be tokenized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command line")]
    Empty,

    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("no character after trailing backslash")]
    TrailingBackslash,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    SingleQuoted,
    DoubleQuoted,
}

/// Split a command line into words using POSIX shell quoting rules
///
/// - whitespace separates words
/// - single quotes preserve everything literally
/// - double quotes allow `\"` and `\\` escapes, other backslashes are literal
/// - outside quotes a backslash escapes the next character
/// - adjacent quoted and unquoted segments join into one word
///
/// A line made only of whitespace yields an empty vector; callers decide
/// whether that is an error.
///
/// # Example
/// ```
/// use locus_core::domain::tokenize;
///
/// let words = tokenize(r#""/opt/my app/bin" --flag"#).unwrap();
/// assert_eq!(words, vec!["/opt/my app/bin", "--flag"]);
/// ```
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    // Tracks `""` so an empty quoted word is still emitted
    let mut in_word = false;
    let mut mode = Mode::Normal;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::Normal => match ch {
                '\'' => {
                    mode = Mode::SingleQuoted;
                    in_word = true;
                }
                '"' => {
                    mode = Mode::DoubleQuoted;
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        in_word = true;
                    }
                    None => return Err(CommandParseError::TrailingBackslash),
                },
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
            Mode::SingleQuoted => {
                if ch == '\'' {
                    mode = Mode::Normal;
                } else {
                    current.push(ch);
                }
            }
            Mode::DoubleQuoted => match ch {
                '"' => mode = Mode::Normal,
                '\\' => match chars.peek() {
                    Some(&next) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                },
                c => current.push(c),
            },
        }
    }

    match mode {
        Mode::SingleQuoted => return Err(CommandParseError::UnterminatedQuote('\'')),
        Mode::DoubleQuoted => return Err(CommandParseError::UnterminatedQuote('"')),
        Mode::Normal => {}
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}

/// Extract the program reference (first word) from a command line
///
/// # Errors
/// - `CommandParseError::Empty` if the line holds no words
/// - any tokenizer error for malformed quoting
pub fn extract_program(command: &str) -> Result<String, CommandParseError> {
    tracing::debug!(command = %command, "Parsing command line");
    let words = tokenize(command)?;
    tracing::debug!(words = ?words, "Extracting program name from parsed command line");
    words.into_iter().next().ok_or(CommandParseError::Empty)
}

/// Quote a string so `sh` reads it back as a single literal word
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
