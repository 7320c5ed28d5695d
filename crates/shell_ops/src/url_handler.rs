//! Custom URL handler
//!
//! When a command template is registered, [`crate::Shell::open_url`] runs it
//! instead of the system default browser. `{0}` (or `%1`) in the template is
//! replaced by the URL.

use crate::cmdline::{split_command_line, CommandLineError};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed '{{' at offset {0}")]
    UnclosedBrace(usize),

    #[error("unmatched '}}' at offset {0}")]
    UnmatchedBrace(usize),

    #[error("invalid placeholder '{0}'")]
    InvalidPlaceholder(String),

    #[error("dangling '%' at offset {0}")]
    DanglingPercent(usize),

    #[error("command is empty")]
    Empty,

    #[error(transparent)]
    CommandLine(#[from] CommandLineError),
}

/// Shared, settings-owned handler command. Empty means "system default".
///
/// Clones share the same value: the configuration layer keeps one clone to
/// write, each [`crate::Shell`] keeps one to read.
#[derive(Debug, Clone, Default)]
pub struct UrlHandler {
    command: Arc<RwLock<String>>,
}

impl UrlHandler {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Arc::new(RwLock::new(command.into())),
        }
    }

    /// Replace the command; pass an empty string to restore the default
    pub fn set(&self, command: impl Into<String>) {
        *self.command.write() = command.into();
    }

    /// Copy of the current command, `None` when unset
    pub fn snapshot(&self) -> Option<String> {
        let command = self.command.read();
        if command.trim().is_empty() {
            None
        } else {
            Some(command.clone())
        }
    }
}

/// Split `template` into program and arguments, then substitute `url`.
///
/// The template is split before substitution, so the URL always stays
/// inside the word that held its placeholder, whatever quotes or spaces it
/// contains.
pub fn expand_command(template: &str, url: &str) -> Result<Vec<String>, TemplateError> {
    let words = split_command_line(template)?
        .iter()
        .map(|word| substitute(word, url))
        .collect::<Result<Vec<_>, _>>()?;

    match words.first() {
        Some(program) if !program.trim().is_empty() => Ok(words),
        _ => Err(TemplateError::Empty),
    }
}

/// Substitute `url` into `template`.
///
/// `{0}` and `%1` become the URL. Higher positional placeholders (`{1}`,
/// `%2`, ...) become empty strings. `{{`, `}}` and `%%` are literal braces
/// and percent signs.
pub fn format_command(template: &str, url: &str) -> Result<String, TemplateError> {
    if template.trim().is_empty() {
        return Err(TemplateError::Empty);
    }

    substitute(template, url)
}

fn substitute(template: &str, url: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + url.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, n)| n == '{').is_some() {
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(TemplateError::UnclosedBrace(pos)),
                    }
                }

                match name.trim().parse::<u32>() {
                    Ok(0) => out.push_str(url),
                    Ok(_) => {}
                    Err(_) => {
                        return Err(TemplateError::InvalidPlaceholder(format!("{{{}}}", name)));
                    }
                }
            }
            '}' => {
                if chars.next_if(|&(_, n)| n == '}').is_none() {
                    return Err(TemplateError::UnmatchedBrace(pos));
                }
                out.push('}');
            }
            '%' => {
                if chars.next_if(|&(_, n)| n == '%').is_some() {
                    out.push('%');
                    continue;
                }

                let mut digits = String::new();
                while let Some((_, d)) = chars.next_if(|&(_, n)| n.is_ascii_digit()) {
                    digits.push(d);
                }

                match digits.parse::<u32>() {
                    Ok(1) => out.push_str(url),
                    Ok(n) if n > 1 => {}
                    Ok(_) => return Err(TemplateError::InvalidPlaceholder(format!("%{}", digits))),
                    Err(_) => return Err(TemplateError::DanglingPercent(pos)),
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/a?b=c";

    #[test]
    fn test_brace_placeholder() {
        assert_eq!(
            format_command("mybrowser '{0}'", URL).unwrap(),
            format!("mybrowser '{}'", URL)
        );
    }

    #[test]
    fn test_percent_placeholder() {
        assert_eq!(
            format_command("firefox -new-tab \"%1\"", URL).unwrap(),
            format!("firefox -new-tab \"{}\"", URL)
        );
    }

    #[test]
    fn test_extra_placeholders_are_empty() {
        assert_eq!(format_command("b {0}{1} %2", "u").unwrap(), "b u ");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(format_command("x {{literal}} 100%% {0}", "u").unwrap(), "x {literal} 100% u");
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(format_command("b {0", URL), Err(TemplateError::UnclosedBrace(2)));
        assert_eq!(format_command("b }", URL), Err(TemplateError::UnmatchedBrace(2)));
        assert_eq!(
            format_command("b {url}", URL),
            Err(TemplateError::InvalidPlaceholder("{url}".into()))
        );
        assert_eq!(format_command("b %x", URL), Err(TemplateError::DanglingPercent(2)));
        assert_eq!(
            format_command("b %0", URL),
            Err(TemplateError::InvalidPlaceholder("%0".into()))
        );
        assert_eq!(format_command("  ", URL), Err(TemplateError::Empty));
    }

    #[test]
    fn test_expand_keeps_url_in_one_argument() {
        let urls = [
            "https://example.com/it's",
            "https://x/' --remote-debugging-port=9222 '",
            "https://example.com/a \"b\" c",
        ];

        for url in urls {
            assert_eq!(
                expand_command("mybrowser '{0}'", url).unwrap(),
                vec!["mybrowser".to_string(), url.to_string()]
            );
            assert_eq!(
                expand_command("mybrowser --new-tab %1", url).unwrap(),
                vec!["mybrowser".to_string(), "--new-tab".to_string(), url.to_string()]
            );
        }
    }

    #[test]
    fn test_expand_rejects_bad_templates() {
        assert_eq!(
            expand_command("mybrowser '{0}", URL),
            Err(TemplateError::CommandLine(CommandLineError::UnterminatedQuote('\'')))
        );
        assert_eq!(
            expand_command("mybrowser {url}", URL),
            Err(TemplateError::InvalidPlaceholder("{url}".into()))
        );
        assert_eq!(expand_command("   ", URL), Err(TemplateError::Empty));
        assert_eq!(expand_command("'' {0}", URL), Err(TemplateError::Empty));
    }

    #[test]
    fn test_handler_snapshot() {
        let handler = UrlHandler::default();
        assert_eq!(handler.snapshot(), None);

        let writer = handler.clone();
        writer.set("mybrowser '{0}'");
        assert_eq!(handler.snapshot().as_deref(), Some("mybrowser '{0}'"));

        writer.set("");
        assert_eq!(handler.snapshot(), None);
    }
}
