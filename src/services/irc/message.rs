use std::fmt;

use super::SessionError;

/// Longest line the protocol allows, CRLF included.
pub const MAX_LINE_BYTES: usize = 512;

const CTCP_DELIM: char = '\u{1}';

/// A single IRC protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Origin of the message, without the leading ':'
    pub prefix: Option<String>,

    /// Command word or three-digit numeric reply
    pub command: String,

    /// Parameters, the last one possibly containing spaces
    pub params: Vec<String>,
}

impl Message {
    /// Build an outbound message.
    ///
    /// Line breaks and NUL bytes are removed from every parameter so a
    /// parameter can never smuggle in a second command.
    pub fn new<I, P>(command: &str, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Self {
            prefix: None,
            command: command.to_string(),
            params: params
                .into_iter()
                .map(|param| sanitize(param.as_ref()))
                .collect(),
        }
    }

    /// `PRIVMSG` carrying a CTCP ACTION, the `/me` of IRC clients.
    ///
    /// Overlong text is cut so the serialized line, closing delimiter
    /// included, fits the protocol limit.
    pub fn action(target: &str, text: &str) -> Self {
        let wrap = |text: &str| format!("{CTCP_DELIM}ACTION {text}{CTCP_DELIM}");

        let envelope = Self::new("PRIVMSG", [target, wrap("").as_str()]).to_string().len();
        let mut text = sanitize(text);
        truncate_on_char_boundary(&mut text, (MAX_LINE_BYTES - 2).saturating_sub(envelope));

        Self::new("PRIVMSG", [target, wrap(&text).as_str()])
    }

    /// Parse one line received from the server.
    ///
    /// # Errors
    /// Returns `SessionError::MalformedLine` if the line has no command
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let malformed = || SessionError::MalformedLine(line.to_string());
        let trimmed = line.trim_end_matches(['\r', '\n']);

        let (prefix, rest) = match trimmed.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, rest) = stripped.split_once(' ').ok_or_else(malformed)?;
                (Some(prefix.to_string()), rest)
            }
            None => (None, trimmed),
        };

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => match rest.strip_prefix(':') {
                Some(trailing) => ("", Some(trailing)),
                None => (rest, None),
            },
        };

        let mut words = head.split_whitespace();
        let command = words.next().ok_or_else(malformed)?.to_ascii_uppercase();

        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Ok(Self {
            prefix,
            command,
            params,
        })
    }

    /// Nickname part of the prefix (`nick!user@host`).
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|prefix| prefix.split(['!', '@']).next().unwrap_or(prefix))
    }

    /// Parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Serialize to a wire line, CRLF included, cut to the protocol limit.
    pub fn to_line(&self) -> String {
        let mut line = self.to_string();
        truncate_on_char_boundary(&mut line, MAX_LINE_BYTES - 2);
        line.push_str("\r\n");
        line
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        write!(f, "{}", self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {param}")?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }

        Ok(())
    }
}

fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\0'))
        .collect()
}

fn truncate_on_char_boundary(line: &mut String, max: usize) {
    if line.len() <= max {
        return;
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line.truncate(end);
}
