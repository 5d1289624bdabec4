//! Inline tool directives embedded in model output.
//!
//! The model invokes its pseudo tools by emitting markup spans in its
//! reply text: `<remember>key: value</remember>`, `<recall>key</recall>`,
//! `<clear-memory/>`, and `<send-email>to | subject | body</send-email>`.
//!
//! A single left-to-right pass tokenizes the text into literal segments
//! and parsed directives; [`interpret`] then walks the token stream once,
//! applying memory side effects and substituting each span with a
//! human-readable status. A span that fails to parse is still consumed,
//! replaced by an invalid-format marker, and never executed.

use crate::MemoryStore;

/// A parsed `<send-email>` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// One segment of tokenized model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text between directives.
    Text(String),
    /// A directive span with its parsed fields.
    Directive(Directive),
}

/// A directive with its parsed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Store a fact under a key.
    Remember {
        /// The key, as written by the model.
        key: String,
        /// The value to store.
        value: String,
    },
    /// Look a fact up.
    Recall {
        /// The key to look up.
        key: String,
    },
    /// Drop every stored fact.
    ClearMemory,
    /// Simulated email dispatch.
    SendEmail(Email),
    /// A span whose payload failed to parse. Consumed, never executed.
    Invalid(Kind),
}

/// Which tool a directive span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `<remember>key: value</remember>`
    Remember,
    /// `<recall>key</recall>`
    Recall,
    /// `<clear-memory/>`
    ClearMemory,
    /// `<send-email>to | subject | body</send-email>`
    SendEmail,
}

impl Kind {
    /// Opening and closing tags for span directives.
    fn tags(self) -> (&'static str, &'static str) {
        match self {
            Self::Remember => ("<remember>", "</remember>"),
            Self::Recall => ("<recall>", "</recall>"),
            Self::ClearMemory => ("<clear-memory/>", ""),
            Self::SendEmail => ("<send-email>", "</send-email>"),
        }
    }
}

/// Tokenize model output into literal text and parsed directives.
///
/// Directives are matched in order of appearance. An opening tag with no
/// matching close tag is left as plain text.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let Some((start, end, directive)) = next_span(rest) else {
            tokens.push(Token::Text(rest.to_string()));
            break;
        };
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        tokens.push(Token::Directive(directive));
        rest = &rest[end..];
    }
    tokens
}

/// Interpret directives in `text`, mutating `memory` as a side effect and
/// substituting each span with a status message.
pub fn interpret(text: &str, memory: &mut MemoryStore) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        match token {
            Token::Text(literal) => out.push_str(&literal),
            Token::Directive(Directive::Remember { key, value }) => {
                memory.set(&key, &value);
                out.push_str(&format!("[Remembered: {key}]"));
            }
            Token::Directive(Directive::Recall { key }) => match memory.get(&key) {
                Some(value) => out.push_str(value),
                None => out.push_str("[Not found]"),
            },
            Token::Directive(Directive::ClearMemory) => {
                memory.clear();
                out.push_str("[Memory cleared]");
            }
            Token::Directive(Directive::SendEmail(email)) => {
                // Simulated: nothing leaves the process.
                out.push_str(&format!(
                    "[Email sent to {}\n Subject: {}\n Body: {}]",
                    email.to, email.subject, email.body
                ));
            }
            Token::Directive(Directive::Invalid(kind)) => out.push_str(invalid_marker(kind)),
        }
    }
    out
}

/// Locate the earliest complete directive span in `text`.
///
/// Returns the byte range of the whole span plus the parsed directive.
/// Span matching is non-greedy: the payload ends at the first matching
/// close tag.
fn next_span(text: &str) -> Option<(usize, usize, Directive)> {
    let mut best: Option<(usize, usize, Directive)> = None;
    for kind in [
        Kind::Remember,
        Kind::Recall,
        Kind::ClearMemory,
        Kind::SendEmail,
    ] {
        let Some(candidate) = find_span(text, kind) else {
            continue;
        };
        if best.as_ref().is_none_or(|(start, ..)| candidate.0 < *start) {
            best = Some(candidate);
        }
    }
    best
}

/// Find the first span of the given kind, payload parsed.
fn find_span(text: &str, kind: Kind) -> Option<(usize, usize, Directive)> {
    let (open, close) = kind.tags();
    let start = text.find(open)?;
    if kind == Kind::ClearMemory {
        return Some((start, start + open.len(), Directive::ClearMemory));
    }
    let payload_start = start + open.len();
    let payload_len = text[payload_start..].find(close)?;
    let payload = &text[payload_start..payload_start + payload_len];
    let end = payload_start + payload_len + close.len();
    Some((start, end, parse_payload(kind, payload)))
}

/// Parse a span payload into directive fields.
fn parse_payload(kind: Kind, payload: &str) -> Directive {
    match kind {
        Kind::Remember => match payload.split_once(':') {
            Some((key, value)) => Directive::Remember {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => Directive::Invalid(Kind::Remember),
        },
        Kind::Recall => Directive::Recall {
            key: payload.trim().to_lowercase(),
        },
        Kind::SendEmail => {
            let mut parts = payload.trim().splitn(3, '|');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(to), Some(subject), Some(body)) => Directive::SendEmail(Email {
                    to: to.trim().to_string(),
                    subject: subject.trim().to_string(),
                    body: body.trim().to_string(),
                }),
                _ => Directive::Invalid(Kind::SendEmail),
            }
        }
        Kind::ClearMemory => Directive::ClearMemory,
    }
}

/// Replacement text for a span that failed to parse.
fn invalid_marker(kind: Kind) -> &'static str {
    match kind {
        Kind::SendEmail => "[Invalid email format, use: to@email.com | Subject | Message]",
        _ => "[Invalid memory format]",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.txt"));
        (dir, store)
    }

    #[test]
    fn plain_text_passes_through() {
        let (_dir, mut mem) = store();
        assert_eq!(interpret("hello there", &mut mem), "hello there");
        assert!(mem.is_empty());
    }

    #[test]
    fn remember_stores_and_confirms() {
        let (_dir, mut mem) = store();
        let out = interpret(
            "Noted. <remember>alice: alice@example.com</remember>",
            &mut mem,
        );
        assert_eq!(out, "Noted. [Remembered: alice]");
        assert_eq!(mem.get("alice").unwrap(), "alice@example.com");
    }

    #[test]
    fn remember_without_colon_is_invalid_and_consumed() {
        let (_dir, mut mem) = store();
        let out = interpret("<remember>malformed</remember>", &mut mem);
        assert_eq!(out, "[Invalid memory format]");
        assert!(mem.is_empty());
    }

    #[test]
    fn remember_value_may_contain_colons() {
        let (_dir, mut mem) = store();
        interpret("<remember>meeting: 10:30 tomorrow</remember>", &mut mem);
        assert_eq!(mem.get("meeting").unwrap(), "10:30 tomorrow");
    }

    #[test]
    fn recall_substitutes_the_value() {
        let (_dir, mut mem) = store();
        mem.set("alice", "alice@example.com");
        let out = interpret("Her address is <recall>alice</recall>.", &mut mem);
        assert_eq!(out, "Her address is alice@example.com.");
    }

    #[test]
    fn recall_is_case_insensitive() {
        let (_dir, mut mem) = store();
        mem.set("Alice", "alice@example.com");
        let out = interpret("<recall>ALICE</recall>", &mut mem);
        assert_eq!(out, "alice@example.com");
    }

    #[test]
    fn recall_missing_key_renders_not_found() {
        let (_dir, mut mem) = store();
        let out = interpret("<recall>bob</recall>", &mut mem);
        assert_eq!(out, "[Not found]");
    }

    #[test]
    fn clear_memory_empties_the_store() {
        let (_dir, mut mem) = store();
        mem.set("alice", "alice@example.com");
        let out = interpret("Done. <clear-memory/>", &mut mem);
        assert_eq!(out, "Done. [Memory cleared]");
        assert!(mem.is_empty());
    }

    #[test]
    fn send_email_echoes_all_three_parts() {
        let (_dir, mut mem) = store();
        let out = interpret(
            "<send-email>\nbob@x.com | Hi | Hello there\n</send-email>",
            &mut mem,
        );
        assert!(out.contains("bob@x.com"));
        assert!(out.contains("Hi"));
        assert!(out.contains("Hello there"));
    }

    #[test]
    fn send_email_single_line_parses_too() {
        let (_dir, mut mem) = store();
        let out = interpret("<send-email>bob@x.com | Hi | Hello</send-email>", &mut mem);
        assert!(out.starts_with("[Email sent to bob@x.com"));
    }

    #[test]
    fn send_email_with_missing_parts_is_invalid() {
        let (_dir, mut mem) = store();
        let out = interpret("<send-email>bob@x.com | Hi</send-email>", &mut mem);
        assert_eq!(
            out,
            "[Invalid email format, use: to@email.com | Subject | Message]"
        );
    }

    #[test]
    fn multiple_directives_process_left_to_right() {
        let (_dir, mut mem) = store();
        let out = interpret(
            "<remember>a: 1</remember> then <recall>a</recall>",
            &mut mem,
        );
        assert_eq!(out, "[Remembered: a] then 1");
    }

    #[test]
    fn unterminated_tag_stays_verbatim() {
        let (_dir, mut mem) = store();
        let text = "half a <remember>alice: alice@example.com";
        assert_eq!(interpret(text, &mut mem), text);
        assert!(mem.is_empty());
    }

    #[test]
    fn span_matching_is_non_greedy() {
        let (_dir, mut mem) = store();
        let out = interpret(
            "<recall>a</recall> and <recall>b</recall>",
            &mut mem,
        );
        // Two separate lookups, not one span swallowing the middle.
        assert_eq!(out, "[Not found] and [Not found]");
    }

    #[test]
    fn tokenize_keeps_surrounding_text() {
        let tokens = tokenize("before <clear-memory/> after");
        assert_eq!(tokens, vec![
            Token::Text("before ".to_string()),
            Token::Directive(Directive::ClearMemory),
            Token::Text(" after".to_string()),
        ]);
    }

    #[test]
    fn remembered_fact_recalled_after_clear_is_gone() {
        let (_dir, mut mem) = store();
        interpret("<remember>alice: alice@example.com</remember>", &mut mem);
        interpret("<clear-memory/>", &mut mem);
        let out = interpret("<recall>alice</recall>", &mut mem);
        assert_eq!(out, "[Not found]");
    }
}
