use anchor_lang::prelude::*;

use crate::errors::TipError;

/// Latin letters with acute, grave, circumflex or diaeresis, plus ñ and ÿ
const ACCENTED: &str = "áéíóúÁÉÍÓÚàèìòùÀÈÌÒÙâêîôûÂÊÎÔÛäëïöüÄËÏÖÜñÑÿ";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '.' | ',' | '!' | '?' | ':' | ';' | '-' | '_' | '\'' | '"'
                | '(' | ')' | '[' | ']' | '{' | '}' | '@' | '#' | '$' | '%'
                | '&' | '*' | '+' | '=' | '|' | '~' | '`' | '/' | '\\' | '<' | '>'
        )
        || ACCENTED.contains(c)
}

/// Layout characters that are kept as plain spaces
fn is_spacing(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

/// Normalise a tip message for storage.
///
/// Spacing characters become a single space, runs of spaces collapse,
/// and the result is trimmed. Anything outside the allowed set rejects
/// the whole message.
pub fn sanitize_message(message: &str) -> Result<String> {
    let mut sanitized = String::with_capacity(message.len());
    let mut pending_space = false;

    for c in message.chars() {
        if c == ' ' || is_spacing(c) {
            pending_space = true;
            continue;
        }
        if !is_allowed(c) {
            msg!("Blocked message character U+{:04X}", c as u32);
            return err!(TipError::InvalidCharacters);
        }
        if pending_space && !sanitized.is_empty() {
            sanitized.push(' ');
        }
        pending_space = false;
        sanitized.push(c);
    }

    Ok(sanitized)
}
