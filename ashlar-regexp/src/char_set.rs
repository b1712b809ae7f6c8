use crate::error::{Error, Result};
use crate::transpile::{octal_value, Transpiler, DIGIT_CLASS, SPACE_CLASS, WORD_CLASS};

// One resolved member of a character set: either a single code point
// (ranges apply) or a character-class escape carrying its host-syntax
// text (ranges never apply; an adjacent dash is a literal).
enum Member {
    Char(u32),
    Class(String),
}

/// Parse a character set. The opening `[` has been consumed; emits the
/// whole host-syntax set including brackets.
pub(crate) fn parse(t: &mut Transpiler) -> Result<()> {
    t.out.push('[');
    if t.eat('^') {
        t.out.push('^');
    }
    let mut first = true;
    // the last single-char member seen, candidate for a range low end
    let mut pending: Option<u32> = None;
    loop {
        match t.peek() {
            None => return Err(Error::UnterminatedCharSet),
            Some(']') if !first => {
                t.advance();
                t.out.push(']');
                return Ok(());
            }
            // a ] as the very first member is a literal, except in the
            // degenerate [] at the end of the pattern, which can only be
            // an empty set
            Some(']') if t.peek_at(1).is_none() => {
                return Err(Error::EmptyCharSet);
            }
            Some('-') if pending.is_some() && !matches!(t.peek_at(1), Some(']') | None) => {
                t.advance();
                let low = pending.take().unwrap();
                match member(t)? {
                    Member::Char(high) => {
                        if high < low {
                            return Err(Error::ReverseRange);
                        }
                        t.out.push('-');
                        push_set_char(&mut t.out, high);
                    }
                    Member::Class(text) => {
                        // a dash adjacent to a class escape is a literal
                        t.out.push_str("\\-");
                        t.out.push_str(&text);
                    }
                }
            }
            Some('-') => {
                // leading or trailing dash, or one after a class escape,
                // is a literal
                t.advance();
                t.out.push_str("\\-");
                pending = None;
            }
            _ => match member(t)? {
                Member::Char(c) => {
                    push_set_char(&mut t.out, c);
                    pending = Some(c);
                }
                Member::Class(text) => {
                    t.out.push_str(&text);
                    pending = None;
                }
            },
        }
        first = false;
    }
}

// Parse one member; single chars are returned as code points so the
// caller can build and validate ranges.
fn member(t: &mut Transpiler) -> Result<Member> {
    let Some(c) = t.peek() else {
        return Err(Error::UnterminatedCharSet);
    };
    if c != '\\' {
        t.advance();
        return Ok(Member::Char(c as u32));
    }
    t.advance();
    let Some(c) = t.peek() else {
        return Err(Error::LoneBackslash);
    };
    match c {
        'd' => class(t, DIGIT_CLASS, false),
        'D' => class(t, DIGIT_CLASS, true),
        'w' => class(t, WORD_CLASS, false),
        'W' => class(t, WORD_CLASS, true),
        's' => class(t, SPACE_CLASS, false),
        'S' => class(t, SPACE_CLASS, true),
        // inside a set \b is a backspace, per the ECMAScript definition
        'b' => {
            t.advance();
            Ok(Member::Char(0x08))
        }
        'f' => {
            t.advance();
            Ok(Member::Char(0x0C))
        }
        'n' => {
            t.advance();
            Ok(Member::Char(0x0A))
        }
        'r' => {
            t.advance();
            Ok(Member::Char(0x0D))
        }
        't' => {
            t.advance();
            Ok(Member::Char(0x09))
        }
        'v' => {
            t.advance();
            Ok(Member::Char(0x0B))
        }
        'x' => {
            t.advance();
            Ok(Member::Char(t.hex_escape(2)?))
        }
        'u' => {
            t.advance();
            Ok(Member::Char(t.hex_escape(4)?))
        }
        'c' => {
            t.advance();
            match t.peek() {
                Some(l) if l.is_ascii_alphabetic() => {
                    t.advance();
                    Ok(Member::Char((l as u32) % 32))
                }
                // no control letter: a literal backslash; the c stays in
                // the stream as its own member
                _ => Ok(Member::Char('\\' as u32)),
            }
        }
        '0'..='7' => {
            // inside a set a digit escape is always octal
            Ok(Member::Char(octal_value(t)))
        }
        '8' | '9' => {
            // not an octal digit: a literal
            t.advance();
            Ok(Member::Char(c as u32))
        }
        _ => {
            // identity escape
            t.advance();
            Ok(Member::Char(c as u32))
        }
    }
}

fn class(t: &mut Transpiler, class: &str, negated: bool) -> Result<Member> {
    t.advance();
    if negated {
        // the host supports a nested negated class inside a set
        Ok(Member::Class(format!("[^{}]", class)))
    } else {
        Ok(Member::Class(class.to_string()))
    }
}

// Emit a single code point in set context, escaping the set metacharacters.
fn push_set_char(out: &mut String, value: u32) {
    match char::from_u32(value) {
        Some(c) if matches!(c, '[' | ']' | '\\' | '^' | '-' | '&') => {
            out.push('\\');
            out.push(c);
        }
        Some(c) if c.is_control() || value == 0x2028 || value == 0x2029 => {
            out.push_str(&format!("\\x{{{:02X}}}", value));
        }
        Some(c) => out.push(c),
        None => out.push_str(&format!("\\x{{{:02X}}}", value)),
    }
}
