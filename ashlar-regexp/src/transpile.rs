use std::cell::RefCell;

use ahash::{HashMap, HashMapExt};

use crate::char_set;
use crate::error::{Error, Result};

// ECMAScript \s: ASCII whitespace plus the Unicode space separators,
// line separators and the BOM. Spelled out so the host engine's own
// (different) \s definition cannot leak into matches.
pub(crate) const SPACE_CLASS: &str = " \\t\\n\\x0B\\f\\r\\x{A0}\\x{1680}\\x{2000}-\\x{200A}\\x{2028}\\x{2029}\\x{202F}\\x{205F}\\x{3000}\\x{FEFF}";
pub(crate) const WORD_CLASS: &str = "A-Za-z0-9_";
pub(crate) const DIGIT_CLASS: &str = "0-9";
const LINE_TERMINATORS: &str = "\\n\\r\\x{2028}\\x{2029}";

/// Flags that change how a pattern is transpiled.
///
/// Case-insensitivity and global matching do not affect the emitted
/// pattern; they are passed to the host engine directly by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `^` and `$` match at line boundaries (the `m` flag).
    pub multiline: bool,
    /// `.` matches line terminators too (the `s` flag).
    pub dot_all: bool,
    /// Unescaped whitespace and `#` comments are ignored (the `x` flag).
    pub extended: bool,
}

/// The result of a successful transpilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpiled {
    /// The pattern in host-engine syntax.
    pub pattern: String,
    /// The number of capturing groups.
    pub group_count: usize,
    /// Dense group-number table: entry `i` names group `i + 1`.
    ///
    /// `None` when the pattern declares no named groups.
    pub group_names: Option<Vec<Option<String>>>,
}

thread_local! {
    // reusable source buffer; patterns are indexed by char during parsing
    static SOURCE_SCRATCH: RefCell<Vec<char>> = const { RefCell::new(Vec::new()) };
}

/// Transpile an AS3-dialect pattern into host-engine syntax.
pub fn transpile(pattern: &str, flags: Flags) -> Result<Transpiled> {
    SOURCE_SCRATCH.with(|scratch| {
        let mut src = scratch.borrow_mut();
        src.clear();
        src.extend(pattern.chars());
        Transpiler::new(&src, flags).run()
    })
}

// a \N or \k<name> whose meaning is only known once the whole pattern
// has been parsed
enum RefTarget {
    // the original digit string (never starting with 0)
    Number(String),
    Name(String),
}

pub(crate) struct Transpiler<'a> {
    src: &'a [char],
    pos: usize,
    pub(crate) out: String,
    flags: Flags,
    group_count: usize,
    open_groups: usize,
    // a quantifier may follow the previous token
    can_quantify: bool,
    // a single lazy ? may follow the quantifier just emitted
    allow_lazy: bool,
    // (insertion point in out, target)
    forward_refs: Vec<(usize, RefTarget)>,
    group_names: HashMap<String, usize>,
}

impl<'a> Transpiler<'a> {
    fn new(src: &'a [char], flags: Flags) -> Self {
        Transpiler {
            src,
            pos: 0,
            out: String::with_capacity(src.len() * 2),
            flags,
            group_count: 0,
            open_groups: 0,
            can_quantify: false,
            allow_lazy: false,
            forward_refs: Vec::new(),
            group_names: HashMap::new(),
        }
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset).copied()
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn run(mut self) -> Result<Transpiled> {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.advance();
                    self.escape()?;
                }
                '(' => self.open_group()?,
                ')' => {
                    if self.open_groups == 0 {
                        return Err(Error::UnbalancedParen);
                    }
                    self.advance();
                    self.open_groups -= 1;
                    self.out.push(')');
                    self.token_emitted();
                }
                '[' => {
                    self.advance();
                    char_set::parse(&mut self)?;
                    self.token_emitted();
                }
                '*' | '+' => {
                    if !self.can_quantify {
                        return Err(Error::UnexpectedQuantifier);
                    }
                    self.advance();
                    self.out.push(c);
                    self.quantifier_emitted();
                }
                '?' => {
                    if self.allow_lazy {
                        self.advance();
                        self.out.push('?');
                        self.allow_lazy = false;
                    } else {
                        if !self.can_quantify {
                            return Err(Error::UnexpectedQuantifier);
                        }
                        self.advance();
                        self.out.push('?');
                        self.quantifier_emitted();
                    }
                }
                '{' => self.brace_quantifier()?,
                '}' => {
                    self.advance();
                    self.out.push_str("\\}");
                    self.token_emitted();
                }
                '.' => {
                    self.advance();
                    if self.flags.dot_all {
                        self.out.push_str("[\\s\\S]");
                    } else {
                        self.out.push('[');
                        self.out.push('^');
                        self.out.push_str(LINE_TERMINATORS);
                        self.out.push(']');
                    }
                    self.token_emitted();
                }
                '^' => {
                    self.advance();
                    if self.flags.multiline {
                        self.out.push_str("(?:\\A|(?<=[");
                        self.out.push_str(LINE_TERMINATORS);
                        self.out.push_str("]))");
                    } else {
                        self.out.push_str("\\A");
                    }
                    self.no_token();
                }
                '$' => {
                    self.advance();
                    if self.flags.multiline {
                        self.out.push_str("(?:\\z|(?=[");
                        self.out.push_str(LINE_TERMINATORS);
                        self.out.push_str("]))");
                    } else {
                        self.out.push_str("\\z");
                    }
                    self.no_token();
                }
                '|' => {
                    self.advance();
                    self.out.push('|');
                    self.no_token();
                }
                '#' if self.flags.extended => {
                    // comment runs to the end of the line
                    while let Some(c) = self.peek() {
                        self.advance();
                        if c == '\n' {
                            break;
                        }
                    }
                }
                c if self.flags.extended && is_pattern_whitespace(c) => {
                    self.advance();
                }
                _ => {
                    self.advance();
                    self.push_literal(c);
                    self.token_emitted();
                }
            }
        }
        if self.open_groups != 0 {
            return Err(Error::UnbalancedParen);
        }
        self.resolve()
    }

    // quantifier bookkeeping

    #[inline]
    fn token_emitted(&mut self) {
        self.can_quantify = true;
        self.allow_lazy = false;
    }

    #[inline]
    fn no_token(&mut self) {
        self.can_quantify = false;
        self.allow_lazy = false;
    }

    #[inline]
    fn quantifier_emitted(&mut self) {
        self.can_quantify = false;
        self.allow_lazy = true;
    }

    fn push_literal(&mut self, c: char) {
        if c.is_ascii_punctuation() {
            self.out.push('\\');
            self.out.push(c);
        } else {
            self.out.push(c);
        }
    }

    // groups

    fn open_group(&mut self) -> Result<()> {
        self.advance(); // (
        if self.eat('?') {
            match self.peek() {
                Some(':') => {
                    self.advance();
                    self.out.push_str("(?:");
                }
                Some('=') => {
                    self.advance();
                    self.out.push_str("(?=");
                }
                Some('!') => {
                    self.advance();
                    self.out.push_str("(?!");
                }
                Some('<') => {
                    self.advance();
                    match self.peek() {
                        Some('=') => {
                            self.advance();
                            self.out.push_str("(?<=");
                        }
                        Some('!') => {
                            self.advance();
                            self.out.push_str("(?<!");
                        }
                        _ => return Err(Error::IllegalGroupPrefix),
                    }
                }
                Some('P') => {
                    self.advance();
                    if !self.eat('<') {
                        return Err(Error::IllegalGroupPrefix);
                    }
                    let name = self.group_name()?;
                    self.new_capture_group()?;
                    if self.group_names.insert(name.clone(), self.group_count).is_some() {
                        return Err(Error::DuplicateGroupName(name));
                    }
                    // names are tracked in the group table, not the output
                    self.out.push('(');
                }
                _ => return Err(Error::IllegalGroupPrefix),
            }
        } else {
            self.new_capture_group()?;
            self.out.push('(');
        }
        self.open_groups += 1;
        self.no_token();
        Ok(())
    }

    fn new_capture_group(&mut self) -> Result<()> {
        // the forward-reference resolver emits at most three-digit numbers
        if self.group_count >= 999 {
            return Err(Error::GroupLimitExceeded);
        }
        self.group_count += 1;
        Ok(())
    }

    fn group_name(&mut self) -> Result<String> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::UnterminatedGroupName),
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    let valid = if name.is_empty() {
                        c.is_ascii_alphabetic() || c == '_'
                    } else {
                        c.is_ascii_alphanumeric() || c == '_'
                    };
                    if !valid {
                        return Err(Error::InvalidGroupName);
                    }
                    self.advance();
                    name.push(c);
                }
            }
        }
        if name.is_empty() {
            return Err(Error::InvalidGroupName);
        }
        Ok(name)
    }

    // {n}, {n,}, {n,m}; anything ill-formed backtracks to a literal brace

    fn brace_quantifier(&mut self) -> Result<()> {
        let start = self.pos;
        self.advance(); // {
        let low = self.digits();
        if low.is_empty() {
            return self.literal_brace(start);
        }
        let mut high = None;
        let mut open_high = false;
        if self.eat(',') {
            let digits = self.digits();
            if digits.is_empty() {
                open_high = true;
            } else {
                high = Some(digits);
            }
        }
        if !self.eat('}') {
            return self.literal_brace(start);
        }
        if !self.can_quantify {
            return Err(Error::UnexpectedQuantifier);
        }
        let n: u32 = low.parse().map_err(|_| Error::InvalidNumericQuantifier)?;
        let m = match &high {
            Some(digits) => {
                let m: u32 = digits.parse().map_err(|_| Error::InvalidNumericQuantifier)?;
                if m < n {
                    return Err(Error::InvalidNumericQuantifier);
                }
                Some(m)
            }
            None => None,
        };
        self.out.push('{');
        self.out.push_str(&low);
        if open_high {
            self.out.push(',');
        } else if let Some(m) = m {
            self.out.push(',');
            self.out.push_str(&m.to_string());
        }
        self.out.push('}');
        self.quantifier_emitted();
        Ok(())
    }

    fn literal_brace(&mut self, start: usize) -> Result<()> {
        self.pos = start + 1;
        self.out.push_str("\\{");
        self.token_emitted();
        Ok(())
    }

    pub(crate) fn digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
                digits.push(c);
            } else {
                break;
            }
        }
        digits
    }

    // escapes outside character sets

    fn escape(&mut self) -> Result<()> {
        let Some(c) = self.peek() else {
            return Err(Error::LoneBackslash);
        };
        match c {
            '0'..='9' => self.numeric_escape(),
            'b' => {
                self.advance();
                // ECMAScript word boundary over [A-Za-z0-9_], spelled out
                // as look-arounds so the host's Unicode \b is not used
                self.out.push_str(
                    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))",
                );
                self.token_emitted();
            }
            'B' => {
                self.advance();
                self.out.push_str(
                    "(?:(?<=[A-Za-z0-9_])(?=[A-Za-z0-9_])|(?<![A-Za-z0-9_])(?![A-Za-z0-9_]))",
                );
                self.token_emitted();
            }
            'd' => self.class_escape(DIGIT_CLASS, false),
            'D' => self.class_escape(DIGIT_CLASS, true),
            'w' => self.class_escape(WORD_CLASS, false),
            'W' => self.class_escape(WORD_CLASS, true),
            's' => self.class_escape(SPACE_CLASS, false),
            'S' => self.class_escape(SPACE_CLASS, true),
            'f' | 'n' | 'r' | 't' => {
                self.advance();
                self.out.push('\\');
                self.out.push(c);
                self.token_emitted();
            }
            'v' => {
                self.advance();
                self.out.push_str("\\x0B");
                self.token_emitted();
            }
            'x' => {
                self.advance();
                let value = self.hex_escape(2)?;
                self.out.push_str(&format!("\\x{:02X}", value));
                self.token_emitted();
            }
            'u' => {
                self.advance();
                let value = self.hex_escape(4)?;
                self.out.push_str(&format!("\\x{{{:04X}}}", value));
                self.token_emitted();
            }
            'c' => {
                self.advance();
                match self.peek() {
                    Some(l) if l.is_ascii_alphabetic() => {
                        self.advance();
                        self.out.push_str(&format!("\\x{:02X}", (l as u32) % 32));
                    }
                    _ => {
                        // no control letter: a literal backslash and c
                        self.out.push_str("\\\\c");
                    }
                }
                self.token_emitted();
            }
            'k' => {
                self.advance();
                self.named_backreference()?;
            }
            _ => {
                self.advance();
                if c.is_ascii_alphanumeric() {
                    // identity escape for letters with no assigned meaning
                    self.out.push(c);
                } else {
                    self.push_literal(c);
                }
                self.token_emitted();
            }
        }
        Ok(())
    }

    fn class_escape(&mut self, class: &str, negated: bool) {
        self.advance();
        self.out.push('[');
        if negated {
            self.out.push('^');
        }
        self.out.push_str(class);
        self.out.push(']');
        self.token_emitted();
    }

    pub(crate) fn hex_escape(&mut self, len: usize) -> Result<u32> {
        let mut value = 0;
        for _ in 0..len {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or(Error::InvalidHexEscape)?;
            self.advance();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn numeric_escape(&mut self) {
        let digits = self.digits();
        if digits.starts_with('0') {
            // octal escape; rewritten as hex right away
            let text = octal_text(&digits);
            self.out.push_str(&text);
        } else {
            let n: usize = digits.parse().unwrap_or(usize::MAX);
            if n <= self.group_count {
                // definitely a backreference; wrapped so a following
                // literal digit cannot extend the group number
                self.out.push_str("(?:\\");
                self.out.push_str(&digits);
                self.out.push(')');
            } else {
                // forward reference; classified after the full parse
                self.forward_refs
                    .push((self.out.len(), RefTarget::Number(digits)));
            }
        }
        self.token_emitted();
    }

    fn named_backreference(&mut self) -> Result<()> {
        if !self.eat('<') {
            return Err(Error::InvalidNamedBackreference("\\k".to_string()));
        }
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::InvalidNamedBackreference(name)),
                Some('>') => {
                    self.advance();
                    break;
                }
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    self.advance();
                    name.push(c);
                }
                Some(_) => return Err(Error::InvalidNamedBackreference(name)),
            }
        }
        if name.is_empty() {
            return Err(Error::InvalidNamedBackreference(name));
        }
        if let Some(number) = self.group_names.get(&name) {
            self.out.push_str(&format!("(?:\\{})", number));
        } else {
            self.forward_refs
                .push((self.out.len(), RefTarget::Name(name)));
        }
        self.token_emitted();
        Ok(())
    }

    // resolve parked references and build the group-name table

    fn resolve(self) -> Result<Transpiled> {
        let pattern = if self.forward_refs.is_empty() {
            self.out
        } else {
            let mut pattern = String::with_capacity(self.out.len() + self.forward_refs.len() * 8);
            let mut last = 0;
            for (pos, target) in &self.forward_refs {
                pattern.push_str(&self.out[last..*pos]);
                last = *pos;
                match target {
                    RefTarget::Number(digits) => {
                        let n: usize = digits.parse().unwrap_or(usize::MAX);
                        if n <= self.group_count {
                            pattern.push_str("(?:\\");
                            pattern.push_str(digits);
                            pattern.push(')');
                        } else {
                            pattern.push_str(&octal_text(digits));
                        }
                    }
                    RefTarget::Name(name) => match self.group_names.get(name) {
                        Some(number) => {
                            pattern.push_str(&format!("(?:\\{})", number));
                        }
                        None => {
                            return Err(Error::InvalidNamedBackreference(name.clone()));
                        }
                    },
                }
            }
            pattern.push_str(&self.out[last..]);
            pattern
        };
        let group_names = if self.group_names.is_empty() {
            None
        } else {
            let mut table = vec![None; self.group_count];
            for (name, number) in &self.group_names {
                table[number - 1] = Some(name.clone());
            }
            Some(table)
        };
        Ok(Transpiled {
            pattern,
            group_count: self.group_count,
            group_names,
        })
    }
}

// Reinterpret a digit string as up to three octal digits (value capped at
// \xFF); any remaining digits are literals.
pub(crate) fn octal_text(digits: &str) -> String {
    let mut value = 0u32;
    let mut used = 0;
    for c in digits.chars().take(3) {
        match c.to_digit(8) {
            Some(d) if value * 8 + d <= 0xFF => {
                value = value * 8 + d;
                used += 1;
            }
            _ => break,
        }
    }
    let mut out = String::new();
    if used > 0 {
        out.push_str(&format!("\\x{:02X}", value));
    }
    for c in digits.chars().skip(used) {
        out.push(c);
    }
    out
}

// Octal reinterpretation of a digit stream inside a character set: consume
// up to three octal digits from the transpiler, leaving the rest as
// ordinary set members.
pub(crate) fn octal_value(t: &mut Transpiler) -> u32 {
    let mut value = 0u32;
    let mut used = 0;
    while used < 3 {
        match t.peek().and_then(|c| c.to_digit(8)) {
            Some(d) if value * 8 + d <= 0xFF => {
                t.advance();
                value = value * 8 + d;
                used += 1;
            }
            _ => break,
        }
    }
    value
}

fn is_pattern_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}
