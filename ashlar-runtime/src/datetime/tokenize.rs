// Tokens the date parser consumes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    // a bare number; sign is +1/-1 when explicitly written
    Number {
        value: u32,
        digits: usize,
        sign: Option<i32>,
    },
    // two or three numbers joined by one separator character
    Group {
        parts: Vec<(u32, usize)>,
        separator: char,
    },
    // month name, 1-based
    Month(u32),
    Weekday,
    // true is PM
    AmPm(bool),
    Utc,
    TimeMarker,
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

pub(crate) fn tokenize(input: &str, tokens: &mut Vec<Token>) -> bool {
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    while pos < chars.len() {
        let c = chars[pos];
        if c.is_whitespace() || c == ',' {
            pos += 1;
            continue;
        }
        if c.is_ascii_digit() {
            if !number(&chars, &mut pos, tokens, None) {
                return false;
            }
            continue;
        }
        if c == '+' || c == '-' {
            let sign = if c == '+' { 1 } else { -1 };
            let next = chars.get(pos + 1).copied();
            match next {
                Some(d) if d.is_ascii_digit() => {
                    // a dash directly after a month name is a separator,
                    // not a sign
                    if c == '-' && matches!(tokens.last(), Some(Token::Month(_))) {
                        pos += 1;
                        continue;
                    }
                    pos += 1;
                    if !number(&chars, &mut pos, tokens, Some(sign)) {
                        return false;
                    }
                }
                // between words a dash is an ignorable separator
                Some(w) if c == '-' && w.is_alphabetic() => {
                    pos += 1;
                }
                _ => return false,
            }
            continue;
        }
        if c.is_alphabetic() {
            let start = pos;
            while matches!(chars.get(pos), Some(c) if c.is_alphabetic()) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect::<String>().to_lowercase();
            if !keyword(&word, tokens) {
                return false;
            }
            continue;
        }
        return false;
    }
    true
}

// scan a number and, when a consistent separator follows, a number group
fn number(chars: &[char], pos: &mut usize, tokens: &mut Vec<Token>, sign: Option<i32>) -> bool {
    let Some(first) = scan_digits(chars, pos) else {
        return false;
    };
    if sign.is_some() {
        tokens.push(Token::Number {
            value: first.0,
            digits: first.1,
            sign,
        });
        return true;
    }
    let separator = match chars.get(*pos) {
        Some(&s)
            if matches!(s, '/' | '-' | ':' | '.')
                && matches!(chars.get(*pos + 1), Some(d) if d.is_ascii_digit()) =>
        {
            s
        }
        _ => {
            tokens.push(Token::Number {
                value: first.0,
                digits: first.1,
                sign: None,
            });
            return true;
        }
    };
    let mut parts = vec![first];
    while parts.len() < 3 {
        match chars.get(*pos) {
            Some(&s) if s == separator
                && matches!(chars.get(*pos + 1), Some(d) if d.is_ascii_digit()) =>
            {
                *pos += 1;
                match scan_digits(chars, pos) {
                    Some(part) => parts.push(part),
                    None => return false,
                }
            }
            _ => break,
        }
    }
    tokens.push(Token::Group { parts, separator });
    true
}

fn scan_digits(chars: &[char], pos: &mut usize) -> Option<(u32, usize)> {
    let start = *pos;
    let mut value: u64 = 0;
    while let Some(c) = chars.get(*pos) {
        let Some(d) = c.to_digit(10) else { break };
        value = value * 10 + d as u64;
        if value > u32::MAX as u64 {
            return None;
        }
        *pos += 1;
    }
    if *pos == start {
        None
    } else {
        Some((value as u32, *pos - start))
    }
}

fn keyword(word: &str, tokens: &mut Vec<Token>) -> bool {
    match word {
        "utc" | "gmt" | "z" => {
            tokens.push(Token::Utc);
            return true;
        }
        "t" => {
            tokens.push(Token::TimeMarker);
            return true;
        }
        "am" => {
            tokens.push(Token::AmPm(false));
            return true;
        }
        "pm" => {
            tokens.push(Token::AmPm(true));
            return true;
        }
        _ => {}
    }
    if word.len() >= 3 {
        for (index, month) in MONTHS.iter().enumerate() {
            if month.starts_with(word) {
                tokens.push(Token::Month(index as u32 + 1));
                return true;
            }
        }
        for weekday in WEEKDAYS {
            if weekday.starts_with(word) {
                tokens.push(Token::Weekday);
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Option<Vec<Token>> {
        let mut tokens = Vec::new();
        if tokenize(input, &mut tokens) {
            Some(tokens)
        } else {
            None
        }
    }

    #[test]
    fn test_group_of_three() {
        let tokens = run("2022-06-15").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Group {
                parts: vec![(2022, 4), (6, 2), (15, 2)],
                separator: '-',
            }]
        );
    }

    #[test]
    fn test_time_group() {
        let tokens = run("13:45:30").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Group {
                parts: vec![(13, 2), (45, 2), (30, 2)],
                separator: ':',
            }]
        );
    }

    #[test]
    fn test_words_and_numbers() {
        let tokens = run("Wed, 15 Jun 2022").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Weekday,
                Token::Number {
                    value: 15,
                    digits: 2,
                    sign: None
                },
                Token::Month(6),
                Token::Number {
                    value: 2022,
                    digits: 4,
                    sign: None
                },
            ]
        );
    }

    #[test]
    fn test_signed_number() {
        let tokens = run("z -0500").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Utc,
                Token::Number {
                    value: 500,
                    digits: 4,
                    sign: Some(-1)
                },
            ]
        );
    }

    #[test]
    fn test_dash_after_month_is_separator() {
        let tokens = run("15-Jun-2022").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number {
                    value: 15,
                    digits: 2,
                    sign: None
                },
                Token::Month(6),
                Token::Number {
                    value: 2022,
                    digits: 4,
                    sign: None
                },
            ]
        );
    }

    #[test]
    fn test_isolated_dash_rejected() {
        assert!(run("1 - 2").is_none());
    }

    #[test]
    fn test_unknown_word_rejected() {
        assert!(run("15 Juneish 2022").is_none());
    }
}
