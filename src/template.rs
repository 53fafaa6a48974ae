//! Message rendering for the positional and template call shapes.
//!
//! Templates use printf-style verbs (`%s`, `%d`, `%5.2f`, ...). Every argument
//! is taken through its `Display` output, so numeric verbs parse that text and
//! fall back to a `%!verb(value)` marker when it is not a number. Rendering
//! never fails: missing arguments, surplus arguments and unknown verbs all
//! produce inline markers instead.

use std::fmt::{Display, Write};

/// Join the arguments with single spaces.
pub fn sprint(args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
    }
    out
}

/// Substitute `args` into `template`.
///
/// With no arguments the template is returned verbatim, so messages that
/// contain a literal `%` are safe to pass through the template shapes.
pub fn sprintf(template: &str, args: &[&dyn Display]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                '#' => spec.alternate = true,
                '0' => spec.zero = true,
                ' ' => spec.space = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                out.push_str(&spec.render(verb, &arg.to_string()));
            }
            None => {
                let _ = write!(out, "%!{}(MISSING)", verb);
            }
        }
    }

    if next_arg < args.len() {
        out.push_str("%!(EXTRA ");
        for (i, arg) in args[next_arg..].iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", arg);
        }
        out.push(')');
    }

    out
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    value
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    alternate: bool,
    zero: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Spec {
    fn render(&self, verb: char, text: &str) -> String {
        let body = match verb {
            'v' => text.to_string(),
            's' => match self.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text.to_string(),
            },
            'q' => format!("{:?}", text),
            't' => match text {
                "true" | "false" => text.to_string(),
                _ => return bad_verb(verb, text),
            },
            'd' | 'i' => match text.trim().parse::<i128>() {
                Ok(n) => self.signed(n < 0, n.unsigned_abs().to_string()),
                Err(_) => return bad_verb(verb, text),
            },
            'x' | 'X' | 'o' | 'b' => self.radix(verb, text),
            'c' => match text.trim().parse::<u32>().ok().and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => return bad_verb(verb, text),
            },
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => match text.trim().parse::<f64>() {
                Ok(n) => {
                    let digits = match verb {
                        'f' | 'F' => format!("{:.*}", self.precision.unwrap_or(6), n.abs()),
                        'e' => format!("{:.*e}", self.precision.unwrap_or(6), n.abs()),
                        'E' => format!("{:.*E}", self.precision.unwrap_or(6), n.abs()),
                        _ => match self.precision {
                            Some(p) => format!("{:.*}", p, n.abs()),
                            None => n.abs().to_string(),
                        },
                    };
                    self.signed(n.is_sign_negative(), digits)
                }
                Err(_) => return bad_verb(verb, text),
            },
            _ => return bad_verb(verb, text),
        };
        self.pad(body, verb)
    }

    fn signed(&self, negative: bool, digits: String) -> String {
        let sign = if negative {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };
        format!("{}{}", sign, digits)
    }

    fn radix(&self, verb: char, text: &str) -> String {
        let (prefix, digits) = match (verb, text.trim().parse::<i128>()) {
            ('x', Ok(n)) => ("0x", format!("{:x}", n.unsigned_abs())),
            ('X', Ok(n)) => ("0X", format!("{:X}", n.unsigned_abs())),
            ('o', Ok(n)) => ("0", format!("{:o}", n.unsigned_abs())),
            ('b', Ok(n)) => ("0b", format!("{:b}", n.unsigned_abs())),
            ('x', Err(_)) => ("0x", text.bytes().map(|b| format!("{:02x}", b)).collect()),
            ('X', Err(_)) => ("0X", text.bytes().map(|b| format!("{:02X}", b)).collect()),
            _ => return bad_verb(verb, text),
        };
        let negative = text.trim().starts_with('-') && text.trim().parse::<i128>().is_ok();
        let prefix = if self.alternate { prefix } else { "" };
        self.signed(negative, format!("{}{}", prefix, digits))
    }

    fn pad(&self, body: String, verb: char) -> String {
        let Some(width) = self.width else {
            return body;
        };
        let len = body.chars().count();
        if len >= width {
            return body;
        }
        let fill = width - len;
        if self.left {
            format!("{}{}", body, " ".repeat(fill))
        } else if self.zero && "dixXobfFeEgG".contains(verb) {
            let sign_len = body
                .chars()
                .next()
                .filter(|c| matches!(c, '-' | '+' | ' '))
                .map_or(0, |c| c.len_utf8());
            let (sign, digits) = body.split_at(sign_len);
            format!("{}{}{}", sign, "0".repeat(fill), digits)
        } else {
            format!("{}{}", " ".repeat(fill), body)
        }
    }
}

fn bad_verb(verb: char, text: &str) -> String {
    format!("%!{}({})", verb, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_joins_with_spaces() {
        assert_eq!(sprint(&[&"now is Info", &2, &"good"]), "now is Info 2 good");
        assert_eq!(sprint(&[]), "");
        assert_eq!(sprint(&[&1.5]), "1.5");
    }

    #[test]
    fn test_sprintf_basic_verbs() {
        assert_eq!(sprintf("val:%d", &[&42]), "val:42");
        assert_eq!(sprintf("%s=%v", &[&"k", &true]), "k=true");
        assert_eq!(sprintf("now is Infof: %d,%s", &[&2, &"good"]), "now is Infof: 2,good");
        assert_eq!(sprintf("%q", &[&"hi \"there\""]), r#""hi \"there\"""#);
        assert_eq!(sprintf("100%%", &[&1]), "100%%!(EXTRA 1)");
    }

    #[test]
    fn test_sprintf_without_args_is_verbatim() {
        assert_eq!(sprintf("100% done %d", &[]), "100% done %d");
    }

    #[test]
    fn test_sprintf_width_and_precision() {
        assert_eq!(sprintf("[%5d]", &[&42]), "[   42]");
        assert_eq!(sprintf("[%-5d]", &[&42]), "[42   ]");
        assert_eq!(sprintf("[%05d]", &[&-42]), "[-0042]");
        assert_eq!(sprintf("%.2f", &[&3.14159]), "3.14");
        assert_eq!(sprintf("%+d", &[&7]), "+7");
        assert_eq!(sprintf("%.3s", &[&"abcdef"]), "abc");
        assert_eq!(sprintf("%f", &[&1]), "1.000000");
    }

    #[test]
    fn test_sprintf_radix() {
        assert_eq!(sprintf("%x", &[&255]), "ff");
        assert_eq!(sprintf("%#X", &[&255]), "0XFF");
        assert_eq!(sprintf("%o", &[&8]), "10");
        assert_eq!(sprintf("%b", &[&5]), "101");
        assert_eq!(sprintf("%x", &[&"hi"]), "6869");
        assert_eq!(sprintf("%x", &[&-255]), "-ff");
    }

    #[test]
    fn test_sprintf_malformed_templates() {
        assert_eq!(sprintf("%d %d", &[&1]), "1 %!d(MISSING)");
        assert_eq!(sprintf("%d", &[&1, &2, &"x"]), "1%!(EXTRA 2, x)");
        assert_eq!(sprintf("%d", &[&"abc"]), "%!d(abc)");
        assert_eq!(sprintf("%z", &[&1]), "%!z(1)");
        assert_eq!(sprintf("tail %", &[&1]), "tail %!(NOVERB)%!(EXTRA 1)");
    }
}
