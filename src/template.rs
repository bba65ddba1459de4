// Copyright © 2016, Peter Atashian
use crate::Error;

enum Numbering {
    Unused,
    Automatic,
    Manual,
}

fn error(position: usize, message: &'static str) -> Error {
    Error::Format { position, message }
}

fn is_align(c: char) -> bool {
    matches!(c, '<' | '>' | '^' | '=')
}

// [[fill]align][width][.precision][s], the subset meaningful for strings.
fn apply_spec(value: &str, spec: &str) -> Result<String, &'static str> {
    let spec: Vec<char> = spec.chars().collect();
    let (fill, align, mut i) = match spec.as_slice() {
        [fill, align, ..] if is_align(*align) => (*fill, *align, 2),
        [align, ..] if is_align(*align) => (' ', *align, 1),
        _ => (' ', '<', 0),
    };
    if align == '=' {
        return Err("'=' alignment not allowed in string format specifier");
    }
    match spec.get(i) {
        Some('+' | '-' | ' ') => return Err("sign not allowed in string format specifier"),
        Some('#') => return Err("alternate form (#) not allowed in string format specifier"),
        Some('0') => return Err("zero padding is not supported for strings"),
        _ => {}
    }
    let number = |i: &mut usize| {
        let start = *i;
        while spec.get(*i).map_or(false, char::is_ascii_digit) {
            *i += 1;
        }
        spec[start..*i].iter().collect::<String>().parse::<usize>().ok()
    };
    let width = number(&mut i);
    if matches!(spec.get(i), Some(',' | '_')) {
        return Err("cannot specify a thousands separator with strings");
    }
    let precision = if spec.get(i) == Some(&'.') {
        i += 1;
        Some(number(&mut i).ok_or("format specifier missing precision")?)
    } else {
        None
    };
    match &spec[i..] {
        [] | ['s'] => {}
        _ => return Err("unknown format code for a string"),
    }
    let text: String = match precision {
        Some(precision) => value.chars().take(precision).collect(),
        None => value.to_owned(),
    };
    let padding = width.unwrap_or(0).saturating_sub(text.chars().count());
    let (left, right) = match align {
        '>' => (padding, 0),
        '^' => (padding / 2, padding - padding / 2),
        _ => (0, padding),
    };
    let mut out = String::with_capacity(text.len() + padding * fill.len_utf8());
    out.extend(std::iter::repeat(fill).take(left));
    out.push_str(&text);
    out.extend(std::iter::repeat(fill).take(right));
    Ok(out)
}

pub fn format_positional(template: &str, value: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut numbering = Numbering::Unused;
    let mut chars = template.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            '{' if chars.next_if(|&(_, c)| c == '{').is_some() => out.push('{'),
            '}' if chars.next_if(|&(_, c)| c == '}').is_some() => out.push('}'),
            '}' => return Err(error(position, "single '}' encountered")),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) => return Err(error(position, "unexpected '{' in field name")),
                        Some((_, c)) => field.push(c),
                        None => return Err(error(position, "expected '}' before end of string")),
                    }
                }
                let (head, spec) = match field.split_once(':') {
                    Some((head, spec)) => (head, Some(spec)),
                    None => (field.as_str(), None),
                };
                let (name, conversion) = match head.split_once('!') {
                    Some((name, conversion)) => (name, Some(conversion)),
                    None => (head, None),
                };
                numbering = match (name, numbering) {
                    ("", Numbering::Unused) => Numbering::Automatic,
                    ("", Numbering::Automatic) => {
                        return Err(error(position, "only one positional value is available"))
                    }
                    ("", Numbering::Manual) => {
                        return Err(error(
                            position,
                            "cannot switch from manual field specification to automatic field numbering",
                        ))
                    }
                    ("0", Numbering::Automatic) => {
                        return Err(error(
                            position,
                            "cannot switch from automatic field numbering to manual field specification",
                        ))
                    }
                    ("0", _) => Numbering::Manual,
                    (name, _) if name.contains(['[', '.']) => {
                        return Err(error(position, "indexing and attribute access are not supported"))
                    }
                    _ => return Err(error(position, "unknown field name")),
                };
                match conversion {
                    None | Some("s") => {}
                    Some("r" | "a") => return Err(error(position, "only the !s conversion is supported")),
                    Some(_) => return Err(error(position, "unknown conversion specifier")),
                }
                match spec {
                    Some(spec) => out.push_str(&apply_spec(value, spec).map_err(|m| error(position, m))?),
                    None => out.push_str(value),
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}
