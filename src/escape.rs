// Copyright © 2016, Peter Atashian
use crate::Error;
use std::borrow::Cow;
use std::iter::Peekable;
use std::str::CharIndices;

fn error(position: usize, message: &'static str) -> Error {
    Error::Escape { position, message }
}

fn hex(
    chars: &mut Peekable<CharIndices>,
    position: usize,
    digits: usize,
    truncated: &'static str,
) -> Result<char, Error> {
    let mut value = 0;
    for _ in 0..digits {
        let digit = chars
            .next_if(|&(_, c)| c.is_ascii_hexdigit())
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or_else(|| error(position, truncated))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| error(position, "illegal Unicode character"))
}

fn octal(chars: &mut Peekable<CharIndices>, first: char) -> Result<char, Error> {
    let mut value = first.to_digit(8).unwrap_or_default();
    for _ in 0..2 {
        match chars.next_if(|&(_, c)| c.is_digit(8)) {
            Some((_, c)) => value = value * 8 + c.to_digit(8).unwrap_or_default(),
            None => break,
        }
    }
    // At most 0o777, always a valid scalar value.
    Ok(char::from_u32(value).unwrap_or_default())
}

pub fn decode(input: &str) -> Result<Cow<'_, str>, Error> {
    if !input.contains('\\') {
        return Ok(Cow::Borrowed(input));
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(error(position, "\\ at end of string"));
        };
        match escape {
            '\n' => {}
            '\\' | '\'' | '"' => out.push(escape),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => out.push(octal(&mut chars, escape)?),
            'x' => out.push(hex(&mut chars, position, 2, "truncated \\xXX escape")?),
            'u' => out.push(hex(&mut chars, position, 4, "truncated \\uXXXX escape")?),
            'U' => out.push(hex(&mut chars, position, 8, "truncated \\UXXXXXXXX escape")?),
            'N' => return Err(error(position, "named \\N{...} escapes are not supported")),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(Cow::Owned(out))
}
