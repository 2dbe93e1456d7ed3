use std::borrow::Cow;

/// Longest reference body looked at after `&` (`#x10FFFF` is 8 bytes)
const MAX_REFERENCE_LEN: usize = 10;

/// Decode a narrow set of character references.
///
/// - Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// - Numeric: `&#60;` and `&#x3C;`, semicolon-terminated, valid scalar values only.
///
/// Anything else, including references without a semicolon, is left as is.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_reference(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// `tail` starts at `&`. Returns the character and the bytes consumed.
fn decode_reference(tail: &str) -> Option<(char, usize)> {
    let body = &tail[1..];
    let semicolon = body
        .bytes()
        .take(MAX_REFERENCE_LEN)
        .position(|b| b == b';')?;
    let name = &body[..semicolon];

    let ch = match name.strip_prefix('#') {
        Some(numeric) => decode_numeric(numeric)?,
        None => match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        },
    };

    Some((ch, semicolon + 2))
}

fn decode_numeric(numeric: &str) -> Option<char> {
    let (digits, radix) = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (numeric, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let value = u32::from_str_radix(digits, radix).ok()?;
    if value == 0 {
        return None;
    }
    char::from_u32(value)
}
