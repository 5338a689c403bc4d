//! Inline `style` attribute parsing.

/// Splits `name: value; name: value` into ordered declarations.
pub(crate) fn parse_inline_style(input: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for declaration in split_top_level(input, b';') {
        let trimmed = declaration.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(colon_idx) = find_top_level_colon(trimmed) else {
            continue;
        };

        let name = trimmed[..colon_idx].trim().to_ascii_lowercase();
        let value = trimmed[colon_idx + 1..].trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }

        if let Some(slot) = out.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = value.to_owned();
        } else {
            out.push((name, value.to_owned()));
        }
    }
    out
}

pub(crate) fn serialize_inline_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut paren_depth = 0_u32;

    for (idx, byte) in bytes.iter().copied().enumerate() {
        if let Some(open) = quote {
            if escape {
                escape = false;
            } else if byte == b'\\' {
                escape = true;
            } else if byte == open {
                quote = None;
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            _ if byte == delimiter && paren_depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx.saturating_add(1);
            }
            _ => {}
        }
    }

    if start <= input.len() {
        parts.push(&input[start..]);
    }

    parts
}

fn find_top_level_colon(input: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut paren_depth = 0_u32;

    for (idx, byte) in input.as_bytes().iter().copied().enumerate() {
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b':' if paren_depth == 0 => return Some(idx),
            _ => {}
        }
    }

    None
}
