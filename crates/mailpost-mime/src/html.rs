//! Plain-text fallback generation.

/// Removes HTML markup from `html`, keeping the text between tags.
///
/// Tags, comments, doctype and processing instructions are dropped. Quoted
/// attribute values may contain `>`. A `<` not followed by a tag-opening
/// character is kept as text. Entities are left untouched.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some(&next) if next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?') => {}
            _ => {
                result.push(c);
                continue;
            }
        }

        let rest = chars.clone().take(3).collect::<String>();
        if rest == "!--" {
            skip_comment(&mut chars);
        } else {
            skip_tag(&mut chars);
        }
    }

    result
}

fn skip_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let mut dashes = 0;
    for c in chars.by_ref() {
        match c {
            '-' => dashes += 1,
            '>' if dashes >= 2 => return,
            _ => dashes = 0,
        }
    }
}

fn skip_tag(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let mut quote: Option<char> = None;
    for c in chars.by_ref() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return,
            (None, _) => {}
        }
    }
}
