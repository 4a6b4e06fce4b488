/// Split raw source into trimmed statement texts.
///
/// `;`, `\n` and `\r` end a statement only at brace depth 0, so a block
/// body such as `{ a; b }` stays inside the statement that owns it. Closing
/// braces never take the depth below zero. Blank statements are dropped.
pub fn split_statements(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in source.chars() {
        match c {
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ';' | '\n' | '\r' if depth == 0 => flush(&mut current, &mut statements),
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut statements);

    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Split one statement into tokens.
///
/// A token is a maximal run of non-whitespace characters in which every
/// `"` opens a quoted group that runs to the next `"`, spaces included.
/// Quotes stay part of the token. A `"` with no partner is skipped.
pub fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        let mut word = String::new();

        while let Some(&c) = chars.get(i) {
            if c == '"' {
                let Some(offset) = chars[i + 1..].iter().position(|&ch| ch == '"') else {
                    break;
                };
                let end = i + 1 + offset;
                word.extend(&chars[i..=end]);
                i = end + 1;
            } else if c.is_whitespace() {
                break;
            } else {
                word.push(c);
                i += 1;
            }
        }

        if word.is_empty() {
            i = start + 1;
        } else {
            words.push(word);
        }
    }

    words
}
