//! Content line unfolding.
//!
//! Long logical lines are split across physical lines by starting each
//! continuation with a single space or horizontal tab. Unfolding strips
//! that one character and glues the rest onto the line being built.

/// Splits `text` into logical lines.
///
/// Accepts `\r\n`, `\r` and `\n` line endings. Empty physical lines never
/// produce a logical line, and no whitespace other than the single fold
/// character is removed.
pub fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for raw in physical_lines(text) {
        if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            current.push_str(rest);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current.push_str(raw);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Iterates physical lines, treating `\r\n` as a single break.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").flat_map(|chunk| chunk.split(['\r', '\n']))
}

/// Folds a logical line into physical lines of at most `width` characters.
///
/// Continuation lines start with a single space, which counts toward the
/// width. Lines are joined with `\r\n`; no trailing break is added. A
/// `width` below 2 is treated as 2 so every physical line carries content.
pub fn fold_line(line: &str, width: usize) -> String {
    let width = width.max(2);
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= width {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + (line.len() / width + 1) * 3);
    let (head, mut rest) = chars.split_at(width);
    folded.extend(head);

    while !rest.is_empty() {
        let take = rest.len().min(width - 1);
        folded.push_str("\r\n ");
        folded.extend(&rest[..take]);
        rest = &rest[take..];
    }

    folded
}
