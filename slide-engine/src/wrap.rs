//! Greedy word wrapping.
//!
//! Two flavours: [`wrap_chars`] wraps by character count for the parser's
//! paragraph fallback, [`wrap_measured`] wraps by an arbitrary width function
//! (pixel widths from font metrics) for the renderers.

/// Wrap `text` to at most `width` characters per line.
///
/// Words are separated by any whitespace, which is collapsed to single
/// spaces. Words longer than `width` are split. Blank input yields no lines.
/// `None` means no limit: the line is only normalised.
pub fn wrap_chars(text: &str, width: Option<usize>) -> Vec<String> {
    let width = width.unwrap_or(usize::MAX).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        while word_len > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        if word_len == 0 {
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Greedily pack `items` into lines no wider than `max_width`.
///
/// `width` measures one item, `gap` is the space inserted between two items
/// on the same line. An item wider than `max_width` gets a line of its own.
pub fn wrap_measured<T, W>(items: Vec<T>, max_width: u32, gap: u32, mut width: W) -> Vec<Vec<T>>
where
    W: FnMut(&T) -> u32,
{
    let mut lines: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_width = 0u32;

    for item in items {
        let item_width = width(&item);
        let extra = if current.is_empty() {
            item_width
        } else {
            gap + item_width
        };

        if !current.is_empty() && current_width + extra > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = item_width;
        } else {
            current_width += extra;
        }
        current.push(item);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
