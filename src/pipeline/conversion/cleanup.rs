// Deterministic cleanup of raw structured-conversion output.
//
// The cascade runs in a fixed order and is idempotent:
//   1. strip a markdown code fence, tolerating prose around it
//   2. trim surrounding whitespace
//   3. drop any preamble before the header line
//   4. normalize typographic quotes to ASCII

/// Column names that identify the header line. Both must appear on it.
const HEADER_MARKERS: [&str; 2] = ["step_number", "step_day"];

/// Run the full cleanup cascade over a raw generator response.
pub fn clean_structured_response(raw: &str) -> String {
    let unfenced = strip_code_fence(raw);
    let from_header = skip_to_header(unfenced.trim());
    normalize_quotes(from_header.trim())
}

fn is_fence_line(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Lines of `text` paired with their starting byte offsets.
fn lines_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let start = offset;
            offset += line.len();
            (start, line)
        })
        .collect()
}

fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_MARKERS.iter().all(|marker| lower.contains(marker))
}

fn has_header_line(text: &str) -> bool {
    text.lines().any(is_header_line)
}

/// Return the content of the outermost code fence in `text`.
///
/// With two or more fence lines, content runs from the first non-fence line
/// after the opening fence up to the last fence line. A single fence line
/// splits the text in two: the side holding the header line wins, otherwise
/// the side after the fence unless it is blank. When the fenced content has
/// no header but the text outside the fences does, the outside text wins.
/// Text without a fence is returned as is.
pub fn strip_code_fence(text: &str) -> &str {
    let lines = lines_with_offsets(text);
    let fences: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, (_, line))| is_fence_line(line))
        .map(|(i, _)| i)
        .collect();

    let (first, last) = match (fences.first(), fences.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return text,
    };

    let content_start = lines[first..]
        .iter()
        .find(|(_, line)| !is_fence_line(line))
        .map_or(text.len(), |(offset, _)| *offset);

    let before = &text[..lines[first].0];

    if first == last {
        let after = &text[content_start..];
        if has_header_line(before) || after.trim().is_empty() {
            return before;
        }
        return after;
    }

    let content_end = lines[last].0;
    let inner = if content_start >= content_end {
        ""
    } else {
        &text[content_start..content_end]
    };
    if has_header_line(inner) {
        return inner;
    }

    let trailing = lines
        .get(last + 1)
        .map_or("", |(offset, _)| &text[*offset..]);
    [before, trailing]
        .into_iter()
        .find(|side| has_header_line(side))
        .unwrap_or(inner)
}

/// Discard everything before the first line that names both header columns.
/// Text without such a line is returned unchanged.
pub fn skip_to_header(text: &str) -> &str {
    lines_with_offsets(text)
        .into_iter()
        .find(|(_, line)| is_header_line(line))
        .map_or(text, |(offset, _)| &text[offset..])
}

/// Replace typographic quotes with their ASCII equivalents.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}
