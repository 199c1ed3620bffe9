//! Minimal markup used in assistant replies.
//!
//! Only three constructs are recognised: blank lines, list items starting
//! with `- ` or `* `, and `**bold**` runs inside a line. Anything else is
//! plain text.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Blank,
    Paragraph(Vec<Span<'a>>),
    ListItem(Vec<Span<'a>>),
}

/// Split `text` into one block per line.
pub fn parse(text: &str) -> Vec<Block<'_>> {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Block::Blank
            } else if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                Block::ListItem(spans(item))
            } else {
                Block::Paragraph(spans(line))
            }
        })
        .collect()
}

/// Split a line into plain and bold runs. An unmatched `**` is plain text.
pub fn spans(line: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if open > 0 {
            out.push(Span::Plain(&rest[..open]));
        }
        out.push(Span::Bold(&after_open[..close]));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        out.push(Span::Plain(rest));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_runs_inside_a_line() {
        assert_eq!(
            spans("Eat **more** fibre and **drink** water"),
            vec![
                Span::Plain("Eat "),
                Span::Bold("more"),
                Span::Plain(" fibre and "),
                Span::Bold("drink"),
                Span::Plain(" water"),
            ]
        );
    }

    #[test]
    fn unmatched_marker_stays_plain() {
        assert_eq!(spans("a ** b"), vec![Span::Plain("a ** b")]);
        assert_eq!(
            spans("**x** and **y"),
            vec![Span::Bold("x"), Span::Plain(" and **y")]
        );
    }

    #[test]
    fn blocks_per_line() {
        let blocks = parse("Answer: **yes**.\n\n- oats\n  * berries\nplain");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![Span::Plain("Answer: "), Span::Bold("yes"), Span::Plain(".")]),
                Block::Blank,
                Block::ListItem(vec![Span::Plain("oats")]),
                Block::ListItem(vec![Span::Plain("berries")]),
                Block::Paragraph(vec![Span::Plain("plain")]),
            ]
        );
    }

    #[test]
    fn hyphen_without_space_is_not_a_list() {
        assert_eq!(
            parse("-5 kg"),
            vec![Block::Paragraph(vec![Span::Plain("-5 kg")])]
        );
    }
}
