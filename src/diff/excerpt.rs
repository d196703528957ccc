/// Longest changed line (in characters) copied into an excerpt verbatim.
pub const MAX_LINE_LENGTH: usize = 500;

/// Sole excerpt entry for binary files.
pub const BINARY_SENTINEL: &str = "Binary file changed";

/// Take up to `max_lines` changed lines, trimming overlong ones, and append a
/// "... (N more lines)" marker when lines were left out.
pub fn build_excerpt(changed: &[&str], max_lines: usize) -> Vec<String> {
    let mut excerpt: Vec<String> = changed
        .iter()
        .take(max_lines)
        .map(|line| trim_long_line(line))
        .collect();

    if changed.len() > max_lines {
        excerpt.push(format!("... ({} more lines)", changed.len() - max_lines));
    }
    excerpt
}

/// Cut a line to its first [`MAX_LINE_LENGTH`] characters and annotate what was
/// dropped. The leading `+`/`-` is part of the kept text.
fn trim_long_line(line: &str) -> String {
    let length = line.chars().count();
    if length <= MAX_LINE_LENGTH {
        return line.to_string();
    }

    let kept: String = line.chars().take(MAX_LINE_LENGTH).collect();
    format!(
        "{}... [trimmed {} chars from {} char line]",
        kept,
        with_thousands(length - MAX_LINE_LENGTH),
        with_thousands(length)
    )
}

/// Format an integer with `,` thousands separators (12345 -> "12,345").
pub fn with_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(12_345), "12,345");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_short_lines_kept_verbatim() {
        let excerpt = build_excerpt(&["+a", "-b"], 10);
        assert_eq!(excerpt, vec!["+a".to_string(), "-b".to_string()]);
    }

    #[test]
    fn test_line_at_limit_not_trimmed() {
        let line = format!("+{}", "x".repeat(MAX_LINE_LENGTH - 1));
        let excerpt = build_excerpt(&[line.as_str()], 10);
        assert_eq!(excerpt[0], line);
    }

    #[test]
    fn test_long_line_trimmed_with_counts() {
        let line = format!("-{}", "y".repeat(12_344));
        let excerpt = build_excerpt(&[line.as_str()], 10);
        assert_eq!(excerpt.len(), 1);
        let entry = &excerpt[0];
        assert!(entry.starts_with('-'));
        assert!(entry.ends_with("... [trimmed 11,845 chars from 12,345 char line]"));
        let kept = entry.split("... [trimmed").next().unwrap();
        assert_eq!(kept.chars().count(), MAX_LINE_LENGTH);
    }

    #[test]
    fn test_long_line_counts_characters_not_bytes() {
        let line = format!("+{}", "é".repeat(600));
        let excerpt = build_excerpt(&[line.as_str()], 1);
        assert!(excerpt[0].ends_with("[trimmed 101 chars from 601 char line]"));
    }

    #[test]
    fn test_more_lines_marker() {
        let lines = ["+1", "+2", "+3", "-4", "-5"];
        let excerpt = build_excerpt(&lines, 2);
        assert_eq!(excerpt.len(), 3);
        assert_eq!(excerpt[2], "... (3 more lines)");
    }

    #[test]
    fn test_no_marker_when_everything_fits() {
        let lines = ["+1", "+2"];
        let excerpt = build_excerpt(&lines, 2);
        assert_eq!(excerpt.len(), 2);
        assert!(!excerpt.iter().any(|l| l.contains("more lines")));
    }
}
