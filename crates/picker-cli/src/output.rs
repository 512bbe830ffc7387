use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Print rows under a header, columns padded to their widest cell.
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Names carry diacritics, so width is counted in chars.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{cell:w$}")
            })
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        line(row);
    }
}

/// Join up to `limit` tags, noting how many were left out.
pub fn preview_tags(tags: &[String], limit: usize) -> String {
    let shown: Vec<&str> = tags.iter().take(limit).map(String::as_str).collect();
    let mut out = shown.join(", ");
    if tags.len() > limit {
        out.push_str(&format!(" (+{})", tags.len() - limit));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_with_remainder() {
        let tags: Vec<String> = ["Tokens", "Goblins", "Haste"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(preview_tags(&tags, 2), "Tokens, Goblins (+1)");
        assert_eq!(preview_tags(&tags, 8), "Tokens, Goblins, Haste");
        assert_eq!(preview_tags(&[], 8), "");
    }
}
