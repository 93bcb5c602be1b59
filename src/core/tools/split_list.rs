//! List splitter: chunks a pasted list into fixed-size groups.
//!
//! Fast enough to run inline on the UI thread, so it never goes through
//! the task runner.

use crate::error::InputError;

/// Trim every line, drop blanks, and chunk into groups of `group_size`.
pub fn split_list(text: &str, group_size: usize) -> Result<Vec<Vec<String>>, InputError> {
    if group_size == 0 {
        return Err(InputError::NotPositive {
            field: "Group size",
            value: group_size.to_string(),
        });
    }

    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() {
        return Err(InputError::EmptyList);
    }

    Ok(items.chunks(group_size).map(<[String]>::to_vec).collect())
}

/// Render groups as text blocks headed `--- Group i (n items) ---`.
pub fn render_groups(groups: &[Vec<String>]) -> String {
    let mut out = String::new();
    for (i, group) in groups.iter().enumerate() {
        out.push_str(&format!("--- Group {} ({} items) ---\n", i + 1, group.len()));
        out.push_str(&group.join("\n"));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_trimmed_non_blank_lines() {
        let groups = split_list("  a \n\nb\n c\n\n d\ne  \n", 2).unwrap();
        assert_eq!(
            groups,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
                vec!["e".to_string()],
            ]
        );
    }

    #[test]
    fn rejects_empty_list_and_zero_size() {
        assert_eq!(split_list(" \n\n", 3).unwrap_err(), InputError::EmptyList);
        assert!(matches!(
            split_list("a", 0).unwrap_err(),
            InputError::NotPositive { .. }
        ));
    }

    #[test]
    fn renders_headers_with_counts() {
        let groups = split_list("x\ny\nz", 2).unwrap();
        assert_eq!(
            render_groups(&groups),
            "--- Group 1 (2 items) ---\nx\ny\n\n--- Group 2 (1 items) ---\nz\n\n"
        );
    }
}
