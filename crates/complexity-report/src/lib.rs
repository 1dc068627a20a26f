pub mod json;
pub mod markdown;
pub mod text;

use std::collections::BTreeMap;

/// File-type histogram entries, largest count first; ties keep key order.
pub(crate) fn by_count_desc(file_types: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<_> = file_types.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Display label for a histogram key.
pub(crate) fn file_type_label(key: &str) -> &str {
    if key.is_empty() {
        "(no extension)"
    } else {
        key
    }
}

/// `1234567` -> `1,234,567`.
pub(crate) fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
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
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(650000), "650,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_by_count_desc_breaks_ties_by_key() {
        let types = BTreeMap::from([
            (".h".to_string(), 2),
            (".cpp".to_string(), 5),
            (".c".to_string(), 2),
        ]);
        assert_eq!(by_count_desc(&types), vec![(".cpp", 5), (".c", 2), (".h", 2)]);
    }
}
