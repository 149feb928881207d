pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

/// Joins ids with single spaces, abbreviating after `limit` entries.
pub fn id_list<T: ToString>(ids: &[T], limit: usize) -> String {
    let mut out = ids
        .iter()
        .take(limit)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if ids.len() > limit {
        out.push_str(&format!(" … (+{} more)", ids.len() - limit));
    }
    out
}
