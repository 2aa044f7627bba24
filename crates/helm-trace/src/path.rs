/// Rewrite numeric segments of a dotted path into index notation.
///
/// `spec.containers.0.image` becomes `spec.containers[0].image` and `a.12`
/// becomes `a[12]`. Consecutive indices stack (`a.0.1` becomes `a[0][1]`).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    for (i, segment) in path.split('.').enumerate() {
        if is_index(segment) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            if i > 0 {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    out
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Whether an evaluator path denotes the document root.
#[must_use]
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "\"\"" || path == "''"
}
