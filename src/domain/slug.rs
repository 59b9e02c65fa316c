//! URL slug helpers shared by every catalog entity.

/// Convert a display name into a lower-case ASCII slug.
///
/// Runs of anything other than ASCII letters and digits collapse into a single
/// `-`. When nothing usable remains, `fallback` is returned instead so the
/// slug column never ends up empty.
pub fn slugify(input: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Case-folded name stored next to every catalog name and used by lookups
/// by name, so matching never depends on the database collation.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Find the first free slug derived from `base`.
///
/// Tries `base`, then `base-1`, `base-2` and so on until `is_taken` reports
/// a free candidate.
pub fn next_free_slug<E>(
    base: &str,
    mut is_taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    if !is_taken(base)? {
        return Ok(base.to_string());
    }

    let mut suffix: u32 = 1;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}
