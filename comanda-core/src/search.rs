//! Accent- and case-insensitive menu search

/// Fold one character to its unaccented lowercase form
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Lowercase, strip accents, turn punctuation into spaces and collapse
/// whitespace.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score of `name` (already normalized) for `tokens`; `None` unless every
/// token occurs.
fn score(name: &str, tokens: &[&str]) -> Option<f64> {
    tokens.iter().try_fold(0.0, |acc, token| {
        let idx = name.find(token)?;
        let base = if idx == 0 { 4.0 } else { 2.0 };
        let early = (2 - idx.min(2)) as f64 * 0.1;
        Some(acc + base + early)
    })
}

/// Rank `names` against `query`, best first.
///
/// Ties go to the shorter name, then alphabetical order. A blank query keeps
/// every name in its original order. `limit` caps the result.
pub fn search<'a, S: AsRef<str>>(names: &'a [S], query: &str, limit: Option<usize>) -> Vec<&'a str> {
    let limit = limit.unwrap_or(usize::MAX);
    let query = normalize(query);
    let tokens: Vec<&str> = query.split(' ').filter(|t| !t.is_empty()).collect();

    if tokens.is_empty() {
        return names.iter().map(|s| s.as_ref()).take(limit).collect();
    }

    let mut hits: Vec<(f64, String, &str)> = names
        .iter()
        .map(|s| s.as_ref())
        .filter_map(|name| {
            let normalized = normalize(name);
            score(&normalized, &tokens).map(|s| (s, normalized, name))
        })
        .collect();

    hits.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.chars().count().cmp(&b.1.chars().count()))
            .then_with(|| a.1.cmp(&b.1))
    });
    hits.into_iter().take(limit).map(|(_, _, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENU: [&str; 6] = [
        "Açaí 500ml",
        "Suco de Açaí",
        "Caipirinha de Limão",
        "Limonada",
        "Porção de Fritas",
        "Água com gás",
    ];

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Açaí,  com   GRANOLA! "), "acai com granola");
        assert_eq!(normalize("Porção"), "porcao");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_prefix_ranks_first() {
        let hits = search(&MENU, "acai", None);
        assert_eq!(hits, vec!["Açaí 500ml", "Suco de Açaí"]);
    }

    #[test]
    fn test_all_tokens_required() {
        assert_eq!(search(&MENU, "limao caipirinha", None), vec!["Caipirinha de Limão"]);
        assert!(search(&MENU, "limao coca", None).is_empty());
    }

    #[test]
    fn test_ties_shorter_then_alphabetical() {
        let names = ["limonada suiça", "limonada", "limao"];
        assert_eq!(
            search(&names, "lim", None),
            vec!["limao", "limonada", "limonada suiça"]
        );
    }

    #[test]
    fn test_blank_query_and_limit() {
        assert_eq!(search(&MENU, "  ", Some(2)), vec!["Açaí 500ml", "Suco de Açaí"]);
        assert_eq!(search(&MENU, "a", Some(5)).len(), 5);
    }

    #[test]
    fn test_owned_names() {
        let names: Vec<String> = MENU.iter().map(|s| s.to_string()).collect();
        assert_eq!(search(&names, "AGUA", None), vec!["Água com gás"]);
    }
}
