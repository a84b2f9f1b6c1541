// Character n-gram shingling and multiset Jaccard similarity
use ahash::AHashMap;

/// Generate overlapping character grams of length `gram`
///
/// A label shorter than `gram` yields itself as the single shingle.
pub fn shingles(label: &str, gram: usize) -> Vec<String> {
    if gram < 2 {
        return Vec::new();
    }

    let chars: Vec<char> = label.chars().collect();
    if chars.len() < gram {
        return vec![label.to_string()];
    }

    chars.windows(gram).map(|w| w.iter().collect()).collect()
}

/// Multiset Jaccard similarity of the gram bags of two labels
pub fn jaccard(a: &str, b: &str, gram: usize) -> f64 {
    let grams_a = shingles(a, gram);
    let grams_b = shingles(b, gram);

    if grams_a.is_empty() && grams_b.is_empty() {
        return 0.0;
    }

    let mut counts: AHashMap<&str, u32> = AHashMap::with_capacity(grams_a.len());
    for g in &grams_a {
        *counts.entry(g.as_str()).or_insert(0) += 1;
    }

    let mut intersection = 0usize;
    for g in &grams_b {
        if let Some(count) = counts.get_mut(g.as_str()) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    intersection as f64 / (grams_a.len() + grams_b.len() - intersection) as f64
}
