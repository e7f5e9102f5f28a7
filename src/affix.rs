use crate::dict::{AffixFlag, AffixRule, Speller, StemEntry};
use rayon::prelude::*;
use std::collections::HashSet;

/// Derives every surface form implied by one stem and its applicable
/// prefix/suffix rules ("unmunch"). Affix stacking is capped at depth two
/// by convention, so the second level runs as one explicit extra pass
/// rather than open recursion.
///
/// The result may contain fragments that no lookup would accept (isolated
/// "-word" pieces, bare digits); callers filter those before admitting
/// forms into a word list.
pub fn expand_stem<S: Speller + ?Sized>(entry: &StemEntry, dict: &S) -> HashSet<String> {
    let mut result = HashSet::new();

    if let Some(forbidden) = dict.forbidden_flag() {
        if entry.has_flag(forbidden) {
            return result;
        }
    }

    let need_affix = dict.need_affix_flag();
    if !requires_affix(need_affix, &entry.flags) {
        result.insert(entry.stem.clone());
    }

    let suffixes: Vec<&AffixRule> = entry
        .flags
        .iter()
        .flat_map(|&flag| dict.suffix_rules(flag))
        .filter(|rule| rule.applies_to(&entry.stem))
        .collect();
    let prefixes: Vec<&AffixRule> = entry
        .flags
        .iter()
        .flat_map(|&flag| dict.prefix_rules(flag))
        .filter(|rule| rule.applies_to(&entry.stem))
        .collect();

    for suffix in &suffixes {
        let suffixed = apply_suffix(&entry.stem, suffix);
        if !requires_affix(need_affix, &suffix.result_flags) {
            result.insert(suffixed.clone());
        }
        for second in continuation_suffixes(dict, &suffix.result_flags, &suffixed, false) {
            result.insert(apply_suffix(&suffixed, second));
        }
    }

    for prefix in &prefixes {
        let prefixed = apply_prefix(&entry.stem, prefix);
        if !requires_affix(need_affix, &prefix.result_flags) {
            result.insert(prefixed.clone());
        }
        if !prefix.crossproduct {
            continue;
        }

        // Suffixes that may combine with this prefix: the stem's own
        // crossproduct suffixes, plus crossproduct suffixes the prefix's
        // result flags unlock on the prefixed form.
        let mut combined: Vec<&AffixRule> =
            suffixes.iter().copied().filter(|s| s.crossproduct).collect();
        for extra in continuation_suffixes(dict, &prefix.result_flags, &prefixed, true) {
            if !combined.iter().any(|s| std::ptr::eq(*s, extra)) {
                combined.push(extra);
            }
        }

        for suffix in combined {
            let suffixed = apply_suffix(&prefixed, suffix);
            result.insert(suffixed.clone());
            for second in continuation_suffixes(dict, &suffix.result_flags, &suffixed, true) {
                result.insert(apply_suffix(&suffixed, second));
            }
        }
    }

    result
}

/// Expansion over the whole stem table. Stems are independent, so the
/// union fans out over rayon; on morphologically rich dictionaries this
/// still runs from seconds to hours, which is why callers keep a cache
/// keyed by dictionary identity (see [`crate::cache`]).
pub fn expand_dictionary<S: Speller + Sync + ?Sized>(dict: &S) -> HashSet<String> {
    dict.stems()
        .par_iter()
        .map(|entry| expand_stem(entry, dict))
        .reduce(HashSet::new, |mut acc, other| {
            acc.extend(other);
            acc
        })
}

fn requires_affix(need_affix: Option<AffixFlag>, flags: &[AffixFlag]) -> bool {
    need_affix.is_some_and(|flag| flags.contains(&flag))
}

fn continuation_suffixes<'a, S: Speller + ?Sized>(
    dict: &'a S,
    result_flags: &[AffixFlag],
    form: &str,
    crossproduct_only: bool,
) -> Vec<&'a AffixRule> {
    result_flags
        .iter()
        .flat_map(|&flag| dict.suffix_rules(flag))
        .filter(|rule| !crossproduct_only || rule.crossproduct)
        .filter(|rule| rule.applies_to(form))
        .collect()
}

fn apply_suffix(form: &str, rule: &AffixRule) -> String {
    let mut out = strip_tail(form, &rule.strip);
    out.push_str(&rule.add);
    out
}

fn apply_prefix(form: &str, rule: &AffixRule) -> String {
    let mut out = rule.add.clone();
    out.push_str(&strip_head(form, &rule.strip));
    out
}

fn strip_tail(form: &str, strip: &str) -> String {
    if strip.is_empty() {
        return form.to_string();
    }
    if let Some(root) = form.strip_suffix(strip) {
        return root.to_string();
    }
    // Conditions normally guarantee the literal tail; otherwise drop the
    // same number of characters.
    let keep = form.chars().count().saturating_sub(strip.chars().count());
    form.chars().take(keep).collect()
}

fn strip_head(form: &str, strip: &str) -> String {
    if strip.is_empty() {
        return form.to_string();
    }
    if let Some(root) = form.strip_prefix(strip) {
        return root.to_string();
    }
    form.chars().skip(strip.chars().count()).collect()
}
