//! Technique aliases, known positions and query tokenization.
//!
//! The alias table is data: it ships with a curated default and can be
//! replaced or extended from configuration. Expansion only ever widens a
//! technique to its own family, never to a neighbouring technique.

use serde::{Deserialize, Serialize};

/// Words that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "a", "about", "against", "all", "am", "an", "and", "any", "are", "at", "be", "better",
    "but", "can", "can't", "cant", "could", "did", "do", "does", "doing", "for", "from", "get",
    "getting", "have", "how", "i'm", "im", "into", "is", "it", "its", "keep", "me", "my", "of",
    "on", "or", "out", "people", "should", "show", "some", "that", "the", "their", "them",
    "they", "this", "to", "up", "very", "vs", "want", "was", "what", "when", "where", "which",
    "who", "why", "will", "with", "without", "would", "you", "your",
];

/// Minimum characters for a keyword.
const MIN_KEYWORD_LEN: usize = 3;

/// A technique and the lexical variants that name it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueFamily {
    pub canonical: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

impl TechniqueFamily {
    pub fn new<I, S>(canonical: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonical name followed by variants, normalized.
    pub fn terms(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.canonical)
            .chain(self.variants.iter())
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
    }
}

/// Curated synonym and transliteration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasTable {
    pub families: Vec<TechniqueFamily>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    /// Empty table: every technique searches only for itself.
    pub fn empty() -> Self {
        Self { families: Vec::new() }
    }

    /// The default curated table.
    pub fn builtin() -> Self {
        Self {
            families: vec![
                TechniqueFamily::new("triangle", ["triangle choke", "sankaku", "sankaku jime"]),
                TechniqueFamily::new("armbar", ["arm bar", "juji gatame", "jujigatame", "arm lock"]),
                TechniqueFamily::new("kimura", ["ude garami", "double wristlock", "reverse keylock"]),
                TechniqueFamily::new("guillotine", ["guilhotina", "guillotine choke", "front headlock choke"]),
                TechniqueFamily::new(
                    "rear naked choke",
                    ["rnc", "mata leao", "mata leão", "hadaka jime"],
                ),
                TechniqueFamily::new("omoplata", ["omo plata", "shoulder lock"]),
                TechniqueFamily::new("heel hook", ["inside heel hook", "outside heel hook"]),
                TechniqueFamily::new("de la riva", ["dlr", "de la riva guard", "delariva"]),
                TechniqueFamily::new("berimbolo", ["bolo", "baby bolo"]),
                TechniqueFamily::new(
                    "guard retention",
                    ["retaining guard", "losing my guard", "losing guard", "guard recovery"],
                ),
                TechniqueFamily::new(
                    "guard pass",
                    ["guard passing", "passing the guard", "torreando", "toreando", "knee slice"],
                ),
                TechniqueFamily::new("sweep", ["scissor sweep", "hip bump", "flower sweep", "pendulum sweep"]),
                TechniqueFamily::new("takedown", ["double leg", "single leg", "double leg takedown", "single leg takedown"]),
            ],
        }
    }

    /// Add a family, or merge variants into an existing one.
    pub fn with_family(mut self, family: TechniqueFamily) -> Self {
        let canonical = normalize(&family.canonical);
        match self
            .families
            .iter_mut()
            .find(|f| normalize(&f.canonical) == canonical)
        {
            Some(existing) => existing.variants.extend(family.variants),
            None => self.families.push(family),
        }
        self
    }

    /// Lexical variants to search for a technique, the technique first.
    ///
    /// A family contributes only when the technique is one of its own
    /// names. Unknown techniques expand to themselves.
    pub fn expand(&self, technique: &str) -> Vec<String> {
        let needle = normalize(technique);
        let mut terms: Vec<String> = Vec::new();
        if needle.is_empty() {
            return terms;
        }
        terms.push(needle.clone());

        for family in &self.families {
            if family.terms().any(|t| t == needle) {
                for term in family.terms() {
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
            }
        }

        terms
    }

    /// Canonical technique named in free text, by longest matching term.
    pub fn detect(&self, text: &str) -> Option<String> {
        let text = normalize(text);
        let mut best: Option<(usize, &TechniqueFamily)> = None;

        for family in &self.families {
            for term in family.terms() {
                if contains_phrase(&text, &term) && best.map_or(true, |(len, _)| term.len() > len) {
                    best = Some((term.len(), family));
                }
            }
        }

        best.map(|(_, family)| normalize(&family.canonical))
    }
}

/// Everything the coach knows about BJJ vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub aliases: AliasTable,
    pub positions: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            aliases: AliasTable::builtin(),
            positions: [
                "closed guard",
                "open guard",
                "half guard",
                "butterfly guard",
                "spider guard",
                "x guard",
                "side control",
                "knee on belly",
                "north south",
                "mount",
                "back control",
                "back mount",
                "turtle",
                "guard",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Vocabulary {
    /// Longest known position named in free text.
    pub fn detect_position(&self, text: &str) -> Option<String> {
        let text = normalize(text);
        self.positions
            .iter()
            .map(|p| normalize(p))
            .filter(|p| !p.is_empty() && contains_phrase(&text, p))
            .max_by_key(|p| p.len())
    }
}

/// Lowercase, fold curly apostrophes, and turn punctuation into spaces.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' => '\'',
            c if c.is_alphanumeric() || c == '\'' => c,
            _ => ' ',
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-phrase containment on normalized text.
pub fn contains_phrase(normalized_text: &str, normalized_phrase: &str) -> bool {
    if normalized_phrase.is_empty() {
        return false;
    }
    format!(" {} ", normalized_text).contains(&format!(" {} ", normalized_phrase))
}

/// Content words of a query, in order, deduplicated.
pub fn keywords(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in normalize(text).split_whitespace() {
        let token = token.trim_matches('\'');
        if token.chars().count() < MIN_KEYWORD_LEN || STOP_WORDS.contains(&token) {
            continue;
        }
        if !out.iter().any(|k| k == token) {
            out.push(token.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_family() {
        let table = AliasTable::builtin();
        let terms = table.expand("Triangle");
        assert_eq!(terms[0], "triangle");
        assert!(terms.contains(&"sankaku".to_string()));
        assert!(terms.contains(&"triangle choke".to_string()));
    }

    #[test]
    fn test_expand_from_variant() {
        let terms = AliasTable::builtin().expand("juji gatame");
        assert!(terms.contains(&"armbar".to_string()));
    }

    #[test]
    fn test_expand_unknown_is_identity() {
        let terms = AliasTable::builtin().expand("Ezekiel choke");
        assert_eq!(terms, vec!["ezekiel choke".to_string()]);
    }

    #[test]
    fn test_expand_does_not_cross_families() {
        // "x guard sweep" is not a name of the sweep family
        let terms = AliasTable::builtin().expand("x guard sweep");
        assert_eq!(terms, vec!["x guard sweep".to_string()]);
    }

    #[test]
    fn test_extend_table() {
        let table = AliasTable::empty()
            .with_family(TechniqueFamily::new("ezekiel", ["sode guruma jime"]))
            .with_family(TechniqueFamily::new("Ezekiel", ["ezequiel"]));
        assert_eq!(table.families.len(), 1);
        assert_eq!(table.expand("ezequiel"), vec!["ezequiel", "ezekiel", "sode guruma jime"]);
    }

    #[test]
    fn test_detect_prefers_longest_term() {
        let table = AliasTable::builtin();
        assert_eq!(
            table.detect("how do I finish the triangle from closed guard"),
            Some("triangle".to_string())
        );
        assert_eq!(
            table.detect("show me the de la riva guard"),
            Some("de la riva".to_string())
        );
        assert_eq!(table.detect("what is a good warmup"), None);
    }

    #[test]
    fn test_detect_longest_term_across_families() {
        let table = AliasTable::builtin();
        assert_eq!(
            table.detect("kimura grip into a rear naked choke"),
            Some("rear naked choke".to_string())
        );
    }

    #[test]
    fn test_detect_requires_whole_phrase() {
        assert_eq!(AliasTable::builtin().detect("my symbolic bolos"), None);
    }

    #[test]
    fn test_detect_position() {
        let vocab = Vocabulary::default();
        assert_eq!(
            vocab.detect_position("finish the triangle from closed guard"),
            Some("closed guard".to_string())
        );
        assert_eq!(
            vocab.detect_position("I keep losing my guard when people pass"),
            Some("guard".to_string())
        );
        assert_eq!(vocab.detect_position("leg locks"), None);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keywords("How do I finish the Triangle from closed guard?"),
            vec!["finish", "triangle", "closed", "guard"]
        );
        assert_eq!(keywords("I can’t, I can't"), Vec::<String>::new());
    }
}
