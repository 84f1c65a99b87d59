//! Built-in grammatical-category tagger.
//!
//! A small closed-class lexicon (determiners, pronouns, prepositions,
//! conjunctions, auxiliaries, frequent verbs and adverbs) per language, plus
//! suffix rules for open-class words. Unknown words fall back to `NOUN`.
//! Labels follow the Universal POS tag set.

use std::collections::HashMap;

use clap::ValueEnum;
use log::debug;
use unicode_segmentation::UnicodeSegmentation;
use whatlang::Lang;

use crate::annotator::{Annotator, Token};
use crate::error::AnnotationError;

pub const ADJ: &str = "ADJ";
pub const ADP: &str = "ADP";
pub const ADV: &str = "ADV";
pub const AUX: &str = "AUX";
pub const CCONJ: &str = "CCONJ";
pub const DET: &str = "DET";
pub const INTJ: &str = "INTJ";
pub const NOUN: &str = "NOUN";
pub const NUM: &str = "NUM";
pub const PRON: &str = "PRON";
pub const PUNCT: &str = "PUNCT";
pub const SCONJ: &str = "SCONJ";
pub const SYM: &str = "SYM";
pub const VERB: &str = "VERB";

/// Language selection for the lexicon tagger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TagLang {
    /// Detect per document, French when detection is inconclusive.
    #[default]
    Auto,
    Fr,
    En,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Language {
    French,
    English,
}

const FRENCH_WORDS: &[(&str, &[&str])] = &[
    (
        DET,
        &[
            "le", "la", "les", "l", "un", "une", "des", "du", "au", "aux", "ce", "cet", "cette",
            "ces", "mon", "ma", "mes", "ton", "ta", "tes", "son", "sa", "ses", "notre", "nos",
            "votre", "vos", "leur", "leurs", "quelque", "quelques", "chaque", "plusieurs",
            "aucun", "aucune", "tout", "toute", "tous", "toutes",
        ],
    ),
    (
        PRON,
        &[
            "je", "j", "c", "tu", "il", "elle", "on", "nous", "vous", "ils", "elles", "me", "m", "te",
            "t", "se", "s", "lui", "eux", "moi", "toi", "soi", "y", "en", "qui", "que", "qu",
            "quoi", "dont", "où", "celui", "celle", "ceux", "celles", "cela", "ça", "ceci",
            "rien", "personne", "lequel", "laquelle",
        ],
    ),
    (
        ADP,
        &[
            "à", "de", "d", "dans", "par", "pour", "sur", "sous", "avec", "sans", "chez", "vers",
            "entre", "contre", "depuis", "pendant", "avant", "après", "devant", "derrière",
            "malgré", "selon", "parmi", "jusqu",
        ],
    ),
    (CCONJ, &["et", "ou", "mais", "donc", "or", "ni", "car"]),
    (
        SCONJ,
        &["si", "quand", "comme", "lorsque", "lorsqu", "puisque", "puisqu", "quoique"],
    ),
    (
        AUX,
        &[
            "être", "suis", "es", "est", "sommes", "êtes", "sont", "étais", "était", "étions",
            "étiez", "étaient", "sera", "seront", "serait", "été", "avoir", "ai", "as", "a",
            "avons", "avez", "ont", "avais", "avait", "avaient", "aura", "auront", "aurait",
        ],
    ),
    (
        VERB,
        &[
            "fait", "faire", "dit", "dire", "va", "vont", "aller", "peut", "peux", "pouvoir",
            "veut", "veux", "vouloir", "doit", "dois", "devoir", "sait", "sais", "savoir",
            "voit", "vois", "voir", "vient", "viens", "venir", "prend", "prends", "prendre",
            "mange", "mangent", "dort", "dorment", "aime", "aiment", "chante", "parle", "vit",
        ],
    ),
    (
        ADV,
        &[
            "ne", "n", "pas", "plus", "très", "bien", "mal", "trop", "peu", "beaucoup", "encore",
            "toujours", "jamais", "déjà", "ici", "là", "aussi", "alors", "puis", "ensuite",
            "maintenant", "aujourd", "hier", "demain", "souvent", "vite", "oui", "non", "assez",
        ],
    ),
    (INTJ, &["oh", "ah", "eh", "hé", "hélas", "bravo", "ouais"]),
];

const ENGLISH_WORDS: &[(&str, &[&str])] = &[
    (
        DET,
        &[
            "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her",
            "its", "our", "their", "some", "any", "no", "every", "each", "all", "both",
        ],
    ),
    (
        PRON,
        &[
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "who",
            "whom", "what", "which", "mine", "yours", "hers", "ours", "theirs", "myself",
            "yourself", "himself", "herself", "itself", "something", "nothing", "everything",
            "someone", "anyone", "everyone",
        ],
    ),
    (
        ADP,
        &[
            "of", "in", "on", "at", "to", "for", "with", "by", "from", "about", "into",
            "through", "over", "under", "between", "after", "before", "during", "without",
            "against", "among", "across",
        ],
    ),
    (CCONJ, &["and", "or", "but", "nor", "yet", "so"]),
    (
        SCONJ,
        &["if", "because", "while", "although", "though", "since", "unless", "whether", "when"],
    ),
    (
        AUX,
        &[
            "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had",
            "do", "does", "did", "will", "would", "shall", "should", "can", "could", "may",
            "might", "must",
        ],
    ),
    (
        VERB,
        &[
            "go", "goes", "went", "make", "makes", "made", "say", "says", "said", "get", "gets",
            "got", "see", "sees", "saw", "know", "knows", "knew", "take", "takes", "took",
            "come", "comes", "came", "eat", "eats", "ate", "sleep", "sleeps", "slept",
        ],
    ),
    (
        ADV,
        &[
            "not", "very", "too", "also", "just", "now", "then", "here", "there", "never",
            "always", "often", "still", "already", "again", "soon", "well", "yes",
        ],
    ),
    (INTJ, &["oh", "ah", "hey", "wow", "alas", "hello"]),
];

const APOSTROPHES: [char; 2] = ['’', '\''];

// Longest suffixes first within a language; the first match wins.
const FRENCH_SUFFIXES: &[(&str, &str, usize)] = &[
    ("ement", ADV, 6),
    ("ment", ADV, 6),
    ("ation", NOUN, 6),
    ("ition", NOUN, 6),
    ("tion", NOUN, 5),
    ("sion", NOUN, 5),
    ("isme", NOUN, 5),
    ("ique", ADJ, 5),
    ("able", ADJ, 5),
    ("ible", ADJ, 5),
    ("euse", ADJ, 5),
    ("aient", VERB, 6),
    ("erons", VERB, 6),
    ("erez", VERB, 5),
    ("ait", VERB, 4),
    ("ant", VERB, 5),
    ("ité", NOUN, 4),
    ("eur", NOUN, 4),
    ("age", NOUN, 4),
    ("ure", NOUN, 4),
    ("eux", ADJ, 4),
    ("ive", ADJ, 4),
    ("if", ADJ, 4),
    ("er", VERB, 4),
    ("ir", VERB, 4),
    ("ez", VERB, 4),
    ("ée", VERB, 4),
    ("és", VERB, 4),
    ("é", VERB, 4),
];

const ENGLISH_SUFFIXES: &[(&str, &str, usize)] = &[
    ("ness", NOUN, 6),
    ("ment", NOUN, 6),
    ("tion", NOUN, 5),
    ("sion", NOUN, 5),
    ("ship", NOUN, 6),
    ("ism", NOUN, 5),
    ("ity", NOUN, 5),
    ("ing", VERB, 5),
    ("less", ADJ, 6),
    ("ous", ADJ, 5),
    ("ful", ADJ, 5),
    ("ive", ADJ, 5),
    ("able", ADJ, 6),
    ("ible", ADJ, 6),
    ("ical", ADJ, 6),
    ("ic", ADJ, 5),
    ("al", ADJ, 5),
    ("ly", ADV, 4),
    ("ize", VERB, 5),
    ("ise", VERB, 5),
    ("ed", VERB, 4),
];

/// Lexicon-backed tagger. Building it is the expensive part: construct it
/// once and pass it by reference to every pipeline run.
pub struct LexiconAnnotator {
    lang: TagLang,
    french: HashMap<&'static str, &'static str>,
    english: HashMap<&'static str, &'static str>,
}

impl LexiconAnnotator {
    pub fn new(lang: TagLang) -> Self {
        LexiconAnnotator {
            lang,
            french: build_lexicon(FRENCH_WORDS),
            english: build_lexicon(ENGLISH_WORDS),
        }
    }

    fn language_for(&self, text: &str) -> Language {
        match self.lang {
            TagLang::Fr => Language::French,
            TagLang::En => Language::English,
            TagLang::Auto => match whatlang::detect(text).map(|info| info.lang()) {
                Some(Lang::Eng) => Language::English,
                _ => Language::French,
            },
        }
    }

    /// Category of one lowercased word segment. Elided forms (`l’`, `’s`)
    /// are looked up without their apostrophe.
    fn tag_word(&self, segment: &str, language: Language) -> &'static str {
        let word = match segment.trim_matches(APOSTROPHES) {
            "" => segment,
            bare => bare,
        };
        if !word.is_empty() && word.chars().all(|c| c.is_numeric()) {
            return NUM;
        }
        if !word.chars().any(char::is_alphanumeric) {
            return if word.chars().all(|c| c.is_ascii_punctuation() || is_quote(c)) {
                PUNCT
            } else {
                SYM
            };
        }
        let (lexicon, suffixes) = match language {
            Language::French => (&self.french, FRENCH_SUFFIXES),
            Language::English => (&self.english, ENGLISH_SUFFIXES),
        };
        if let Some(pos) = lexicon.get(word) {
            return *pos;
        }
        let len = word.chars().count();
        suffixes
            .iter()
            .find(|(suffix, _, min_len)| len >= *min_len && word.ends_with(suffix))
            .map(|(_, pos, _)| *pos)
            .unwrap_or(NOUN)
    }
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        LexiconAnnotator::new(TagLang::Auto)
    }
}

impl Annotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<Token>, AnnotationError> {
        let language = self.language_for(text);
        debug!("lexicon tagger using {language:?}");
        Ok(text
            .split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .flat_map(|segment| split_elision(segment, language))
            .map(|piece| Token::new(piece, self.tag_word(piece, language)))
            .collect())
    }
}

fn build_lexicon(groups: &[(&'static str, &[&'static str])]) -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();
    for (pos, words) in groups {
        for word in *words {
            // First group wins for duplicated words.
            map.entry(*word).or_insert(*pos);
        }
    }
    map
}

/// Word segmentation keeps `l’été` or `don’t` whole. French elisions split
/// after the apostrophe (`l’` + `été`), English contractions before it
/// (`don` + `’t`).
fn split_elision(segment: &str, language: Language) -> Vec<&str> {
    match language {
        Language::French => segment.split_inclusive(APOSTROPHES).collect(),
        Language::English => match segment.find(APOSTROPHES) {
            Some(i) if i > 0 => vec![&segment[..i], &segment[i..]],
            _ => vec![segment],
        },
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '«' | '»' | '“' | '”' | '‘' | '’' | '…' | '–' | '—')
}
