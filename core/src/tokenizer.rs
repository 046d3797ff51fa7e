use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","it's","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Shortest token kept; single letters carry no ingredient signal.
const MIN_TOKEN_CHARS: usize = 2;

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize ingredient text into stemmed terms using NFKC normalization,
/// lowercase, stopword removal, and English stemming. Terms are returned in
/// text order and may repeat.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut terms = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str().trim_end_matches('\'');
        if token.chars().count() < MIN_TOKEN_CHARS || is_stopword(token) { continue; }
        terms.push(STEMMER.stem(token).into_owned());
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_ingredients_share_a_stem() {
        assert_eq!(tokenize("onions"), tokenize("onion"));
    }

    #[test]
    fn drops_single_letters() {
        assert_eq!(tokenize("a b c garlic"), vec!["garlic".to_string()]);
    }
}
