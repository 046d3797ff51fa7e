use recipe_core::tokenizer::tokenize;

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Chopped ONIONS, Jalapeño peppers");
    assert!(words.contains(&"onion".to_string()));
    assert!(words.contains(&"pepper".to_string()));
    // NFKC keeps the composed ñ as a letter
    assert!(words.iter().any(|w| w.starts_with("jalapeño")));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("salt and pepper to taste with the oil");
    assert!(!words.contains(&"and".to_string()));
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"with".to_string()));
    assert!(words.contains(&"salt".to_string()));
}

#[test]
fn commas_and_spaces_both_separate() {
    assert_eq!(tokenize("rice,beans  corn"), tokenize("rice beans corn"));
}
