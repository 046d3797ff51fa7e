use recipe_core::corpus::{into_records, read_csv};
use recipe_core::persist::{save_bundle, IndexPaths};
use recipe_core::{
    DietaryTag, EngineConfig, RecipeEngine, RecipeRecord, ResolvedImage, Retrieval, Weighting,
    RECIPE_NOT_FOUND,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn seed_images(root: &Path, refs: &[(&str, &str)]) {
    for (category, filename) in refs {
        fs::create_dir_all(root.join(category)).unwrap();
        fs::write(root.join(category).join(filename), b"jpg").unwrap();
    }
}

fn engine_with(corpus: Vec<RecipeRecord>, image_root: &Path) -> RecipeEngine {
    let config = EngineConfig { image_root: image_root.to_path_buf(), ..Default::default() };
    RecipeEngine::build(corpus, Weighting::default(), &config).unwrap()
}

fn pasta_and_curry() -> Vec<RecipeRecord> {
    vec![
        RecipeRecord::new("pasta", "tomato garlic basil")
            .with_dietary(DietaryTag::Vegetarian)
            .with_image("/dataset/food-101/images/pasta/1.jpg"),
        RecipeRecord::new("chicken curry", "chicken onion spice")
            .with_dietary(DietaryTag::NonVeg)
            .with_image("/dataset/food-101/images/chicken_curry/2.jpg"),
    ]
}

#[test]
fn tomato_basil_prefers_pasta() {
    let dir = tempdir().unwrap();
    seed_images(dir.path(), &[("pasta", "1.jpg"), ("chicken_curry", "2.jpg")]);
    let engine = engine_with(pasta_and_curry(), dir.path());

    let all = engine.retrieve("tomato basil", "all");
    assert_eq!(all.results()[0].title, "pasta");
    assert_eq!(
        all.results()[0].image,
        ResolvedImage::Dataset { category: "pasta".into(), filename: "1.jpg".into() }
    );

    let non_veg = engine.retrieve("tomato basil", "Non-Veg");
    assert!(non_veg.results().iter().all(|r| r.title != "pasta"));
    assert_eq!(non_veg.results().len(), 1);
    assert_eq!(non_veg.results()[0].dietary_tag, DietaryTag::NonVeg);
}

#[test]
fn empty_query_returns_first_rows_in_order() {
    let dir = tempdir().unwrap();
    let corpus: Vec<RecipeRecord> = ["rice", "beans", "corn", "kale", "leek"]
        .iter()
        .enumerate()
        .map(|(i, ing)| RecipeRecord::new(format!("dish {i}"), *ing))
        .collect();
    let engine = engine_with(corpus, dir.path());

    assert!(engine.rank("").iter().all(|c| c.score == 0.0));
    let retrieved = engine.retrieve("", "all");
    let titles: Vec<&str> = retrieved.results().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["dish 0", "dish 1", "dish 2"]);
    assert_eq!(engine.retrieve("", "vegetarian"), Retrieval::NoMatches);
}

#[test]
fn at_most_three_results_in_score_order() {
    let dir = tempdir().unwrap();
    let corpus = vec![
        RecipeRecord::new("a", "garlic"),
        RecipeRecord::new("b", "garlic tomato"),
        RecipeRecord::new("c", "tomato basil garlic"),
        RecipeRecord::new("d", "rice"),
        RecipeRecord::new("e", "tomato"),
    ];
    let engine = engine_with(corpus.clone(), dir.path());
    let ranked = engine.rank("tomato garlic");
    assert_eq!(ranked.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(ranked[0].corpus_index, 1);

    let out = engine.retrieve("tomato garlic", "all");
    assert!(out.results().len() <= 3);
    for r in out.results() {
        assert!(corpus.iter().any(|c| c.title == r.title));
    }
}

#[test]
fn filter_output_matches_requested_tag() {
    let dir = tempdir().unwrap();
    let corpus = vec![
        RecipeRecord::new("bread", "flour yeast").with_dietary(DietaryTag::GlutenFree),
        RecipeRecord::new("omelette", "egg flour").with_dietary(DietaryTag::NonVeg),
        RecipeRecord::new("pancake", "flour milk").with_dietary(DietaryTag::Vegetarian),
    ];
    let engine = engine_with(corpus, dir.path());
    for tag in [DietaryTag::GlutenFree, DietaryTag::NonVeg, DietaryTag::Vegetarian] {
        let out = engine.retrieve("flour", tag.as_str());
        assert!(out.results().iter().all(|r| r.dietary_tag == tag));
    }
}

#[test]
fn retrieve_is_idempotent() {
    let dir = tempdir().unwrap();
    let engine = engine_with(pasta_and_curry(), dir.path());
    assert_eq!(engine.retrieve("garlic onion", "all"), engine.retrieve("garlic onion", "all"));
}

#[test]
fn missing_image_falls_back_to_default() {
    let dir = tempdir().unwrap();
    let engine = engine_with(pasta_and_curry(), dir.path());
    let out = engine.retrieve("tomato basil", "vegetarian");
    let pasta = &out.results()[0];
    assert_eq!(pasta.title, "pasta");
    assert_eq!(pasta.ingredients, "tomato garlic basil");
    assert_eq!(pasta.image, ResolvedImage::Default);
}

#[test]
fn instructions_lookup_is_normalized() {
    let csv = "recipe,ingredients,instructions,dietary,image_url\n\
        bread pudding,bread milk egg sugar,Soak bread | Bake 40 minutes | ,vegetarian,\n\
        Bread Pudding,bread cream,Never reached,vegetarian,\n";
    let records = into_records(read_csv(csv.as_bytes()).unwrap());
    let dir = tempdir().unwrap();
    let engine = engine_with(records, dir.path());

    assert_eq!(engine.lookup_instructions("Bread_Pudding"), vec!["Soak bread", "Bake 40 minutes"]);
    assert_eq!(engine.lookup_instructions("bread pudding"), vec!["Soak bread", "Bake 40 minutes"]);
    assert_eq!(engine.lookup_instructions("nonexistent_dish"), vec![RECIPE_NOT_FOUND.to_string()]);
}

#[test]
fn persisted_bundle_ranks_identically() {
    let dir = tempdir().unwrap();
    let corpus = pasta_and_curry();
    let fresh = engine_with(corpus.clone(), dir.path());
    let paths = IndexPaths::new(dir.path().join("index"));
    save_bundle(&paths, fresh.corpus(), fresh.index()).unwrap();

    let config = EngineConfig { image_root: dir.path().to_path_buf(), ..Default::default() };
    let loaded = RecipeEngine::open(&paths, &config).unwrap();
    assert_eq!(loaded.rank("onion spice"), fresh.rank("onion spice"));
    assert_eq!(loaded.retrieve("tomato", "all"), fresh.retrieve("tomato", "all"));
}
