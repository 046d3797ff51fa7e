use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between cooking steps in the stored instructions column.
pub const STEP_DELIMITER: &str = " | ";

/// Dietary category of a recipe. Parsing is case-insensitive and a blank
/// label means `All`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryTag {
    #[default]
    All,
    Vegetarian,
    NonVeg,
    GlutenFree,
    Other(String),
}

impl DietaryTag {
    pub fn parse(label: &str) -> Self {
        let norm = label.trim().to_lowercase();
        match norm.as_str() {
            "" | "all" => DietaryTag::All,
            "vegetarian" => DietaryTag::Vegetarian,
            "non-veg" => DietaryTag::NonVeg,
            "gluten-free" => DietaryTag::GlutenFree,
            _ => DietaryTag::Other(norm),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DietaryTag::All => "all",
            DietaryTag::Vegetarian => "vegetarian",
            DietaryTag::NonVeg => "non-veg",
            DietaryTag::GlutenFree => "gluten-free",
            DietaryTag::Other(s) => s,
        }
    }

    /// Whether a record tagged `tag` passes this filter.
    pub fn admits(&self, tag: &DietaryTag) -> bool {
        *self == DietaryTag::All || self == tag
    }
}

impl From<String> for DietaryTag {
    fn from(s: String) -> Self { DietaryTag::parse(&s) }
}

impl From<DietaryTag> for String {
    fn from(tag: DietaryTag) -> Self { tag.as_str().to_string() }
}

impl fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instructions {
    Steps(Vec<String>),
    Unavailable,
}

impl Instructions {
    /// Split a stored instructions column on the step delimiter. Steps keep
    /// their stored text; only blank steps at the end are dropped.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or_default();
        if raw.trim().is_empty() {
            return Instructions::Unavailable;
        }
        let mut steps: Vec<String> = raw.split(STEP_DELIMITER).map(str::to_string).collect();
        while steps.last().is_some_and(|s| s.trim().is_empty()) {
            steps.pop();
        }
        Instructions::Steps(steps)
    }
}

/// One corpus entry with every optional field already defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub title: String,
    pub ingredients: String,
    pub instructions: Instructions,
    pub dietary_tag: DietaryTag,
    pub image_reference: Option<String>,
}

impl RecipeRecord {
    pub fn new(title: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ingredients: ingredients.into(),
            instructions: Instructions::Unavailable,
            dietary_tag: DietaryTag::All,
            image_reference: None,
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps: Vec<String> = steps.into_iter().map(Into::into).collect();
        self.instructions = if steps.is_empty() { Instructions::Unavailable } else { Instructions::Steps(steps) };
        self
    }

    pub fn with_dietary(mut self, tag: DietaryTag) -> Self {
        self.dietary_tag = tag;
        self
    }

    pub fn with_image(mut self, reference: impl Into<String>) -> Self {
        self.image_reference = Some(reference.into());
        self
    }
}

/// A row as stored in the tabular corpus (`recipe, ingredients, instructions,
/// dietary, image_url`). Every column may be missing.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecipe {
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub dietary: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RowRejection {
    MissingTitle,
    MissingIngredients,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::MissingTitle => f.write_str("missing recipe title"),
            RowRejection::MissingIngredients => f.write_str("missing ingredients"),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<RawRecipe> for RecipeRecord {
    type Error = RowRejection;

    fn try_from(raw: RawRecipe) -> Result<Self, Self::Error> {
        let title = non_blank(raw.recipe).ok_or(RowRejection::MissingTitle)?;
        let ingredients = non_blank(raw.ingredients).ok_or(RowRejection::MissingIngredients)?;
        Ok(RecipeRecord {
            title,
            ingredients,
            instructions: Instructions::parse(raw.instructions.as_deref()),
            dietary_tag: raw.dietary.as_deref().map(DietaryTag::parse).unwrap_or_default(),
            image_reference: non_blank(raw.image_url),
        })
    }
}

/// Normalize a title for lookup: trim, underscores to spaces, case-fold.
pub fn normalize_title(title: &str) -> String {
    title.replace('_', " ").trim().to_lowercase()
}
