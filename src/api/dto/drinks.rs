/*
 * Responsibility
 * - Drinks request/response DTOs
 * - short form (public listing) hides ingredient names, long form shows everything
 */
use serde::{Deserialize, Serialize};

use crate::repos::drink_repo::{Drink, Ingredient};

/// A recipe may be posted as a list of ingredients or as a single one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_vec(self) -> Vec<Ingredient> {
        match self {
            Self::Many(ingredients) => ingredients,
            Self::One(ingredient) => vec![ingredient],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

impl CreateDrinkRequest {
    pub fn validate(self) -> Result<(String, Vec<Ingredient>), &'static str> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err("title is required");
        }
        if title.chars().count() > 80 {
            return Err("title is too long");
        }

        let recipe = self.recipe.into_vec();
        if recipe.is_empty() {
            return Err("recipe is required");
        }

        Ok((title, recipe))
    }
}

/// Blank title / empty recipe mean "leave unchanged".
#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn into_changes(self) -> Result<(Option<String>, Option<Vec<Ingredient>>), &'static str> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(title) = &title
            && title.chars().count() > 80
        {
            return Err("title is too long");
        }

        let recipe = self
            .recipe
            .map(RecipeInput::into_vec)
            .filter(|r| !r.is_empty());

        Ok((title, recipe))
    }
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: f64,
}

#[derive(Debug, Serialize)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl From<Drink> for DrinkShort {
    fn from(drink: Drink) -> Self {
        Self {
            id: drink.id,
            title: drink.title,
            recipe: drink
                .recipe
                .into_iter()
                .map(|i| ShortIngredient {
                    color: i.color,
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<Drink> for DrinkLong {
    fn from(drink: Drink) -> Self {
        Self {
            id: drink.id,
            title: drink.title,
            recipe: drink.recipe,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: T,
}

impl<T> DrinksResponse<T> {
    pub fn ok(drinks: T) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    pub delete: i32,
}
