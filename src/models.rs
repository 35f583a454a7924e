use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCategory {
    pub id: i64,
    pub name: String,
}

impl From<DbCategory> for Category {
    fn from(c: DbCategory) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbTag {
    pub id: i64,
    pub name: String,
}

impl From<DbTag> for Tag {
    fn from(t: DbTag) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub photo_path: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbRecipe {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub photo_path: Option<String>,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DbRecipe> for Recipe {
    fn from(r: DbRecipe) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            category_id: r.category_id,
            title: r.title,
            description: r.description,
            prep_time_minutes: r.prep_time_minutes,
            cook_time_minutes: r.cook_time_minutes,
            servings: r.servings,
            photo_path: r.photo_path,
            is_published: r.is_published,
            created_at: to_utc(r.created_at),
            updated_at: to_utc(r.updated_at),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbRecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl From<DbRecipeIngredient> for RecipeIngredient {
    fn from(i: DbRecipeIngredient) -> Self {
        Self {
            id: i.id,
            recipe_id: i.recipe_id,
            name: i.name,
            quantity: i.quantity,
            unit: i.unit,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RecipeStep {
    pub id: i64,
    pub recipe_id: i64,
    pub step_number: i64,
    pub instruction: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbRecipeStep {
    pub id: i64,
    pub recipe_id: i64,
    pub step_number: i64,
    pub instruction: String,
}

impl From<DbRecipeStep> for RecipeStep {
    fn from(s: DbRecipeStep) -> Self {
        Self {
            id: s.id,
            recipe_id: s.recipe_id,
            step_number: s.step_number,
            instruction: s.instruction,
        }
    }
}

/// A recipe plus its category and tags, as returned by the list endpoints.
#[derive(Serialize, Clone, Debug)]
pub struct RecipeSummary {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

/// The full aggregate: recipe, category, tags, ingredients and ordered steps.
#[derive(Serialize, Clone, Debug)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
}

#[derive(Serialize, Clone, Debug)]
pub struct HistoryEntry {
    pub recipe_id: i64,
    pub view_count: i64,
    pub last_viewed_at: DateTime<Utc>,
    pub title: String,
    pub photo_path: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbHistoryEntry {
    pub recipe_id: i64,
    pub view_count: i64,
    pub last_viewed_at: NaiveDateTime,
    pub title: String,
    pub photo_path: Option<String>,
}

impl From<DbHistoryEntry> for HistoryEntry {
    fn from(h: DbHistoryEntry) -> Self {
        Self {
            recipe_id: h.recipe_id,
            view_count: h.view_count,
            last_viewed_at: to_utc(h.last_viewed_at),
            title: h.title,
            photo_path: h.photo_path,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Notification {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbNotification {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DbNotification> for Notification {
    fn from(n: DbNotification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            body: n.body,
            created_at: to_utc(n.created_at),
            updated_at: to_utc(n.updated_at),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Suggestion {
    pub id: i64,
    pub name: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbSuggestion {
    pub id: i64,
    pub name: Option<String>,
    pub message: String,
    pub created_at: NaiveDateTime,
}

impl From<DbSuggestion> for Suggestion {
    fn from(s: DbSuggestion) -> Self {
        Self {
            id: s.id,
            name: s.name,
            message: s.message,
            created_at: to_utc(s.created_at),
        }
    }
}

/// Offset-paginated result set, 10 items per page everywhere.
#[derive(Serialize, Clone, Debug)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}
