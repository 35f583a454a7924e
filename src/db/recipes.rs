use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::{
    Category, DbCategory, DbRecipe, DbRecipeIngredient, DbRecipeStep, DbTag, Page, Recipe,
    RecipeDetail, RecipeIngredient, RecipeStep, RecipeSummary, Tag,
};

use super::tags::sync_recipe_tags;
use super::{PER_PAGE, page_offset};

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStep {
    pub step_number: i64,
    pub instruction: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub photo_path: Option<String>,
    pub is_published: Option<bool>,
    pub ingredients: Vec<NewIngredient>,
    pub steps: Vec<NewStep>,
    pub tags: Vec<String>,
}

/// Partial update: `None` scalars are left untouched. A present collection
/// (even an empty one) replaces the stored collection wholesale; an omitted
/// collection is left untouched.
#[derive(Debug, Clone, Default)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub prep_time_minutes: Option<i64>,
    pub cook_time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub photo_path: Option<String>,
    pub is_published: Option<bool>,
    pub ingredients: Option<Vec<NewIngredient>>,
    pub steps: Option<Vec<NewStep>>,
    pub tags: Option<Vec<String>>,
}

#[instrument(skip(pool))]
pub async fn get_recipe_row(pool: &Pool<Sqlite>, id: i64) -> Result<Recipe, AppError> {
    let row = sqlx::query_as::<_, DbRecipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(recipe) => Ok(Recipe::from(recipe)),
        _ => Err(AppError::NotFound(format!(
            "Recipe with id {} not found",
            id
        ))),
    }
}

async fn get_recipe_tags(pool: &Pool<Sqlite>, recipe_id: i64) -> Result<Vec<Tag>, AppError> {
    let rows = sqlx::query_as::<_, DbTag>(
        "SELECT t.id, t.name FROM tags t
         JOIN recipe_tag rt ON rt.tag_id = t.id
         WHERE rt.recipe_id = ?
         ORDER BY t.name",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Tag::from).collect())
}

async fn get_recipe_category(
    pool: &Pool<Sqlite>,
    category_id: Option<i64>,
) -> Result<Option<Category>, AppError> {
    let Some(category_id) = category_id else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, DbCategory>("SELECT id, name FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Category::from))
}

pub(crate) async fn summarize(
    pool: &Pool<Sqlite>,
    rows: Vec<DbRecipe>,
) -> Result<Vec<RecipeSummary>, AppError> {
    let mut summaries = Vec::with_capacity(rows.len());

    for row in rows {
        let recipe = Recipe::from(row);
        let category = get_recipe_category(pool, recipe.category_id).await?;
        let tags = get_recipe_tags(pool, recipe.id).await?;
        summaries.push(RecipeSummary {
            recipe,
            category,
            tags,
        });
    }

    Ok(summaries)
}

/// Hydrates the full aggregate: recipe row, category, tags, ingredients and
/// steps ordered by step number.
#[instrument(skip(pool))]
pub async fn get_recipe_detail(pool: &Pool<Sqlite>, id: i64) -> Result<RecipeDetail, AppError> {
    let recipe = get_recipe_row(pool, id).await?;
    let category = get_recipe_category(pool, recipe.category_id).await?;
    let tags = get_recipe_tags(pool, id).await?;

    let ingredients = sqlx::query_as::<_, DbRecipeIngredient>(
        "SELECT * FROM recipe_ingredients WHERE recipe_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(RecipeIngredient::from)
    .collect();

    let steps = sqlx::query_as::<_, DbRecipeStep>(
        "SELECT * FROM recipe_steps WHERE recipe_id = ? ORDER BY step_number",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(RecipeStep::from)
    .collect();

    Ok(RecipeDetail {
        recipe,
        category,
        tags,
        ingredients,
        steps,
    })
}

async fn ensure_category_exists(
    tx: &mut Transaction<'_, Sqlite>,
    category_id: i64,
) -> Result<(), AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&mut **tx)
        .await?;

    if exists.is_none() {
        return Err(AppError::Validation(format!(
            "Category with id {} does not exist",
            category_id
        )));
    }

    Ok(())
}

async fn insert_ingredients(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    ingredients: &[NewIngredient],
) -> Result<(), AppError> {
    for ingredient in ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, name, quantity, unit) VALUES (?, ?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(&ingredient.name)
        .bind(&ingredient.quantity)
        .bind(&ingredient.unit)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_steps(
    tx: &mut Transaction<'_, Sqlite>,
    recipe_id: i64,
    steps: &[NewStep],
) -> Result<(), AppError> {
    // A duplicate step number surfaces as a unique-constraint conflict and
    // rolls back the whole aggregate.
    for step in steps {
        sqlx::query("INSERT INTO recipe_steps (recipe_id, step_number, instruction) VALUES (?, ?, ?)")
            .bind(recipe_id)
            .bind(step.step_number)
            .bind(&step.instruction)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Creates a recipe together with its ingredients, steps and tag links as one
/// atomic unit. Any failure leaves no partial aggregate behind.
#[instrument(skip(pool, new), fields(title = %new.title))]
pub async fn create_recipe(
    pool: &Pool<Sqlite>,
    user_id: i64,
    new: NewRecipe,
) -> Result<RecipeDetail, AppError> {
    info!("Creating recipe");

    let mut tx = pool.begin().await?;

    if let Some(category_id) = new.category_id {
        ensure_category_exists(&mut tx, category_id).await?;
    }

    let now = Utc::now().naive_utc();

    let res = sqlx::query(
        "INSERT INTO recipes
         (user_id, category_id, title, description, prep_time_minutes, cook_time_minutes,
          servings, photo_path, is_published, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(new.category_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.prep_time_minutes)
    .bind(new.cook_time_minutes)
    .bind(new.servings)
    .bind(&new.photo_path)
    .bind(new.is_published.unwrap_or(true))
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let recipe_id = res.last_insert_rowid();

    insert_ingredients(&mut tx, recipe_id, &new.ingredients).await?;
    insert_steps(&mut tx, recipe_id, &new.steps).await?;
    sync_recipe_tags(&mut tx, recipe_id, &new.tags).await?;

    tx.commit().await?;

    get_recipe_detail(pool, recipe_id).await
}

/// Applies a partial update. Present scalar fields replace the stored value;
/// present collections are replaced wholesale (delete-all-then-reinsert, so
/// child row ids are not stable across updates); omitted ones are untouched.
#[instrument(skip(pool, update))]
pub async fn update_recipe(
    pool: &Pool<Sqlite>,
    id: i64,
    update: RecipeUpdate,
) -> Result<RecipeDetail, AppError> {
    info!("Updating recipe");

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, DbRecipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recipe with id {} not found", id)))?;

    let category_id = match update.category_id {
        Some(category_id) => {
            ensure_category_exists(&mut tx, category_id).await?;
            Some(category_id)
        }
        None => current.category_id,
    };

    let now = Utc::now().naive_utc();

    sqlx::query(
        "UPDATE recipes
         SET category_id = ?, title = ?, description = ?, prep_time_minutes = ?,
             cook_time_minutes = ?, servings = ?, photo_path = ?, is_published = ?,
             updated_at = ?
         WHERE id = ?",
    )
    .bind(category_id)
    .bind(update.title.as_ref().unwrap_or(&current.title))
    .bind(update.description.as_ref().or(current.description.as_ref()))
    .bind(update.prep_time_minutes.or(current.prep_time_minutes))
    .bind(update.cook_time_minutes.or(current.cook_time_minutes))
    .bind(update.servings.or(current.servings))
    .bind(update.photo_path.as_ref().or(current.photo_path.as_ref()))
    .bind(update.is_published.unwrap_or(current.is_published))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(ingredients) = &update.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_ingredients(&mut tx, id, ingredients).await?;
    }

    if let Some(steps) = &update.steps {
        sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_steps(&mut tx, id, steps).await?;
    }

    if let Some(tags) = &update.tags {
        sync_recipe_tags(&mut tx, id, tags).await?;
    }

    tx.commit().await?;

    get_recipe_detail(pool, id).await
}

/// Cascades to ingredients, steps, tag links, favorites and history rows.
#[instrument(skip(pool))]
pub async fn delete_recipe(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting recipe");
    let res = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Recipe with id {} not found",
            id
        )));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn set_recipe_published(
    pool: &Pool<Sqlite>,
    id: i64,
    published: bool,
) -> Result<(), AppError> {
    info!("Setting recipe publication state");
    let now = Utc::now().naive_utc();

    let res = sqlx::query("UPDATE recipes SET is_published = ?, updated_at = ? WHERE id = ?")
        .bind(published)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Recipe with id {} not found",
            id
        )));
    }

    Ok(())
}

/// Published recipes, newest first, with optional title search and category
/// filter.
#[instrument(skip(pool))]
pub async fn list_published_recipes(
    pool: &Pool<Sqlite>,
    search: Option<&str>,
    category_id: Option<i64>,
    page: i64,
) -> Result<Page<RecipeSummary>, AppError> {
    info!("Listing published recipes");
    let (page, offset) = page_offset(page);

    let mut count_query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM recipes WHERE is_published = TRUE");
    let mut list_query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM recipes WHERE is_published = TRUE");

    for query in [&mut count_query, &mut list_query] {
        if let Some(search) = search {
            query.push(" AND title LIKE ");
            query.push_bind(format!("%{}%", search));
        }
        if let Some(category_id) = category_id {
            query.push(" AND category_id = ");
            query.push_bind(category_id);
        }
    }

    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    list_query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    list_query.push_bind(PER_PAGE);
    list_query.push(" OFFSET ");
    list_query.push_bind(offset);

    let rows: Vec<DbRecipe> = list_query.build_query_as().fetch_all(pool).await?;

    Ok(Page {
        data: summarize(pool, rows).await?,
        page,
        per_page: PER_PAGE,
        total,
    })
}

/// All of a user's own recipes, published or not, newest first.
#[instrument(skip(pool))]
pub async fn list_recipes_by_user(
    pool: &Pool<Sqlite>,
    user_id: i64,
    page: i64,
) -> Result<Page<RecipeSummary>, AppError> {
    info!("Listing recipes by user");
    let (page, offset) = page_offset(page);

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, DbRecipe>(
        "SELECT * FROM recipes WHERE user_id = ?
         ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(Page {
        data: summarize(pool, rows).await?,
        page,
        per_page: PER_PAGE,
        total,
    })
}
