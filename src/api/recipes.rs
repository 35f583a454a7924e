use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::{Validate, ValidationError};

use crate::auth::{Permission, User};
use crate::db::{
    NewIngredient, NewRecipe, NewStep, RecipeUpdate, create_recipe, delete_recipe,
    get_recipe_detail, get_recipe_row, list_published_recipes, list_recipes_by_user,
    set_recipe_published, update_recipe,
};
use crate::error::AppError;
use crate::models::{Page, RecipeDetail, RecipeSummary};
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse,
};

use super::MessageResponse;

fn validate_tag_names(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.len() > 50) {
        return Err(ValidationError::new("tag_too_long")
            .with_message("Tags must be at most 50 characters".into()));
    }
    Ok(())
}

#[derive(Deserialize, Validate, Clone)]
pub struct IngredientRequest {
    #[validate(length(min = 1, max = 255, message = "Ingredient name must be 1-255 characters"))]
    name: String,
    #[validate(length(max = 50, message = "Quantity must be at most 50 characters"))]
    quantity: Option<String>,
    #[validate(length(max = 50, message = "Unit must be at most 50 characters"))]
    unit: Option<String>,
}

impl From<IngredientRequest> for NewIngredient {
    fn from(req: IngredientRequest) -> Self {
        Self {
            name: req.name,
            quantity: req.quantity,
            unit: req.unit,
        }
    }
}

#[derive(Deserialize, Validate, Clone)]
pub struct StepRequest {
    #[validate(range(min = 1, message = "Step numbers start at 1"))]
    step_number: i64,
    #[validate(length(min = 1, message = "Instruction must not be empty"))]
    instruction: String,
}

impl From<StepRequest> for NewStep {
    fn from(req: StepRequest) -> Self {
        Self {
            step_number: req.step_number,
            instruction: req.instruction,
        }
    }
}

#[derive(Deserialize, Validate, Clone)]
pub struct RecipeCreateRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    title: String,
    description: Option<String>,
    category_id: Option<i64>,
    #[validate(range(min = 0, message = "Prep time must be non-negative"))]
    prep_time_minutes: Option<i64>,
    #[validate(range(min = 0, message = "Cook time must be non-negative"))]
    cook_time_minutes: Option<i64>,
    #[validate(range(min = 1, message = "Servings must be positive"))]
    servings: Option<i64>,
    photo_path: Option<String>,
    is_published: Option<bool>,
    #[validate(nested)]
    ingredients: Option<Vec<IngredientRequest>>,
    #[validate(nested)]
    steps: Option<Vec<StepRequest>>,
    #[validate(custom(function = validate_tag_names))]
    tags: Option<Vec<String>>,
}

#[derive(Deserialize, Validate, Clone)]
pub struct RecipeUpdateRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    title: Option<String>,
    description: Option<String>,
    category_id: Option<i64>,
    #[validate(range(min = 0, message = "Prep time must be non-negative"))]
    prep_time_minutes: Option<i64>,
    #[validate(range(min = 0, message = "Cook time must be non-negative"))]
    cook_time_minutes: Option<i64>,
    #[validate(range(min = 1, message = "Servings must be positive"))]
    servings: Option<i64>,
    photo_path: Option<String>,
    is_published: Option<bool>,
    #[validate(nested)]
    ingredients: Option<Vec<IngredientRequest>>,
    #[validate(nested)]
    steps: Option<Vec<StepRequest>>,
    #[validate(custom(function = validate_tag_names))]
    tags: Option<Vec<String>>,
}

impl From<RecipeUpdateRequest> for RecipeUpdate {
    fn from(req: RecipeUpdateRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category_id: req.category_id,
            prep_time_minutes: req.prep_time_minutes,
            cook_time_minutes: req.cook_time_minutes,
            servings: req.servings,
            photo_path: req.photo_path,
            is_published: req.is_published,
            ingredients: req
                .ingredients
                .map(|list| list.into_iter().map(NewIngredient::from).collect()),
            steps: req
                .steps
                .map(|list| list.into_iter().map(NewStep::from).collect()),
            tags: req.tags,
        }
    }
}

#[get("/recipes?<search>&<category_id>&<page>")]
pub async fn api_list_recipes(
    search: Option<String>,
    category_id: Option<i64>,
    page: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Page<RecipeSummary>>, AppError> {
    let recipes =
        list_published_recipes(db, search.as_deref(), category_id, page.unwrap_or(1)).await?;

    Ok(Json(recipes))
}

// Unpublished recipes are reported as not-found to everyone but their owner
// and admins, so their existence doesn't leak.
#[get("/recipes/<id>")]
pub async fn api_get_recipe(
    id: i64,
    user: Option<User>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RecipeDetail>, AppError> {
    let detail = get_recipe_detail(db, id).await?;

    let visible = match &user {
        Some(user) => super::recipe_visible_to(&detail.recipe, user),
        None => detail.recipe.is_published,
    };

    if !visible {
        return Err(AppError::NotFound(format!(
            "Recipe with id {} not found",
            id
        )));
    }

    Ok(Json(detail))
}

#[get("/me/recipes?<page>")]
pub async fn api_my_recipes(
    user: User,
    page: Option<i64>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Page<RecipeSummary>>, AppError> {
    let recipes = list_recipes_by_user(db, user.id, page.unwrap_or(1)).await?;

    Ok(Json(recipes))
}

#[post("/recipes", data = "<recipe>")]
pub async fn api_create_recipe(
    recipe: Json<RecipeCreateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<RecipeDetail>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::CreateRecipes)
        .validate_custom()?;

    let validated = recipe.validate_custom()?;

    let new = NewRecipe {
        title: validated.title,
        description: validated.description,
        category_id: validated.category_id,
        prep_time_minutes: validated.prep_time_minutes,
        cook_time_minutes: validated.cook_time_minutes,
        servings: validated.servings,
        photo_path: validated.photo_path,
        is_published: validated.is_published,
        ingredients: validated
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .map(NewIngredient::from)
            .collect(),
        steps: validated
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(NewStep::from)
            .collect(),
        tags: validated.tags.unwrap_or_default(),
    };

    let detail = create_recipe(db, user.id, new).await.validate_custom()?;

    Ok(Custom(Status::Created, Json(detail)))
}

async fn apply_recipe_update(
    id: i64,
    update: Json<RecipeUpdateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RecipeDetail>, Custom<Json<ValidationResponse>>> {
    let validated = update.validate_custom()?;

    // The ownership gate runs before any mutation.
    let recipe = get_recipe_row(db, id).await.validate_custom()?;
    user.require_owner_or_admin(recipe.user_id)
        .validate_custom()?;

    let detail = update_recipe(db, id, RecipeUpdate::from(validated))
        .await
        .validate_custom()?;

    Ok(Json(detail))
}

#[put("/recipes/<id>", data = "<update>")]
pub async fn api_update_recipe(
    id: i64,
    update: Json<RecipeUpdateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RecipeDetail>, Custom<Json<ValidationResponse>>> {
    apply_recipe_update(id, update, user, db).await
}

#[patch("/recipes/<id>", data = "<update>")]
pub async fn api_patch_recipe(
    id: i64,
    update: Json<RecipeUpdateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RecipeDetail>, Custom<Json<ValidationResponse>>> {
    apply_recipe_update(id, update, user, db).await
}

#[delete("/recipes/<id>")]
pub async fn api_delete_recipe(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    let recipe = get_recipe_row(db, id).await?;
    user.require_owner_or_admin(recipe.user_id)?;

    delete_recipe(db, id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}

#[patch("/recipes/<id>/publish")]
pub async fn api_publish_recipe(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::PublishRecipes)?;

    set_recipe_published(db, id, true).await?;

    Ok(Json(MessageResponse::new("Published")))
}

#[patch("/recipes/<id>/unpublish")]
pub async fn api_unpublish_recipe(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MessageResponse>, Status> {
    user.require_permission(Permission::PublishRecipes)?;

    set_recipe_published(db, id, false).await?;

    Ok(Json(MessageResponse::new("Unpublished")))
}
