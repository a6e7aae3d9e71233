use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{
    catalog::{Catalog, Course, Season, WalkDuration, WeatherStyle},
    config::Config,
    database::{CourseReview, CreatePost, CreateReview, Database, Post, RatingSummary},
    error::{AppError, ErrorResponse},
    extract::{ApiJson, ApiPath, ApiQuery},
    lookup::{ImageCache, WeatherCache},
    recommend::{self, SelectionCriteria, MAX_TEMPERATURE, MIN_TEMPERATURE},
    season::{current_month, season_for_temperature},
    session::{SessionStore, SqliteKeyValueStore},
    utils::{attribution_url, image_query, map_url},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub database: Arc<Database>,
    pub image_cache: Arc<ImageCache>,
    pub weather_cache: Arc<WeatherCache>,
}

impl AppState {
    fn course(&self, id: u32) -> Result<&Course, AppError> {
        self.catalog
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))
    }

    fn session(&self, device_id: Uuid) -> SessionStore<SqliteKeyValueStore> {
        SessionStore::new(SqliteKeyValueStore::new(self.database.pool().clone(), device_id))
    }

    fn month(&self) -> u32 {
        current_month(&self.config.app_timezone)
    }
}

// Request/Response types
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseSearchQuery {
    /// Matched against course name and area, case-insensitively
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchQuery {
    pub season: Season,
    pub weather_style: WeatherStyle,
    /// 30, 60 or 90
    #[param(value_type = u16)]
    pub duration: WalkDuration,
    pub temperature: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// Observed temperature in °C
    pub temperature: Option<f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    pub query: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Page size, 1-100 (default 50)
    pub limit: Option<i64>,
    /// Number of newer posts to skip
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    pub course_id: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCard {
    #[serde(flatten)]
    pub course: Course,
    pub map_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub matched: usize,
    pub course_ids: Vec<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub month: u32,
    pub criteria: SelectionCriteria,
    pub matched: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
    pub attribution_url: String,
    pub cached: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub temperature: i32,
    pub weather_style: WeatherStyle,
    pub description: String,
    pub icon: String,
    pub suggested_season: Season,
    pub cached: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub criteria: SelectionCriteria,
    /// False when no saved criteria could be restored
    pub restored: bool,
    pub matched: usize,
    pub favorites: Vec<u32>,
    pub history: Vec<Course>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatchCountResponse {
    pub matched: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    pub matched: usize,
    pub course: Option<Course>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub course_id: u32,
    pub favorite: bool,
}

// Route handlers
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.database.health_check().await {
        Ok(()) => ("healthy", "ok"),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            ("degraded", "unreachable")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Courses",
    params(CourseSearchQuery),
    responses((status = 200, description = "Courses in catalog order", body = Vec<Course>))
)]
pub async fn list_courses(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CourseSearchQuery>,
) -> Json<Vec<Course>> {
    let courses = state
        .catalog
        .search(params.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(courses)
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Courses",
    params(("id" = u32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with its map link", body = CourseCard),
        (status = 404, description = "Unknown course", body = ErrorResponse),
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<CourseCard>, AppError> {
    let course = state.course(id)?;
    Ok(Json(CourseCard {
        map_url: map_url(course),
        course: course.clone(),
    }))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/image",
    tag = "Courses",
    params(("id" = u32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Photo for the course", body = ImageResponse),
        (status = 404, description = "Unknown course or no photo", body = ErrorResponse),
        (status = 502, description = "Photo service failed", body = ErrorResponse),
    )
)]
pub async fn get_course_image(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<ImageResponse>, AppError> {
    let query = image_query(state.course(id)?, &state.config.image_query_suffix);
    lookup_image(&state, &query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/courses/{id}/rating",
    tag = "Board",
    params(("id" = u32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Review count and average rating", body = RatingSummary),
        (status = 404, description = "Unknown course", body = ErrorResponse),
    )
)]
pub async fn get_course_rating(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<RatingSummary>, AppError> {
    let course = state.course(id)?;
    Ok(Json(state.database.rating_summary(course.id).await?))
}

#[utoipa::path(
    get,
    path = "/match",
    tag = "Recommend",
    params(MatchQuery),
    responses(
        (status = 200, description = "Courses matching the criteria", body = MatchResponse),
        (status = 400, description = "Invalid criteria", body = ErrorResponse),
    )
)]
pub async fn match_courses(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MatchQuery>,
) -> Result<Json<MatchResponse>, AppError> {
    let criteria = SelectionCriteria {
        season: params.season,
        temperature: params
            .temperature
            .unwrap_or_else(|| params.season.representative_temperature()),
        weather_style: params.weather_style,
        duration: params.duration,
    };
    criteria.validate().map_err(AppError::BadRequest)?;

    let course_ids: Vec<u32> = recommend::filter(&state.catalog, &criteria)
        .iter()
        .map(|course| course.id)
        .collect();

    Ok(Json(MatchResponse {
        matched: course_ids.len(),
        course_ids,
    }))
}

#[utoipa::path(
    get,
    path = "/suggestions",
    tag = "Recommend",
    params(SuggestionQuery),
    responses((status = 200, description = "Default criteria for today", body = SuggestionResponse))
)]
pub async fn get_suggestions(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SuggestionQuery>,
) -> Json<SuggestionResponse> {
    let month = state.month();
    let criteria = suggest_criteria(month, params.temperature);

    Json(SuggestionResponse {
        month,
        matched: recommend::match_count(&state.catalog, &criteria),
        criteria,
    })
}

#[utoipa::path(
    get,
    path = "/image",
    tag = "Lookup",
    params(ImageQuery),
    responses(
        (status = 200, description = "First landscape photo for the query", body = ImageResponse),
        (status = 400, description = "Blank query", body = ErrorResponse),
        (status = 404, description = "No photo found", body = ErrorResponse),
        (status = 502, description = "Photo service failed", body = ErrorResponse),
    )
)]
pub async fn search_image(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ImageQuery>,
) -> Result<Json<ImageResponse>, AppError> {
    lookup_image(&state, &params.query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/weather",
    tag = "Lookup",
    responses(
        (status = 200, description = "Current weather at the configured location", body = WeatherResponse),
        (status = 502, description = "Weather service failed", body = ErrorResponse),
    )
)]
pub async fn current_weather(State(state): State<AppState>) -> Result<Json<WeatherResponse>, AppError> {
    let key = state.weather_cache.lookup().location_key();
    let fetched = state.weather_cache.get(&key).await?;
    let cached = fetched.is_cached();
    let weather = fetched.value;

    Ok(Json(WeatherResponse {
        suggested_season: season_for_temperature(weather.temperature as f64, state.month()),
        temperature: weather.temperature,
        weather_style: weather.weather_style,
        description: weather.description,
        icon: weather.icon,
        cached,
        elapsed_ms: fetched.elapsed_ms,
    }))
}

#[utoipa::path(
    get,
    path = "/sessions/{device_id}",
    tag = "Sessions",
    params(("device_id" = Uuid, Path, description = "Device id")),
    responses((status = 200, description = "Restored session state", body = SessionResponse))
)]
pub async fn get_session(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let saved = state.session(device_id).load().await?;

    let restored = saved.last_criteria.is_some();
    let criteria = saved
        .last_criteria
        .unwrap_or_else(|| SelectionCriteria::suggested(state.month()));

    Ok(Json(SessionResponse {
        matched: recommend::match_count(&state.catalog, &criteria),
        criteria,
        restored,
        favorites: saved.favorites.into_iter().collect(),
        history: saved.history,
    }))
}

#[utoipa::path(
    put,
    path = "/sessions/{device_id}/criteria",
    tag = "Sessions",
    params(("device_id" = Uuid, Path, description = "Device id")),
    request_body = SelectionCriteria,
    responses(
        (status = 200, description = "Criteria saved; match count for them", body = MatchCountResponse),
        (status = 400, description = "Invalid criteria", body = ErrorResponse),
    )
)]
pub async fn save_criteria(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
    ApiJson(criteria): ApiJson<SelectionCriteria>,
) -> Result<Json<MatchCountResponse>, AppError> {
    criteria.validate().map_err(AppError::BadRequest)?;
    state.session(device_id).save_criteria(&criteria).await?;

    Ok(Json(MatchCountResponse {
        matched: recommend::match_count(&state.catalog, &criteria),
    }))
}

#[utoipa::path(
    post,
    path = "/sessions/{device_id}/draw",
    tag = "Sessions",
    params(("device_id" = Uuid, Path, description = "Device id")),
    request_body = SelectionCriteria,
    responses(
        (status = 200, description = "Random matching course, if any", body = DrawResponse),
        (status = 400, description = "Invalid criteria", body = ErrorResponse),
    )
)]
pub async fn draw_course(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
    ApiJson(criteria): ApiJson<SelectionCriteria>,
) -> Result<Json<DrawResponse>, AppError> {
    criteria.validate().map_err(AppError::BadRequest)?;

    let session = state.session(device_id);
    session.save_criteria(&criteria).await?;

    // ThreadRng is not Send; it must be gone before the next await.
    let outcome = {
        let mut rng = rand::thread_rng();
        recommend::draw(&state.catalog, &criteria, &mut rng)
    };

    if let Some(course) = &outcome.course {
        session.record_draw(course).await?;
    }

    Ok(Json(DrawResponse {
        matched: outcome.matched,
        course: outcome.course,
    }))
}

#[utoipa::path(
    post,
    path = "/sessions/{device_id}/favorites/{course_id}",
    tag = "Sessions",
    params(
        ("device_id" = Uuid, Path, description = "Device id"),
        ("course_id" = u32, Path, description = "Course id"),
    ),
    responses(
        (status = 200, description = "Favorite toggled", body = FavoriteResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse),
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    ApiPath((device_id, course_id)): ApiPath<(Uuid, u32)>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let course_id = state.course(course_id)?.id;
    let favorite = state.session(device_id).toggle_favorite(course_id).await?;

    Ok(Json(FavoriteResponse { course_id, favorite }))
}

#[utoipa::path(
    get,
    path = "/posts",
    tag = "Board",
    params(PostListQuery),
    responses((status = 200, description = "Posts, newest first; at most 100 per page, use offset for older ones", body = Vec<Post>))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PostListQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.database.list_posts(params.limit, params.offset).await?))
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "Board",
    request_body = CreatePost,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Empty or oversized post", body = ErrorResponse),
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePost>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = state.database.create_post(request).await?;
    tracing::info!("Created post {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Board",
    params(ReviewListQuery),
    responses((status = 200, description = "Reviews, newest first", body = Vec<CourseReview>))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReviewListQuery>,
) -> Result<Json<Vec<CourseReview>>, AppError> {
    Ok(Json(state.database.list_reviews(params.course_id).await?))
}

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Board",
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = CourseReview),
        (status = 400, description = "Invalid rating or content", body = ErrorResponse),
        (status = 404, description = "Unknown course", body = ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateReview>,
) -> Result<(StatusCode, Json<CourseReview>), AppError> {
    let course = state.course(request.course_id)?;
    let review = state.database.create_review(course, request).await?;
    tracing::info!("Created review {} for course {}", review.id, review.course_id);
    Ok((StatusCode::CREATED, Json(review)))
}

async fn lookup_image(state: &AppState, query: &str) -> Result<ImageResponse, AppError> {
    let fetched = state.image_cache.get(query.trim()).await?;
    let cached = fetched.is_cached();
    let image = fetched.value;

    Ok(ImageResponse {
        attribution_url: attribution_url(&image.photographer_url, &state.config.attribution_source),
        url: image.url,
        photographer: image.photographer,
        photographer_url: image.photographer_url,
        cached,
        elapsed_ms: fetched.elapsed_ms,
    })
}

/// Month defaults, with an observed temperature overriding season and temperature.
fn suggest_criteria(month: u32, observed: Option<f64>) -> SelectionCriteria {
    let mut criteria = SelectionCriteria::suggested(month);
    if let Some(observed) = observed.filter(|t| t.is_finite()) {
        criteria.season = season_for_temperature(observed, month);
        criteria.temperature = (observed.round() as i32).clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }
    criteria
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Walk Randomizer API",
        description = "Picks a random walking course that fits the season, weather and time available.",
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Courses", description = "Course catalog"),
        (name = "Recommend", description = "Filtering and suggestions"),
        (name = "Lookup", description = "Cached photo and weather lookups"),
        (name = "Sessions", description = "Per-device criteria, favorites and draw history"),
        (name = "Board", description = "Posts and course reviews"),
    ),
    paths(
        health,
        list_courses,
        get_course,
        get_course_image,
        get_course_rating,
        match_courses,
        get_suggestions,
        search_image,
        current_weather,
        get_session,
        save_criteria,
        draw_course,
        toggle_favorite,
        list_posts,
        create_post,
        list_reviews,
        create_review,
    ),
    components(schemas(
        Course,
        Season,
        WeatherStyle,
        SelectionCriteria,
        HealthResponse,
        CourseCard,
        MatchResponse,
        SuggestionResponse,
        ImageResponse,
        WeatherResponse,
        SessionResponse,
        MatchCountResponse,
        DrawResponse,
        FavoriteResponse,
        Post,
        CreatePost,
        CourseReview,
        CreateReview,
        RatingSummary,
        ErrorResponse,
    ))
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/:id", get(get_course))
        .route("/courses/:id/image", get(get_course_image))
        .route("/courses/:id/rating", get(get_course_rating))
        .route("/match", get(match_courses))
        .route("/suggestions", get(get_suggestions))
        .route("/image", get(search_image))
        .route("/weather", get(current_weather))
        .route("/sessions/:device_id", get(get_session))
        .route("/sessions/:device_id/criteria", put(save_criteria))
        .route("/sessions/:device_id/draw", post(draw_course))
        .route("/sessions/:device_id/favorites/:course_id", post(toggle_favorite))
        .route("/posts", get(list_posts).post(create_post))
        .route("/reviews", get(list_reviews).post(create_review))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
