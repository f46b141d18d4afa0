// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{AppError, expose_error_detail, panic_response},
    handlers::{
        config_settings, difficulty_boxes, dynamics, exercise_packages, exercises, health, images,
        page_config, posts, teacher_profiles, testimonies, users,
    },
    ssr,
    state::AppState,
    storage::images::MAX_IMAGE_BYTES,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' cdnjs.cloudflare.com; \
    img-src 'self' data: https:";

/// Room for the multipart envelope around a maximum-size image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Assembles the main application router.
///
/// * `/health`, then the JSON API under `/api`, then uploaded files.
/// * Everything else is the single-page site, with the crawler gate in front.
/// * Global middleware, outermost first: error-detail exposure, panic
///   recovery, CORS, tracing, then the security headers.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/email/{email}",
            get(users::get_user_by_email).put(users::update_user),
        );

    let post_routes = Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route("/user/{email}", get(posts::list_posts_by_author))
        .route("/slug/{slug}", get(posts::get_post_by_slug))
        .route("/{slug}", put(posts::update_post).delete(posts::delete_post));

    let testimony_routes = Router::new()
        .route(
            "/",
            get(testimonies::list_testimonies).post(testimonies::create_testimony),
        )
        .route("/featured", get(testimonies::list_featured_testimonies))
        .route("/user/{email}", get(testimonies::list_testimonies_by_user));

    let dynamic_routes = Router::new()
        .route("/", get(dynamics::list_dynamics).post(dynamics::create_dynamic))
        .route("/user/{email}", get(dynamics::list_dynamics_by_author))
        .route("/slug/{slug}", get(dynamics::get_dynamic_by_slug))
        .route(
            "/{slug}",
            put(dynamics::update_dynamic).delete(dynamics::delete_dynamic),
        );

    let exercise_routes = Router::new()
        .route(
            "/",
            get(exercises::list_exercises).post(exercises::create_exercise),
        )
        .route("/bulk", post(exercises::create_exercises_bulk))
        .route("/author/{email}", get(exercises::list_exercises_by_author))
        .route(
            "/{id}",
            get(exercises::get_exercise)
                .put(exercises::update_exercise)
                .delete(exercises::delete_exercise),
        )
        .route("/{id}/complete", post(exercises::complete_exercise));

    let package_routes = Router::new()
        .route(
            "/",
            get(exercise_packages::list_packages).post(exercise_packages::create_package),
        )
        .route("/search", get(exercise_packages::search_packages))
        .route("/slug/{slug}", get(exercise_packages::get_package_by_slug))
        .route(
            "/{id}",
            get(exercise_packages::get_package)
                .put(exercise_packages::update_package)
                .delete(exercise_packages::delete_package),
        )
        .route(
            "/{id}/exercises",
            get(exercise_packages::list_package_exercises)
                .post(exercise_packages::add_exercise_to_package),
        )
        .route(
            "/{id}/exercises/{exercise_id}",
            delete(exercise_packages::remove_exercise_from_package),
        )
        .route("/{id}/complete", post(exercise_packages::complete_package_exercise))
        .route("/{id}/progress", get(exercise_packages::get_package_progress));

    let profile_routes = Router::new()
        .route(
            "/",
            get(teacher_profiles::list_profiles).post(teacher_profiles::create_profile),
        )
        .route("/featured", get(teacher_profiles::featured_profiles))
        .route("/search", get(teacher_profiles::search_profiles))
        .route(
            "/{user_id}",
            get(teacher_profiles::get_profile)
                .put(teacher_profiles::update_profile)
                .delete(teacher_profiles::delete_profile),
        )
        .route("/{user_id}/view", post(teacher_profiles::record_view))
        .route(
            "/{user_id}/sections",
            get(teacher_profiles::list_sections).post(teacher_profiles::create_section),
        )
        .route(
            "/{user_id}/sections/{id}",
            put(teacher_profiles::update_section).delete(teacher_profiles::delete_section),
        )
        .route(
            "/{user_id}/education",
            get(teacher_profiles::list_education).post(teacher_profiles::create_education),
        )
        .route(
            "/{user_id}/education/{id}",
            put(teacher_profiles::update_education).delete(teacher_profiles::delete_education),
        )
        .route(
            "/{user_id}/experience",
            get(teacher_profiles::list_experience).post(teacher_profiles::create_experience),
        )
        .route(
            "/{user_id}/experience/{id}",
            put(teacher_profiles::update_experience).delete(teacher_profiles::delete_experience),
        )
        .route(
            "/{user_id}/certifications",
            get(teacher_profiles::list_certifications)
                .post(teacher_profiles::create_certification),
        )
        .route(
            "/{user_id}/certifications/{id}",
            put(teacher_profiles::update_certification)
                .delete(teacher_profiles::delete_certification),
        );

    let setting_routes = Router::new()
        .route(
            "/",
            get(config_settings::list_settings).post(config_settings::create_setting),
        )
        .route("/bulk", post(config_settings::create_settings_bulk))
        .route("/public", get(config_settings::list_public_settings))
        .route("/category/{category}", get(config_settings::list_settings_by_category))
        .route(
            "/key/{key}",
            get(config_settings::get_setting_by_key)
                .put(config_settings::update_setting_by_key)
                .delete(config_settings::delete_setting_by_key),
        )
        .route(
            "/{id}",
            get(config_settings::get_setting)
                .put(config_settings::update_setting)
                .delete(config_settings::delete_setting),
        );

    let page_config_routes = Router::new()
        .route(
            "/",
            get(page_config::get_page_config).post(page_config::create_page_config),
        )
        .route("/public", get(page_config::get_public_page_config))
        .route("/{id}", put(page_config::update_page_config))
        .route("/{id}/reset", post(page_config::reset_page_config));

    let difficulty_box_routes = Router::new()
        .route(
            "/",
            get(difficulty_boxes::list_boxes).post(difficulty_boxes::create_box),
        )
        .route("/bulk", post(difficulty_boxes::create_boxes_bulk))
        .route(
            "/package/{package_id}",
            get(difficulty_boxes::list_boxes_for_package),
        )
        .route(
            "/package/{package_id}/difficulty/{difficulty}",
            get(difficulty_boxes::get_box_for_level),
        )
        .route(
            "/{id}",
            get(difficulty_boxes::get_box)
                .put(difficulty_boxes::update_box)
                .delete(difficulty_boxes::delete_box),
        );

    let image_routes = Router::new()
        .route("/", get(images::list_images).post(images::upload_image))
        .route("/{*public_id}", delete(images::delete_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/posts", post_routes)
        .nest("/testimonies", testimony_routes)
        .nest("/dynamics", dynamic_routes)
        .nest("/exercises", exercise_routes)
        .nest("/exercise-packages", package_routes)
        .nest("/teacher-profiles", profile_routes)
        .nest("/config-settings", setting_routes)
        .nest("/page-config", page_config_routes)
        .nest("/package-difficulty-boxes", difficulty_box_routes)
        .nest("/images", image_routes)
        .fallback(|| async { AppError::NotFound("Route not found".to_string()) });

    // Static SPA; unknown paths get index.html so client-side routing works.
    let index = config.static_dir.join("index.html");
    let site: Router = Router::new()
        .fallback_service(ServeDir::new(&config.static_dir).fallback(ServeFile::new(index)))
        .layer(middleware::from_fn_with_state(state.clone(), ssr::crawler_gate));

    let router = Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .fallback_service(site);

    // Global Middleware (innermost first)
    security_headers(router)
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(config.clone(), expose_error_detail))
        .with_state(state)
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn security_headers(router: Router<AppState>) -> Router<AppState> {
    let headers = [
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            "same-origin",
        ),
    ];

    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    })
}
