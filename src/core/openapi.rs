use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::balances::{dtos as balances_dtos, handlers as balances_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::features::tokens::{dtos as tokens_dtos, handlers as tokens_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Users
        users_handlers::list_users,
        users_handlers::update_role,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::move_category,
        categories_handlers::delete_category,
        // Files
        files_handlers::list_files,
        files_handlers::list_uploaders,
        files_handlers::export_files,
        // Token usage
        tokens_handlers::list_usage,
        tokens_handlers::list_agents,
        tokens_handlers::export_usage,
        // Balances
        balances_handlers::list_balances,
        balances_handlers::list_refill_units,
        balances_handlers::update_balance,
        // Settings
        settings_handlers::get_settings,
        settings_handlers::test_settings,
        settings_handlers::save_settings,
        settings_handlers::apply_settings,
    ),
    components(
        schemas(
            // Shared
            Meta,
            SortDirection,
            // Auth
            auth::model::AdminSession,
            auth::dtos::LoginRequestDto,
            auth::dtos::LoginResponseDto,
            auth::dtos::SessionResponseDto,
            ApiResponse<auth::dtos::LoginResponseDto>,
            ApiResponse<auth::dtos::SessionResponseDto>,
            // Users
            users_dtos::UpdateRoleDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Files
            files_dtos::FileRowDto,
            files_dtos::FileUserOptionDto,
            // Token usage
            tokens_dtos::TokenUsageRowDto,
            tokens_dtos::AgentOptionDto,
            // Balances
            balances_dtos::UpdateBalanceDto,
            balances_dtos::BalanceRowDto,
            ApiResponse<balances_dtos::BalanceRowDto>,
            // Settings
            settings_dtos::DbSettingsDto,
            settings_dtos::DbSettingsResponseDto,
            settings_dtos::ConnectionTestDto,
        )
    ),
    tags(
        (name = "auth", description = "Admin login and session"),
        (name = "users", description = "LibreChat user accounts"),
        (name = "categories", description = "Ordered agent categories"),
        (name = "files", description = "Uploaded file monitoring"),
        (name = "tokens", description = "Token usage report"),
        (name = "balances", description = "Token balances and auto-refill"),
        (name = "settings", description = "MongoDB connection settings"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "LibreChat Admin API",
        version = "0.1.0",
        description = "Administration API for a LibreChat MongoDB database",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
