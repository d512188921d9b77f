//! HTML front end for the repository list.
//!
//! Pages are rendered from the controller's current [`ListState`]; form posts
//! are mapped onto controller operations.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::{
    controller::{ListState, RepositoryListController, LOOKUP_FAILED_MESSAGE},
    lookup::RepositoryLookup,
    model::{Issue, Repository, RepositoryDetails},
    storage::{RepositoryStore, StoreError},
};

#[cfg(test)]
#[path = "web_tests.rs"]
mod web_tests;

const DASHBOARD_TEMPLATE: &str = "dashboard";
const REPOSITORY_TEMPLATE: &str = "repository";
const STYLESHEET: &str = include_str!("../templates/style.css");

/// Anchor after the last list entry; a successful add scrolls there.
pub const LIST_END_ANCHOR: &str = "/#repositories-end";

struct AppState<L, S> {
    controller: RepositoryListController<L, S>,
    templates: Handlebars<'static>,
}

#[derive(Deserialize)]
struct AddRepositoryForm {
    #[serde(default)]
    repository: String,
}

#[derive(Deserialize)]
struct DeleteRepositoryForm {
    full_name: String,
}

#[derive(Serialize)]
struct DashboardView<'a> {
    input: &'a str,
    error: Option<&'a str>,
    repositories: &'a [Repository],
}

#[derive(Serialize)]
struct RepositoryView<'a> {
    full_name: &'a str,
    error: Option<&'a str>,
    repository: Option<&'a RepositoryDetails>,
    issues: &'a [Issue],
}

enum WebError {
    Render(RenderError),
    Store(StoreError),
}

impl From<RenderError> for WebError {
    fn from(e: RenderError) -> Self {
        WebError::Render(e)
    }
}

impl From<StoreError> for WebError {
    fn from(e: StoreError) -> Self {
        WebError::Store(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let error_message = match self {
            WebError::Render(e) => e.to_string(),
            WebError::Store(e) => e.to_string(),
        };
        error!(error_message = error_message.as_str(), "Request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
    }
}

fn templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(
        DASHBOARD_TEMPLATE,
        include_str!("../templates/dashboard.hbs"),
    )?;
    handlebars.register_template_string(
        REPOSITORY_TEMPLATE,
        include_str!("../templates/repository.hbs"),
    )?;
    Ok(handlebars)
}

/// Builds the application router around `controller`.
pub fn router<L, S>(controller: RepositoryListController<L, S>) -> Result<Router, TemplateError>
where
    L: RepositoryLookup + 'static,
    S: RepositoryStore + 'static,
{
    let state = Arc::new(AppState {
        controller,
        templates: templates()?,
    });

    Ok(Router::new()
        .route("/", get(dashboard::<L, S>))
        .route("/repositories", post(add_repository::<L, S>))
        .route("/repositories/delete", post(delete_repository::<L, S>))
        .route("/repository/*full_name", get(repository_detail::<L, S>))
        .route("/static/style.css", get(stylesheet))
        .with_state(state))
}

impl<L: RepositoryLookup, S: RepositoryStore> AppState<L, S> {
    /// Error text belongs to the response of the failed submit only; a fresh
    /// page load starts without one.
    fn render_dashboard(&self, input: &str, error: Option<&str>) -> Result<Html<String>, RenderError> {
        let ListState { repositories, .. } = self.controller.snapshot();
        let view = DashboardView {
            input,
            error,
            repositories: &repositories,
        };

        Ok(Html(self.templates.render(DASHBOARD_TEMPLATE, &view)?))
    }
}

async fn dashboard<L, S>(State(app): State<Arc<AppState<L, S>>>) -> Result<Html<String>, WebError>
where
    L: RepositoryLookup,
    S: RepositoryStore,
{
    Ok(app.render_dashboard("", None)?)
}

async fn add_repository<L, S>(
    State(app): State<Arc<AppState<L, S>>>,
    Form(form): Form<AddRepositoryForm>,
) -> Result<Response, WebError>
where
    L: RepositoryLookup,
    S: RepositoryStore,
{
    match app.controller.add_repository(&form.repository).await {
        Ok(_) => Ok(Redirect::to(LIST_END_ANCHOR).into_response()),
        Err(e) => {
            // Keep what was typed so it can be corrected.
            let page = app.render_dashboard(&form.repository, Some(e.user_message()))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

async fn delete_repository<L, S>(
    State(app): State<Arc<AppState<L, S>>>,
    Form(form): Form<DeleteRepositoryForm>,
) -> Result<Redirect, WebError>
where
    L: RepositoryLookup,
    S: RepositoryStore,
{
    app.controller.remove_repository(&form.full_name)?;
    Ok(Redirect::to("/"))
}

#[instrument(skip(app))]
async fn repository_detail<L, S>(
    State(app): State<Arc<AppState<L, S>>>,
    Path(full_name): Path<String>,
) -> Result<Response, WebError>
where
    L: RepositoryLookup,
    S: RepositoryStore,
{
    let full_name = full_name.trim_start_matches('/');
    let lookup = app.controller.lookup();
    let (details, issues) = tokio::join!(
        lookup.fetch_repository_details(full_name),
        lookup.fetch_issues(full_name)
    );

    let (status, view) = match (&details, &issues) {
        (Ok(repository), Ok(issues)) => (
            StatusCode::OK,
            RepositoryView {
                full_name,
                error: None,
                repository: Some(repository),
                issues,
            },
        ),
        _ => (
            StatusCode::BAD_GATEWAY,
            RepositoryView {
                full_name,
                error: Some(LOOKUP_FAILED_MESSAGE),
                repository: details.as_ref().ok(),
                issues: &[],
            },
        ),
    };

    let page = app.templates.render(REPOSITORY_TEMPLATE, &view)?;
    Ok((status, Html(page)).into_response())
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLESHEET)
}
