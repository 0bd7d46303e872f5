#![forbid(unsafe_code)]

use super::{normalize_path, query_param, render};
use cc_core::compare::Comparison;
use cc_core::graph::build_relation_graph;
use cc_core::lens::LensMode;
use cc_core::query::{
    KindFilter, LevelFilter, filter_actors_by_level, filter_entities_by_kind, find_by_id,
    group_actors_by_level, group_entities_by_kind, search_actors, search_entities,
};
use cc_core::{Entity, EntityKind, Framework, Level};
use cc_storage::{
    DocumentSource, FrameworkRepository, LensDocument, LensPreferences, LoadError, TextTransform,
};
use serde_json::{Value, json};
use std::sync::Arc;

const DEFAULT_ANNOTATION_PREFIX: &str = "From a posthuman reading: ";

const READ_ROUTES: &[&str] = &[
    "/api/about",
    "/api/framework",
    "/api/entities",
    "/api/entities/groups",
    "/api/entity",
    "/api/actors",
    "/api/actors/levels",
    "/api/graph",
    "/api/compare",
    "/api/lens",
];

const WRITE_ROUTES: &[&str] = &[
    "/api/lens/toggle",
    "/api/lens/mode",
    "/api/lens/actors",
    "/api/transform",
    "/api/reload",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiError {
    pub(crate) code: &'static str,
    pub(crate) message: String,
    pub(crate) recovery: Option<String>,
    pub(crate) status: u16,
}

impl ApiError {
    fn new(status: u16, code: &'static str, message: impl Into<String>, recovery: &str) -> Self {
        Self {
            code,
            message: message.into(),
            recovery: Some(recovery.to_string()),
            status,
        }
    }

    /// Every load failure looks the same to the client; the cause is in the log.
    pub(crate) fn data_unavailable(err: &LoadError) -> Self {
        Self::new(
            503,
            "DATA_UNAVAILABLE",
            format!("Unable to load {}.", err.document()),
            "Retry with POST /api/reload.",
        )
    }

    pub(crate) fn method_not_allowed() -> Self {
        Self::new(
            405,
            "METHOD_NOT_ALLOWED",
            "Method not allowed.",
            "Use GET for /api/* reads and POST for lens changes, transforms and reload.",
        )
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "NOT_FOUND", message, "Check the id against /api/entities.")
    }

    fn invalid_request(message: impl Into<String>, recovery: &str) -> Self {
        Self::new(400, "INVALID_REQUEST", message, recovery)
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "recovery": self.recovery
            }
        })
    }

    pub(crate) fn status_line(&self) -> &'static str {
        match self.status {
            400 => "400 Bad Request",
            404 => "404 Not Found",
            405 => "405 Method Not Allowed",
            503 => "503 Service Unavailable",
            _ => "500 Internal Server Error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ApiResponse {
    Json(Value),
    Markdown(String),
}

/// Everything the viewer loop owns between requests.
pub(crate) struct ViewerState<S> {
    repo: FrameworkRepository<S>,
    prefs: LensPreferences,
    transform: Option<(Arc<LensDocument>, TextTransform)>,
    graph: Option<(Arc<Framework>, Value)>,
}

impl<S: DocumentSource> ViewerState<S> {
    pub(crate) fn new(repo: FrameworkRepository<S>, prefs: LensPreferences) -> Self {
        Self {
            repo,
            prefs,
            transform: None,
            graph: None,
        }
    }

    fn framework(&mut self) -> Result<Arc<Framework>, ApiError> {
        self.repo
            .framework()
            .map_err(|err| ApiError::data_unavailable(&err))
    }

    fn lens_document(&mut self) -> Result<Arc<LensDocument>, ApiError> {
        self.repo
            .lens()
            .map_err(|err| ApiError::data_unavailable(&err))
    }

    fn text_transform(&mut self, doc: &Arc<LensDocument>) -> &TextTransform {
        let fresh = matches!(&self.transform, Some((cached, _)) if Arc::ptr_eq(cached, doc));
        if !fresh {
            self.transform = None;
        }
        &self
            .transform
            .get_or_insert_with(|| (Arc::clone(doc), doc.text_transform()))
            .1
    }

    fn about(&self) -> ApiResponse {
        let stamp = crate::Stamp::now();
        ApiResponse::Json(json!({
            "name": "cc_viewer",
            "version": crate::VIEWER_VERSION,
            "fingerprint": crate::build_fingerprint(),
            "generated_at": stamp.rfc3339(),
            "generated_at_ms": stamp.unix_ms(),
            "source": self.repo.source().describe(),
            "documents": render::documents(&self.repo),
            "preference": render::preference(self.prefs.current()),
        }))
    }

    fn framework_overview(&mut self) -> Result<ApiResponse, ApiError> {
        let framework = self.framework()?;
        Ok(ApiResponse::Json(render::framework_overview(&framework)))
    }

    fn entities(&mut self, target: &str) -> Result<ApiResponse, ApiError> {
        let query = query_param(target, "q").unwrap_or_default();
        let filter = parse_kind_filter(query_param(target, "kind").as_deref())?;
        let framework = self.framework()?;
        let found = filter_entities_by_kind(search_entities(&framework, &query), filter);
        Ok(ApiResponse::Json(json!({
            "query": query,
            "kind": match filter {
                KindFilter::All => "all",
                KindFilter::Only(kind) => kind.as_str(),
            },
            "count": found.len(),
            "entities": found.into_iter().map(render::entity_summary).collect::<Vec<_>>(),
        })))
    }

    fn entity_groups(&mut self) -> Result<ApiResponse, ApiError> {
        let framework = self.framework()?;
        let groups = group_entities_by_kind(framework.all_entities())
            .into_iter()
            .map(|(kind, entities)| {
                json!({
                    "kind": kind.as_str(),
                    "title": kind.title(),
                    "entities": entities.into_iter().map(render::entity_summary).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();
        Ok(ApiResponse::Json(json!({ "groups": groups })))
    }

    fn entity(&mut self, target: &str) -> Result<ApiResponse, ApiError> {
        let kind = match parse_kind_filter(query_param(target, "kind").as_deref())? {
            KindFilter::Only(kind) => kind,
            KindFilter::All => return Err(invalid_kind()),
        };
        let id = query_param(target, "id").ok_or_else(|| {
            ApiError::invalid_request("id is required.", "Pass ?kind=<kind>&id=<entity id>.")
        })?;
        let framework = self.framework()?;
        let entity = find_by_id(&framework, kind, &id)
            .ok_or_else(|| ApiError::not_found(format!("No {} with id {id}.", kind.as_str())))?;

        let pref = self.prefs.current();
        let lens = if pref.is_posthuman() {
            self.lens_view(entity, pref.mode())
        } else {
            Value::Null
        };
        Ok(ApiResponse::Json(json!({
            "entity": render::entity_detail(entity),
            "lens": lens,
        })))
    }

    /// Posthuman extras for one entity; a missing lens document leaves the canonical view intact.
    fn lens_view(&mut self, entity: &Entity, mode: LensMode) -> Value {
        let Ok(doc) = self.repo.lens() else {
            return Value::Null;
        };
        let prefix = if doc.ui_guidance.annotation_prefix.is_empty() {
            DEFAULT_ANNOTATION_PREFIX
        } else {
            doc.ui_guidance.annotation_prefix.as_str()
        };
        let annotation = doc
            .annotation(entity.kind, &entity.id)
            .map(|found| render::annotation(prefix, found));
        let definition = entity.definition.clone();
        let transform = self.text_transform(&doc);
        json!({
            "annotation": annotation,
            "definition": definition.map(|text| transform.apply(&text, mode)),
        })
    }

    fn actors(&mut self, target: &str) -> Result<ApiResponse, ApiError> {
        let query = query_param(target, "q").unwrap_or_default();
        let filter = match query_param(target, "level").as_deref() {
            None | Some("all") => LevelFilter::All,
            Some(raw) => LevelFilter::Only(Level::parse(raw).map_err(|err| {
                ApiError::new(
                    400,
                    "INVALID_LEVEL",
                    err.message(),
                    "Use supra|macro|meso|micro|nano|all.",
                )
            })?),
        };
        let framework = self.framework()?;
        let found = filter_actors_by_level(search_actors(&framework, &query), filter);
        Ok(ApiResponse::Json(json!({
            "query": query,
            "level": match filter {
                LevelFilter::All => "all",
                LevelFilter::Only(level) => level.as_str(),
            },
            "count": found.len(),
            "actors": found.into_iter().map(render::actor).collect::<Vec<_>>(),
        })))
    }

    fn actor_levels(&mut self) -> Result<ApiResponse, ApiError> {
        let framework = self.framework()?;
        let levels = group_actors_by_level(&framework.actors)
            .into_iter()
            .map(|(level, actors)| {
                json!({
                    "level": level.as_str(),
                    "actors": actors.into_iter().map(render::actor).collect::<Vec<_>>(),
                })
            })
            .collect::<Vec<_>>();

        let pref = self.prefs.current();
        let posthuman_actors = if pref.actors_visible() {
            self.repo
                .lens()
                .ok()
                .and_then(|doc| serde_json::to_value(&doc.posthuman_actors).ok())
                .unwrap_or_default()
        } else {
            Value::Null
        };
        Ok(ApiResponse::Json(json!({
            "levels": levels,
            "actors_visible": pref.actors_visible(),
            "posthuman_actors": posthuman_actors,
        })))
    }

    fn graph(&mut self) -> Result<ApiResponse, ApiError> {
        let framework = self.framework()?;
        if let Some((cached, body)) = &self.graph
            && Arc::ptr_eq(cached, &framework)
        {
            return Ok(ApiResponse::Json(body.clone()));
        }

        let graph = build_relation_graph(&framework);
        for warning in &graph.warnings {
            tracing::warn!(warning = %warning.message(), "relationship integrity");
        }
        let body = render::graph(&graph);
        self.graph = Some((framework, body.clone()));
        Ok(ApiResponse::Json(body))
    }

    fn compare(&mut self, target: &str) -> Result<ApiResponse, ApiError> {
        let ids = query_param(target, "ids")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let kind = match parse_kind_filter(query_param(target, "kind").as_deref())? {
            KindFilter::All => None,
            KindFilter::Only(kind) => Some(kind),
        };
        let format = query_param(target, "format");

        let framework = self.framework()?;
        let entities = ids
            .iter()
            .map(|id| {
                let found = match kind {
                    Some(kind) => find_by_id(&framework, kind, id),
                    None => framework.all_entities().find(|e| &e.id == id),
                };
                found.ok_or_else(|| ApiError::not_found(format!("No entity with id {id}.")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let comparison = Comparison::new(entities).map_err(|err| {
            ApiError::new(
                400,
                "INVALID_COMPARISON",
                err.message(),
                "Pass 2 to 4 ids of one kind, e.g. ?ids=a,b.",
            )
        })?;

        match format.as_deref() {
            None | Some("json") => Ok(ApiResponse::Json(json!({
                "kind": comparison.kind().as_str(),
                "entities": comparison
                    .entities()
                    .iter()
                    .map(|entity| render::entity_detail(entity))
                    .collect::<Vec<_>>(),
            }))),
            Some("markdown") | Some("md") => Ok(ApiResponse::Markdown(
                comparison.to_markdown(&crate::Stamp::now().ymd()),
            )),
            Some(_) => Err(ApiError::invalid_request(
                "format must be json|markdown.",
                "Drop format or pass format=markdown.",
            )),
        }
    }

    /// The posthuman view renders nothing canonical when its document failed.
    fn lens(&mut self) -> Result<ApiResponse, ApiError> {
        let doc = self.lens_document()?;
        Ok(ApiResponse::Json(json!({
            "preference": render::preference(self.prefs.current()),
            "document": serde_json::to_value(&*doc).unwrap_or_default(),
        })))
    }

    fn toggle_lens(&mut self) -> ApiResponse {
        self.prefs.toggle();
        ApiResponse::Json(render::preference(self.prefs.current()))
    }

    fn set_lens_mode(&mut self, body: &[u8]) -> Result<ApiResponse, ApiError> {
        let payload = json_body(body, "Send {\"mode\": \"human-centered\"|\"posthuman\"}.")?;
        let raw = payload.get("mode").and_then(Value::as_str).unwrap_or("");
        let mode = LensMode::parse(raw).map_err(|err| {
            ApiError::new(
                400,
                "INVALID_MODE",
                err.message(),
                "Send {\"mode\": \"human-centered\"|\"posthuman\"}.",
            )
        })?;
        self.prefs.set_mode(mode);
        Ok(ApiResponse::Json(render::preference(self.prefs.current())))
    }

    fn set_actors_visible(&mut self, body: &[u8]) -> Result<ApiResponse, ApiError> {
        const RECOVERY: &str = "Send {\"visible\": true|false}.";
        let payload = json_body(body, RECOVERY)?;
        let visible = payload
            .get("visible")
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                ApiError::invalid_request("Missing or invalid boolean field: visible.", RECOVERY)
            })?;
        self.prefs.set_actors_visible(visible);
        Ok(ApiResponse::Json(render::preference(self.prefs.current())))
    }

    fn transform(&mut self, body: &[u8]) -> Result<ApiResponse, ApiError> {
        const RECOVERY: &str = "Send {\"text\": \"...\"}.";
        let payload = json_body(body, RECOVERY)?;
        let text = payload
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::invalid_request("Missing string field: text.", RECOVERY))?
            .to_string();

        let mode = self.prefs.current().mode();
        let text = if mode.is_posthuman() {
            let doc = self.lens_document()?;
            self.text_transform(&doc).apply(&text, mode)
        } else {
            text
        };
        Ok(ApiResponse::Json(json!({ "mode": mode.as_str(), "text": text })))
    }

    fn reload(&mut self) -> ApiResponse {
        self.repo.invalidate();
        self.transform = None;
        self.graph = None;
        let framework_ok = self.repo.framework().is_ok();
        let lens_ok = self.repo.lens().is_ok();
        ApiResponse::Json(json!({
            "reloaded": framework_ok && lens_ok,
            "documents": render::documents(&self.repo),
        }))
    }
}

pub(crate) fn route<S: DocumentSource>(
    state: &mut ViewerState<S>,
    method: &str,
    target: &str,
    body: &[u8],
) -> Result<ApiResponse, ApiError> {
    let path = normalize_path(target);
    let read = matches!(method, "GET" | "HEAD");
    let write = method == "POST";

    match path.as_str() {
        "/api/about" if read => Ok(state.about()),
        "/api/framework" if read => state.framework_overview(),
        "/api/entities" if read => state.entities(target),
        "/api/entities/groups" if read => state.entity_groups(),
        "/api/entity" if read => state.entity(target),
        "/api/actors" if read => state.actors(target),
        "/api/actors/levels" if read => state.actor_levels(),
        "/api/graph" if read => state.graph(),
        "/api/compare" if read => state.compare(target),
        "/api/lens" if read => state.lens(),
        "/api/lens/toggle" if write => Ok(state.toggle_lens()),
        "/api/lens/mode" if write => state.set_lens_mode(body),
        "/api/lens/actors" if write => state.set_actors_visible(body),
        "/api/transform" if write => state.transform(body),
        "/api/reload" if write => Ok(state.reload()),
        known if READ_ROUTES.contains(&known) || WRITE_ROUTES.contains(&known) => {
            Err(ApiError::method_not_allowed())
        }
        _ => Err(ApiError::new(
            404,
            "NOT_FOUND",
            "Unknown endpoint.",
            "See / for the viewer and /api/about for status.",
        )),
    }
}

fn invalid_kind() -> ApiError {
    ApiError::new(
        400,
        "INVALID_KIND",
        "kind must be philosophy|conception|design.",
        "Pass kind=philosophy|conception|design (or all where listing).",
    )
}

fn parse_kind_filter(raw: Option<&str>) -> Result<KindFilter, ApiError> {
    match raw {
        None | Some("all") => Ok(KindFilter::All),
        Some(value) => EntityKind::parse(value)
            .map(KindFilter::Only)
            .ok_or_else(invalid_kind),
    }
}

fn json_body(body: &[u8], recovery: &str) -> Result<Value, ApiError> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .filter(Value::is_object)
        .ok_or_else(|| ApiError::invalid_request("Request body must be a JSON object.", recovery))
}

#[cfg(test)]
mod tests;
