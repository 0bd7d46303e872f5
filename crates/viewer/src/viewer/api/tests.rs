use super::*;
use cc_storage::{DocumentKind, LensPreferences, MemorySource, SqliteStore};

const FRAMEWORK: &str = r#"{
  "meta": {"name": "Curriculum City", "version": "2.0"},
  "entities": {
    "educational_philosophies": [{
      "id": "P1", "label": "Perennialism", "definition": "The teacher transmits great books",
      "compatibilities": {
        "curriculum_conceptions_preferred": ["C1 (moderate)"],
        "design_types_often": ["D1>sub1"]
      }
    }],
    "curriculum_conceptions": [{
      "id": "C1", "label": "Academic Rationalism", "primary_function": "Cultivate intellect",
      "compatibilities": {"design_types": ["D1>sub1"]}
    }, {
      "id": "C2", "label": "Social Reconstruction"
    }],
    "curriculum_design_types": []
  },
  "axis_B_curriculum_making": {
    "actor_types": [{"actor": "policy_makers"}, {"actor": "teachers"}, {"actor": "students"}]
  }
}"#;

const LENS: &str = r#"{
  "posthuman_actors": [{"id": "bells", "category": "temporal", "label": "School bells"}],
  "language_transforms": {"transforms": [{"from": "the teacher", "to": "the classroom assemblage"}]},
  "entity_annotations": {
    "philosophies": {"P1": {"posthuman_reading": "Books act too", "hidden_actors": ["libraries"]}}
  }
}"#;

fn state_with(source: MemorySource) -> ViewerState<MemorySource> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    ViewerState::new(FrameworkRepository::new(source), LensPreferences::load(store))
}

fn full_state() -> ViewerState<MemorySource> {
    state_with(
        MemorySource::new()
            .with_document(DocumentKind::Framework, FRAMEWORK)
            .with_document(DocumentKind::Lens, LENS),
    )
}

fn get(state: &mut ViewerState<MemorySource>, target: &str) -> Result<Value, ApiError> {
    match route(state, "GET", target, b"")? {
        ApiResponse::Json(value) => Ok(value),
        ApiResponse::Markdown(text) => Ok(Value::String(text)),
    }
}

fn post(state: &mut ViewerState<MemorySource>, target: &str, body: &str) -> Result<Value, ApiError> {
    match route(state, "POST", target, body.as_bytes())? {
        ApiResponse::Json(value) => Ok(value),
        ApiResponse::Markdown(text) => Ok(Value::String(text)),
    }
}

#[test]
fn entity_search_filters_by_kind() {
    let mut state = full_state();
    let body = get(&mut state, "/api/entities?q=academic").unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["entities"][0]["id"], "C1");

    let body = get(&mut state, "/api/entities?kind=conception").unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["kind"], "conception");

    let err = get(&mut state, "/api/entities?kind=bogus").unwrap_err();
    assert_eq!((err.status, err.code), (400, "INVALID_KIND"));
}

#[test]
fn actor_listing_validates_level() {
    let mut state = full_state();
    let body = get(&mut state, "/api/actors?level=nano").unwrap();
    assert_eq!(body["actors"][0]["id"], "students");

    let err = get(&mut state, "/api/actors?level=cosmic").unwrap_err();
    assert_eq!(err.code, "INVALID_LEVEL");

    let body = get(&mut state, "/api/actors/levels").unwrap();
    assert_eq!(body["levels"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["posthuman_actors"], Value::Null);
}

#[test]
fn entity_lookup_misses_are_not_found() {
    let mut state = full_state();
    let err = get(&mut state, "/api/entity?kind=philosophy&id=nope").unwrap_err();
    assert_eq!((err.status, err.code), (404, "NOT_FOUND"));

    let body = get(&mut state, "/api/entity?kind=philosophy&id=P1").unwrap();
    assert_eq!(body["entity"]["label"], "Perennialism");
    assert_eq!(body["lens"], Value::Null);
}

#[test]
fn posthuman_mode_adds_annotation_and_transformed_definition() {
    let mut state = full_state();
    let pref = post(&mut state, "/api/lens/toggle", "").unwrap();
    assert_eq!(pref, json!({"mode": "posthuman", "actors_visible": true}));

    let body = get(&mut state, "/api/entity?kind=philosophy&id=P1").unwrap();
    assert_eq!(body["lens"]["annotation"]["hidden_actors"][0], "libraries");
    assert_eq!(
        body["lens"]["annotation"]["prefix"],
        DEFAULT_ANNOTATION_PREFIX
    );
    assert_eq!(
        body["lens"]["definition"],
        "the classroom assemblage transmits great books"
    );

    let body = get(&mut state, "/api/actors/levels").unwrap();
    assert_eq!(body["posthuman_actors"][0]["category"], "temporal");

    let body = post(&mut state, "/api/transform", r#"{"text": "THE TEACHER decides"}"#).unwrap();
    assert_eq!(body["text"], "the classroom assemblage decides");
}

#[test]
fn lens_failure_yields_error_payload_only() {
    let mut state = state_with(
        MemorySource::new()
            .with_document(DocumentKind::Framework, FRAMEWORK)
            .with_status(DocumentKind::Lens, 404),
    );
    let err = get(&mut state, "/api/lens").unwrap_err();
    assert_eq!((err.status, err.code), (503, "DATA_UNAVAILABLE"));
    let payload = err.to_json();
    let keys = payload
        .as_object()
        .map(|obj| obj.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    assert_eq!(keys, vec!["error".to_string()]);
    assert!(err.recovery.as_deref().unwrap_or("").contains("/api/reload"));

    // The canonical views keep working, even under the posthuman lens.
    post(&mut state, "/api/lens/mode", r#"{"mode": "posthuman"}"#).unwrap();
    let body = get(&mut state, "/api/entity?kind=philosophy&id=P1").unwrap();
    assert_eq!(body["lens"], Value::Null);
    let err = post(&mut state, "/api/transform", r#"{"text": "x"}"#).unwrap_err();
    assert_eq!(err.code, "DATA_UNAVAILABLE");
}

#[test]
fn framework_failure_is_data_unavailable_everywhere() {
    let mut state = state_with(MemorySource::new().with_status(DocumentKind::Framework, 500));
    for target in ["/api/framework", "/api/entities", "/api/graph", "/api/actors/levels"] {
        let err = get(&mut state, target).unwrap_err();
        assert_eq!(err.code, "DATA_UNAVAILABLE", "{target}");
    }
    let about = get(&mut state, "/api/about").unwrap();
    assert_eq!(about["documents"]["framework"]["state"], "failed");
    assert_eq!(about["documents"]["lens"]["state"], "pending");
}

#[test]
fn graph_matches_derived_edges_and_reports_dangling_targets() {
    let mut state = full_state();
    let body = get(&mut state, "/api/graph").unwrap();
    let edges = body["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["from"].as_str().unwrap().to_string(),
                e["to"].as_str().unwrap().to_string(),
                e["weight"].as_u64().unwrap(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        edges,
        vec![
            ("P1".to_string(), "C1".to_string(), 2),
            ("C1".to_string(), "D1".to_string(), 2),
            ("P1".to_string(), "D1".to_string(), 1),
        ]
    );
    assert_eq!(body["warnings"].as_array().map(Vec::len), Some(2));
    assert_eq!(get(&mut state, "/api/graph").unwrap(), body);
}

#[test]
fn compare_renders_json_and_markdown() {
    let mut state = full_state();
    let body = get(&mut state, "/api/compare?ids=C1,C2").unwrap();
    assert_eq!(body["kind"], "conception");
    assert_eq!(body["entities"].as_array().map(Vec::len), Some(2));

    let md = get(&mut state, "/api/compare?ids=C1,C2&format=markdown").unwrap();
    let md = md.as_str().unwrap();
    assert!(md.contains("### Academic Rationalism"));
    assert!(md.contains("### Social Reconstruction"));

    let err = get(&mut state, "/api/compare?ids=C1,P1").unwrap_err();
    assert_eq!(err.code, "INVALID_COMPARISON");
    let err = get(&mut state, "/api/compare?ids=C1").unwrap_err();
    assert_eq!(err.code, "INVALID_COMPARISON");
    let err = get(&mut state, "/api/compare?ids=C1,ghost").unwrap_err();
    assert_eq!(err.code, "NOT_FOUND");
}

#[test]
fn lens_preference_endpoints_validate_bodies() {
    let mut state = full_state();
    let err = post(&mut state, "/api/lens/mode", r#"{"mode": "cyborg"}"#).unwrap_err();
    assert_eq!(err.code, "INVALID_MODE");
    let err = post(&mut state, "/api/lens/actors", "not json").unwrap_err();
    assert_eq!(err.code, "INVALID_REQUEST");

    let pref = post(&mut state, "/api/lens/actors", r#"{"visible": true}"#).unwrap();
    assert_eq!(pref, json!({"mode": "human-centered", "actors_visible": true}));

    let body = get(&mut state, "/api/lens").unwrap();
    assert_eq!(body["preference"]["actors_visible"], true);
    assert_eq!(body["document"]["posthuman_actors"][0]["id"], "bells");
}

#[test]
fn wrong_methods_and_unknown_paths() {
    let mut state = full_state();
    let err = route(&mut state, "POST", "/api/graph", b"").unwrap_err();
    assert_eq!(err.status, 405);
    let err = route(&mut state, "GET", "/api/reload", b"").unwrap_err();
    assert_eq!(err.status, 405);
    let err = route(&mut state, "GET", "/api/nothing", b"").unwrap_err();
    assert_eq!(err.status, 404);
}

#[test]
fn reload_reports_document_states() {
    let mut state = full_state();
    let body = post(&mut state, "/api/reload", "").unwrap();
    assert_eq!(body["reloaded"], true);
    assert_eq!(body["documents"]["framework"]["state"], "ready");
    assert_eq!(
        body["documents"]["lens"]["fingerprint"].as_str().map(str::len),
        Some(64)
    );
}
