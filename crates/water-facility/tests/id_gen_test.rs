use registry_framework::capture::with_entity_data;
use registry_framework::mock::MockSearchService;
use registry_framework::search::{Filter, SearchError};
use registry_framework::{GeneratedIdentifier, GenerationError, IdGenService, UniqueIdentifierField};
use serde_json::{json, Value};
use std::sync::Arc;
use water_facility::id_gen::WaterFacilityIdGenService;

const NIMBA_ID: &str = "WF-NIM-SAN-TWB-DAA7B4";

fn nimba() -> Value {
    json!({
        "geoCode": "xvksf3s",
        "waterPointType": "Tube well or borehole",
        "location": {
            "county": "Nimba",
            "district": "Sanniquellie Mahn",
            "community": "Kpaytuo Town"
        }
    })
}

fn wf_fields() -> Vec<UniqueIdentifierField> {
    vec![UniqueIdentifierField::new("/wfId")]
}

async fn generate_for(
    service: &WaterFacilityIdGenService,
    entity_type: &str,
    document: Value,
    fields: &[UniqueIdentifierField],
) -> Result<GeneratedIdentifier, GenerationError> {
    let mut root = serde_json::Map::new();
    root.insert(entity_type.to_string(), document);
    let root = Value::Object(root);
    with_entity_data(&root, service.generate_id(fields)).await
}

fn service_with(mock: &MockSearchService) -> WaterFacilityIdGenService {
    WaterFacilityIdGenService::new(Arc::new(mock.clone()))
}

#[tokio::test]
async fn test_end_to_end_fixture() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    let result = generate_for(&service, "WaterFacility", nimba(), &wf_fields())
        .await
        .unwrap();
    assert_eq!(result.get("/wfId"), Some(NIMBA_ID));
    assert_eq!(result.len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_duplicate_check_query_shape() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    generate_for(&service, "WaterFacility", nimba(), &wf_fields())
        .await
        .unwrap();

    let queries = mock.queries();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query.entity_type, vec!["WaterFacility".to_string()]);
    assert_eq!(query.filters.get("wfId"), Some(&Filter::Eq(json!(NIMBA_ID))));
    assert_eq!(query.limit, 1);
    assert_eq!(query.offset, 0);
}

#[tokio::test]
async fn test_deterministic_across_calls_and_instances() {
    let mock = MockSearchService::new();
    for _ in 0..3 {
        mock.expect_search().return_count("WaterFacility", 0);
    }

    let first = service_with(&mock);
    let second = service_with(&mock);
    let a = generate_for(&first, "WaterFacility", nimba(), &wf_fields()).await.unwrap();
    let b = generate_for(&first, "WaterFacility", nimba(), &wf_fields()).await.unwrap();
    let c = generate_for(&second, "WaterFacility", nimba(), &wf_fields()).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
    mock.verify();
}

#[tokio::test]
async fn test_case_and_whitespace_do_not_change_the_id() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    let noisy = json!({
        "geoCode": "  XVKSF3S ",
        "waterPointType": "Tube well or borehole",
        "location": {
            "county": "NIMBA",
            "district": "sanniquellie    mahn",
            "community": "\tKpaytuo Town\n"
        }
    });
    let result = generate_for(&service, "WaterFacility", noisy, &wf_fields())
        .await
        .unwrap();
    assert_eq!(result.get("/wfId"), Some(NIMBA_ID));
}

#[tokio::test]
async fn test_missing_fields_fall_back_to_placeholders() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    let empty = generate_for(&service, "WaterFacility", json!({}), &wf_fields())
        .await
        .unwrap();
    assert_eq!(empty.get("/wfId"), Some("WF-UNK-UNK-UNK-45CA31"));

    let sparse = json!({
        "waterPointType": "Hand pump",
        "location": { "county": "---", "district": "Gb" }
    });
    let id = generate_for(&service, "WaterFacility", sparse, &wf_fields())
        .await
        .unwrap();
    let id = id.get("/wfId").unwrap();
    assert!(id.starts_with("WF-UNK-GB-UNK-"), "{id}");
    assert_eq!(id.len(), "WF-UNK-GB-UNK-".len() + 6);
}

#[tokio::test]
async fn test_type_codes_reach_the_id() {
    let cases = [
        ("Protected spring", "PS"),
        ("Public tap/standpipe", "PTS"),
        ("Sand/Sub-surface dam (with well or standpipe)", "SSD"),
        ("Other", "OTH"),
    ];
    let mock = MockSearchService::new();
    for _ in cases {
        mock.expect_search().return_count("WaterFacility", 0);
    }
    let service = service_with(&mock);

    for (water_point_type, code) in cases {
        let mut document = nimba();
        document["waterPointType"] = json!(water_point_type);
        let result = generate_for(&service, "WaterFacility", document, &wf_fields())
            .await
            .unwrap();
        let id = result.get("/wfId").unwrap();
        assert_eq!(id.split('-').nth(3), Some(code), "{id}");
    }
}

#[tokio::test]
async fn test_foreign_entity_type_is_ignored() {
    // No expectations: a search would panic.
    let mock = MockSearchService::new();
    let service = service_with(&mock);

    let result = generate_for(&service, "Organisation", nimba(), &wf_fields())
        .await
        .unwrap();
    assert!(result.is_empty());
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_absent_context_is_a_no_op() {
    let mock = MockSearchService::new();
    let service = service_with(&mock);

    let outside = service.generate_id(&wf_fields()).await.unwrap();
    assert!(outside.is_empty());

    let unbound = registry_framework::relay::scope(service.generate_id(&wf_fields()))
        .await
        .unwrap();
    assert!(unbound.is_empty());
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_only_first_matching_field_is_assigned() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    let fields = vec![
        UniqueIdentifierField::new("/code"),
        UniqueIdentifierField::new("wfId"),
        UniqueIdentifierField::new("/wfId"),
    ];
    let result = generate_for(&service, "WaterFacility", nimba(), &fields)
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("wfId"), Some(NIMBA_ID));
    assert_eq!(result.get("/wfId"), None);
    assert_eq!(result.get("/code"), None);
}

#[tokio::test]
async fn test_unmatched_fields_give_an_empty_result() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 0);
    let service = service_with(&mock);

    let fields = vec![UniqueIdentifierField::new("/facilityId")];
    let result = generate_for(&service, "WaterFacility", nimba(), &fields)
        .await
        .unwrap();
    assert!(result.is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_confirmed_duplicate_is_rejected() {
    let mock = MockSearchService::new();
    mock.expect_search().return_count("WaterFacility", 1);
    let service = service_with(&mock);

    let err = generate_for(&service, "WaterFacility", nimba(), &wf_fields())
        .await
        .unwrap_err();
    match err {
        GenerationError::Duplicate { id, message } => {
            assert_eq!(id, NIMBA_ID);
            assert!(message.contains(NIMBA_ID));
            assert!(message.contains("geoCode, type, and location"));
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_duplicate_check_still_generates() {
    let mock = MockSearchService::new();
    mock.expect_search()
        .return_err(SearchError::Unavailable("connection refused".to_string()));
    mock.expect_search().return_err(SearchError::Timeout);
    mock.expect_search()
        .return_ok(json!({ "WaterFacility": { "totalCount": "many" } }));
    let service = service_with(&mock);

    for _ in 0..3 {
        let result = generate_for(&service, "WaterFacility", nimba(), &wf_fields())
            .await
            .unwrap();
        assert_eq!(result.get("/wfId"), Some(NIMBA_ID));
    }
    mock.verify();
}

#[tokio::test]
async fn test_secondary_operations() {
    let service = service_with(&MockSearchService::new());
    assert!(service.save_id_format(&wf_fields()).await.is_ok());
    assert_eq!(service.service_name(), "WaterFacilityIdGenService");

    let health = service.health_info();
    assert_eq!(health.name, "WaterFacilityIdGenService");
    assert!(health.healthy);
    assert!(service.is_primary());
}
