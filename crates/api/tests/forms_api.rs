//! Integration tests for the `/api/v1/forms` endpoints.

mod common;

use axum::http::StatusCode;
use choicegate_api::store::FormStore;
use common::{body_json, get, post_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Conditional-choice payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conditional_choices_payload_lists_live_targets() {
    let app = common::build_test_app(common::test_forms());
    let response = get(app, "/api/v1/forms/1/conditional-choices").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["formId"], 1);
    assert_eq!(data["mode"], "first_match");

    let targets = data["targets"].as_object().unwrap();
    let ids: Vec<&str> = targets.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["30", "31"]);

    let size = &targets["30"];
    assert_eq!(size["originalChoices"][2], json!({"value": "l", "text": "Large"}));
    assert_eq!(size["groups"][0]["rules"][0]["fieldId"], "10");
    assert_eq!(size["groups"][0]["logicType"], "all");
}

#[tokio::test]
async fn conditional_choices_for_unknown_form_is_404() {
    let app = common::build_test_app(common::test_forms());
    let response = get(app, "/api/v1/forms/99/conditional-choices").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Form with id 99 not found");
}

// ---------------------------------------------------------------------------
// Field choices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn field_choices_are_normalised() {
    let app = common::build_test_app(common::test_forms());
    let response = get(app, "/api/v1/forms/1/fields/31/choices").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"][2], json!({"value": "Gift wrap", "text": "Gift wrap"}));
}

#[tokio::test]
async fn field_without_choices_is_400() {
    let app = common::build_test_app(common::test_forms());
    let response = get(app, "/api/v1/forms/1/fields/12/choices").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_field_is_404() {
    let app = common::build_test_app(common::test_forms());
    let response = get(app, "/api/v1/forms/1/fields/77/choices").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Submission validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn matching_group_narrows_choices_and_rejects_others() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {"10": "slim", "30": "l"}});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["is_valid"], false);
    assert_eq!(data["errors"][0]["field"], "30");
    assert_eq!(data["errors"][0]["rule_type"], "choice_not_allowed");
    assert_eq!(data["errors"][0]["value"], "l");
    assert_eq!(
        data["fields"]["30"],
        json!([{"value": "s", "text": "Small"}, {"value": "m", "text": "Medium"}])
    );
    assert_eq!(data["outcomes"][0]["status"], "restricted");
}

#[tokio::test]
async fn no_match_keeps_original_choices() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {"10": "", "30": "l", "31": ["pocket"]}});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["is_valid"], true);
    assert_eq!(data["fields"]["30"].as_array().unwrap().len(), 3);
    assert_eq!(data["outcomes"][0]["status"], "unrestricted");
}

#[tokio::test]
async fn multi_valued_submissions_report_each_rejected_value() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {
        "10": "wide",
        "31": ["pocket", "Gift wrap", "logo"]
    }});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;

    let data = body_json(response).await["data"].clone();
    let rejected: Vec<&str> = data["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["value"].as_str().unwrap())
        .collect();
    assert_eq!(rejected, vec!["pocket", "logo"]);
}

#[tokio::test]
async fn any_group_matches_on_a_text_source() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {"12": "please gift it", "31": ["Gift wrap"]}});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["is_valid"], true);
    assert_eq!(data["fields"]["31"], json!([{"value": "Gift wrap", "text": "Gift wrap"}]));
}

#[tokio::test]
async fn skipped_targets_are_reported() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {"10": "slim"}});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;

    let data = body_json(response).await["data"].clone();
    let outcomes = data["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[2], json!({"target_field_id": "32", "status": "skipped", "reason": "disabled"}));
    assert_eq!(
        outcomes[3],
        json!({"target_field_id": "40", "status": "skipped", "reason": "missing_field"})
    );
    assert!(data["fields"].get("40").is_none());
}

#[tokio::test]
async fn missing_values_object_is_an_empty_submission() {
    let app = common::build_test_app(common::test_forms());
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_valid"], true);
}

#[tokio::test]
async fn validating_an_unknown_form_is_404() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": {}});
    let response = post_json(app, "/api/v1/forms/5/submissions/validate", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_validation_is_stable() {
    let forms = common::test_forms();
    let app = common::build_test_app(forms);
    let body = json!({"values": {"10": "slim", "30": "m"}});

    let first = body_json(
        post_json(app.clone(), "/api/v1/forms/1/submissions/validate", body.clone()).await,
    )
    .await;
    let second =
        body_json(post_json(app, "/api/v1/forms/1/submissions/validate", body).await).await;
    assert_eq!(first, second);
    assert_eq!(first["data"]["is_valid"], true);
}

#[tokio::test]
async fn non_object_values_are_a_bad_request() {
    let app = common::build_test_app(common::test_forms());
    let body = json!({"values": "10=slim"});
    let response = post_json(app, "/api/v1/forms/1/submissions/validate", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn omitted_checkbox_group_counts_as_nothing_checked() {
    let forms = FormStore::from_json(json!([{
        "id": 2,
        "fields": [
            {"id": 5, "label": "Toppings", "type": "checkbox",
             "choices": [{"value": "ham"}, {"value": "olive"}]},
            {"id": 6, "label": "Size", "type": "radio",
             "choices": [{"value": "s"}, {"value": "l"}]}
        ],
        "conditional_choices": {"targets": {
            "6": {"enabled": true, "groups": [
                {"id": "blank", "enabled": true,
                 "rules": [{"fieldId": 5, "operator": "is", "value": ""}],
                 "choices": ["s"]}
            ]}
        }}
    }]))
    .unwrap();
    let app = common::build_test_app(forms);

    let body = json!({"values": {"6": "l"}});
    let response = post_json(app, "/api/v1/forms/2/submissions/validate", body).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["is_valid"], true);
    assert_eq!(data["outcomes"][0]["status"], "unrestricted");
    assert_eq!(data["fields"]["6"].as_array().unwrap().len(), 2);
}
