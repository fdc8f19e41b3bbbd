//! Route tests for the record endpoints against an in-memory workbook.

mod support;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use sheetbook_api::{ApiError, ApiResult};
use sheetbook_core::ColumnMapping;
use sheetbook_test_utils::fixtures::{empty_store, seeded_store};
use sheetbook_test_utils::{FailurePlan, StoreCall};
use support::{call, raw, test_app};

#[tokio::test]
async fn get_all_data_returns_three_tables() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/api/get-all-data",
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registro"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["metas"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["organizadores"].as_array().map(Vec::len), Some(3));

    let first = &body["registro"][0];
    assert_eq!(first["ROW_NUMBER"], json!(2));
    assert_eq!(first["Descricao"], json!("Compras do mês"));
    // Short rows are padded, not truncated.
    assert_eq!(body["registro"][1]["Tipo"], json!(""));
    assert_eq!(body["metas"][0]["Mes"], json!("2024-05"));

    // Organizers without background or text get the default color.
    assert_eq!(body["organizadores"][1]["Cor"], json!("#cccccc"));
    Ok(())
}

#[tokio::test]
async fn get_all_data_remote_failure_is_500() -> ApiResult<()> {
    let store = seeded_store();
    store.fail(FailurePlan {
        reads: true,
        ..Default::default()
    });

    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/api/get-all-data",
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("REMOTE_OPERATION_FAILED"));
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn add_registro_appends_in_header_order() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/add-registro",
        Some(json!({
            "Data": "2024-06-02",
            "Valor": 89.9,
            "Descrição": "Farmácia",
            "Tag 1": "Saúde",
            "Tipo": "Saída"
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["updates"]["updates"]["updatedRange"].is_string());
    assert!(body.get("warnings").is_none());

    assert_eq!(store.cell("Registro", 5, "A").as_deref(), Some("2024-06-02"));
    assert_eq!(store.cell("Registro", 5, "B").as_deref(), Some("89.9"));
    assert_eq!(store.cell("Registro", 5, "C").as_deref(), Some("Saúde"));
    assert_eq!(store.cell("Registro", 5, "G").as_deref(), Some("Farmácia"));
    assert_eq!(store.cell("Registro", 5, "I").as_deref(), Some("Saída"));
    Ok(())
}

#[tokio::test]
async fn add_registro_without_date_is_rejected_before_any_call() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/add-registro",
        Some(json!({"Valor": "10", "Descricao": "Pão"})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("MISSING_FIELD"));
    assert!(body["message"].as_str().is_some_and(|m| m.contains("Data")));
    assert!(store.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn update_registro_writes_one_cell() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/update-registro",
        Some(json!({"ROW_NUMBER": "3", "column": "Descricao", "value": "Salário de maio"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updates"]["updatedRange"], json!("Registro!G3"));
    assert_eq!(store.cell("Registro", 3, "G").as_deref(), Some("Salário de maio"));
    assert_eq!(store.write_count(), 1);
    Ok(())
}

#[tokio::test]
async fn update_header_row_is_rejected() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/update-meta",
        Some(json!({"ROW_NUMBER": 1, "column": "Meta", "value": "0"})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_ROW_NUMBER"));
    assert_eq!(store.write_count(), 0);
    Ok(())
}

#[tokio::test]
async fn update_write_failure_carries_cause() -> ApiResult<()> {
    let store = seeded_store();
    store.fail(FailurePlan {
        writes: true,
        ..Default::default()
    });

    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/update-meta",
        Some(json!({"ROW_NUMBER": 2, "column": "Meta", "value": "900"})),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
    // Writes are sent once, never retried.
    assert_eq!(store.write_count(), 1);
    Ok(())
}

#[tokio::test]
async fn organizer_color_failure_is_a_warning() -> ApiResult<()> {
    let store = seeded_store();
    store.fail(FailurePlan {
        backgrounds: true,
        ..Default::default()
    });

    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/update-organizador",
        Some(json!({"ROW_NUMBER": 2, "column": "Cor", "value": "#ff8800"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["warnings"].as_array().map(Vec::len), Some(1));
    assert_eq!(store.cell("Organizadores", 2, "D").as_deref(), Some("#ff8800"));
    Ok(())
}

#[tokio::test]
async fn background_wins_over_edited_text() -> ApiResult<()> {
    let store = empty_store();
    let (status, _) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/add-organizador",
        Some(json!({"Tag": "Transporte", "Tipo": "Saída", "Cor": "#FF0000"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // Someone retypes the color text directly in the sheet.
    store.put_cell("Organizadores", 2, "D", "blue");

    let (_, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/api/get-all-data",
        None,
    )
    .await?;
    assert_eq!(body["organizadores"][0]["Cor"], json!("#ff0000"));
    Ok(())
}

#[tokio::test]
async fn clearing_color_restores_default() -> ApiResult<()> {
    let store = empty_store();
    call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/add-organizador",
        Some(json!({"Tag": "Lazer", "Cor": "#00aa00"})),
    )
    .await?;

    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/update-organizador",
        Some(json!({"ROW_NUMBER": 2, "column": "Cor", "value": ""})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("warnings").is_none());

    let (_, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/api/get-all-data",
        None,
    )
    .await?;
    assert_eq!(body["organizadores"][0]["Cor"], json!("#cccccc"));
    Ok(())
}

#[tokio::test]
async fn delete_registro_shifts_later_rows() -> ApiResult<()> {
    let store = seeded_store();
    let (status, _) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/delete-registro",
        Some(json!({"ROW_NUMBER": 2})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        store.calls(),
        vec![StoreCall::DeleteRow {
            sheet: "Registro".to_string(),
            row_number: 2,
        }]
    );

    let (_, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/api/get-all-data",
        None,
    )
    .await?;
    assert_eq!(body["registro"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["registro"][0]["Data"], json!("2024-05-03"));
    assert_eq!(body["registro"][0]["ROW_NUMBER"], json!(2));
    Ok(())
}

#[tokio::test]
async fn delete_without_row_number_is_rejected() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::POST,
        "/api/delete-organizador",
        Some(json!({})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("MISSING_FIELD"));
    assert!(store.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_failure_shape() -> ApiResult<()> {
    let store = seeded_store();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/add-meta")
        .header("content-type", "application/json")
        .body(Body::from("{\"Mes\": "))
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let (status, body) = raw(test_app(&store, ColumnMapping::Dynamic)?, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("INVALID_INPUT"));
    assert!(store.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn health_ready_reflects_store_probe() -> ApiResult<()> {
    let store = seeded_store();
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/health/ready",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["spreadsheet"]["title"], json!("In-memory workbook"));

    store.fail(FailurePlan {
        reads: true,
        ..Default::default()
    });
    let (status, body) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/health/ready",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], json!("unhealthy"));

    let (status, _) = call(
        test_app(&store, ColumnMapping::Dynamic)?,
        Method::GET,
        "/health/live",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
