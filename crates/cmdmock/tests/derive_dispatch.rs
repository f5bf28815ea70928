//! End-to-end dispatch through derived client and command types

use cmdmock::prelude::*;
use cmdmock::{AnyCommand, EntryPoint, MockConfig};
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Client)]
#[client(name = "DynamoDB")]
struct Dynamo;

#[derive(Client)]
struct DocumentClient;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemInput {
    table_name: String,
    key: Value,
}

#[derive(Command)]
#[command(client = Dynamo)]
struct GetItem {
    #[command(input)]
    input: GetItemInput,
}

#[derive(Command)]
#[command(client = DocumentClient, name = "GetItem")]
struct DocumentGetItem(#[command(input)] GetItemInput);

#[derive(Command, Serialize)]
#[command(client = Dynamo)]
struct ListTables {
    #[serde(rename = "Limit")]
    limit: u32,
}

fn users(id: &str) -> GetItemInput {
    GetItemInput {
        table_name: "users".to_string(),
        key: json!({"id": id}),
    }
}

/// Native entry points that echo where the command ended up
fn table() -> Arc<DispatchTable> {
    let table = Arc::new(DispatchTable::new());
    table.register::<Dynamo>(EntryPoint::from_fn(|command: Box<dyn AnyCommand>| async move {
        Ok(json!({"native": command.client_name()}))
    }));
    table.register::<DocumentClient>(EntryPoint::from_fn(
        |command: Box<dyn AnyCommand>| async move { Ok(json!({"native": command.client_name()})) },
    ));
    table
}

#[test]
fn test_derived_names() {
    assert_eq!(<Dynamo as cmdmock::Client>::NAME, "DynamoDB");
    assert_eq!(<DocumentClient as cmdmock::Client>::NAME, "DocumentClient");
    assert_eq!(<GetItem as cmdmock::Command>::NAME, "GetItem");
    assert_eq!(<DocumentGetItem as cmdmock::Command>::NAME, "GetItem");
    assert_eq!(<ListTables as cmdmock::Command>::NAME, "ListTables");
}

#[tokio::test]
async fn test_mocked_get_item_roundtrip() {
    cmdmock::init_test_tracing();
    let table = table();
    let mock = ClientMock::<Dynamo>::new(&table).unwrap();
    mock.on::<GetItem, _>(|input, _| async move {
        Ok::<_, Infallible>(json!({"Item": {"id": input["Key"]["id"], "name": "Ada"}}))
    });

    let out = table
        .client::<Dynamo>()
        .send(GetItem { input: users("u1") })
        .await
        .unwrap();

    assert_eq!(out["Item"], json!({"id": "u1", "name": "Ada"}));
    assert_eq!(out["$metadata"]["httpStatusCode"], 200);
    assert_eq!(
        mock.calls(),
        vec![CallRecord::new(
            "GetItem",
            json!({"TableName": "users", "Key": {"id": "u1"}}),
            true
        )]
    );
}

#[tokio::test]
async fn test_whole_command_as_input() {
    let table = table();
    let mock = ClientMock::<Dynamo>::new(&table).unwrap();
    mock.on_sync::<ListTables, _>(|input, _| Ok::<_, Infallible>(json!({"Requested": input["Limit"]})));

    let out = table
        .client::<Dynamo>()
        .send(ListTables { limit: 3 })
        .await
        .unwrap();

    assert_eq!(out["Requested"], 3);
    assert_eq!(mock.calls_of::<ListTables>()[0].input, json!({"Limit": 3}));
}

#[tokio::test]
async fn test_document_client_isolated_from_low_level_client() {
    let table = table();
    let low = ClientMock::<Dynamo>::new(&table).unwrap();
    low.resolves::<GetItem>(json!({"Item": "low"}));
    let doc = ClientMock::<DocumentClient>::new(&table).unwrap();

    let err = table
        .client::<DocumentClient>()
        .send(DocumentGetItem(users("u2")))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No mock for \"DocumentClient.GetItem\"");
    assert!(err.is_unmapped());
    assert!(doc.assert_called_times::<DocumentGetItem>(1).is_ok());
    assert!(low.assert_not_called::<GetItem>().is_ok());
}

#[tokio::test]
async fn test_destroy_returns_to_native() {
    let table = table();
    let mock = ClientMock::<Dynamo>::with_config(&table, MockConfig::new().with_status_code(202))
        .unwrap();
    mock.resolves::<GetItem>(json!({"Item": null, "Count": 0}));

    let mocked = table
        .client::<Dynamo>()
        .send(GetItem { input: users("u3") })
        .await
        .unwrap();
    assert_eq!(mocked["$metadata"]["httpStatusCode"], 202);

    mock.destroy();
    let native = table
        .client::<Dynamo>()
        .send(GetItem { input: users("u3") })
        .await
        .unwrap();
    assert_eq!(native, json!({"native": "DynamoDB"}));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_existing_metadata_gets_request_id() {
    let table = table();
    let mock = ClientMock::<Dynamo>::new(&table).unwrap();
    mock.resolves::<ListTables>(json!({"TableNames": [], "$metadata": {"attempts": 2}}));

    let out = table
        .client::<Dynamo>()
        .send(ListTables { limit: 1 })
        .await
        .unwrap();

    assert_eq!(out["$metadata"]["attempts"], 2);
    assert!(out["$metadata"]["requestId"].is_string());
    assert!(out["$metadata"].get("httpStatusCode").is_none());
}
