// End-to-end usage scenarios: request parsing and user lookups
use fnpipe::pipeline::PipeStep;
use fnpipe::{
    Arg, PLACEHOLDER, PipeError, bind, map_index, order, out, pipe, step_fn, sync_fn, value_fn,
};
use serde_json::{Value, json};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn event() -> Value {
    json!({
        "headers": { "token": "token-1234" },
        "pathParameters": { "userId": "user-1234" },
        "body": "{\"name\": \"Andy\", \"age\": 18}",
    })
}

fn body() -> Arg {
    Arg::Value(event()["body"].clone())
}

fn query_by_name() -> impl PipeStep {
    step_fn(|args: Vec<Value>| async move {
        match args.first().and_then(Value::as_str) {
            Some("Andy") => Ok(json!({
                "name": "Andy",
                "email": "test@gmail.com",
                "joinDate": "2000/01/01",
            })),
            Some("Dana") => Ok(json!({
                "name": "Dana",
                "email": "dana@gmail.com",
                "joinDate": "2001/01/01",
            })),
            _ => Err(json!("user not found")),
        }
    })
}

fn scan_name() -> impl PipeStep {
    step_fn(|_| async {
        Ok::<_, Value>(json!({
            "items": [{ "name": "Andy" }, { "name": "Dana" }],
        }))
    })
}

/// Resolves when `args[0]` has key `args[1]`, rejects with `Null` otherwise
fn check_path() -> impl PipeStep {
    sync_fn(|args| {
        let key = args.get(1).and_then(Value::as_str).unwrap_or_default();
        match args.first().and_then(|obj| obj.get(key)) {
            Some(_) => Ok(Value::Null),
            None => Err(Value::Null),
        }
    })
}

fn parse_json() -> impl PipeStep {
    sync_fn(|args| {
        let text = args.first().and_then(Value::as_str).unwrap_or_default();
        serde_json::from_str(text).map_err(|e| json!(e.to_string()))
    })
}

fn is_equal() -> impl PipeStep {
    value_fn(|args| json!(args.first() == args.get(1)))
}

#[tokio::test]
async fn test_pipe_chains_async_steps() {
    init_tracing();
    let result = pipe(bind(check_path(), vec![Arg::Value(event()), Arg::value("body")]), &[])
        .pipe(bind(parse_json(), vec![body()]), &[])
        .pipe(value_fn(|args| json!([args[0]["name"], args[0]["age"]])), &[])
        .await;

    assert_eq!(result, Ok(json!(["Andy", 18])));
}

#[tokio::test]
async fn test_plain_return_values_are_wrapped() {
    init_tracing();
    let result = pipe(bind(check_path(), vec![Arg::Value(event()), Arg::value("body")]), &[])
        .pipe(bind(parse_json(), vec![body()]), &[])
        .pipe(value_fn(|args| json!(args[0]["age"].as_i64().unwrap_or(0) + 100)), &[])
        .pipe(value_fn(|args| args[0].clone()), &[])
        .await;

    assert_eq!(result, Ok(json!(118)));
}

#[tokio::test]
async fn test_catch_receives_missing_reason() {
    init_tracing();
    let result = pipe(
        bind(check_path(), vec![Arg::Value(event()), Arg::value("not_exist_path")]),
        &[],
    )
    .pipe(bind(parse_json(), vec![body()]), &[])
    .pipe(sync_fn(|_| Err(json!("must not run"))), &[])
    .catch(
        sync_fn(|args| {
            assert_eq!(args, vec![Value::Null]);
            // a handler that returns Ok would resume the success path
            Err(args[0].clone())
        }),
        &[],
    )
    .await;

    assert_eq!(result, Err(PipeError::Rejected(Value::Null)));
}

#[tokio::test]
async fn test_out_routes_to_later_steps() {
    init_tracing();
    let result = pipe(bind(check_path(), vec![Arg::Value(event()), Arg::value("body")]), &[])
        // to the next step and the one three ahead
        .pipe(bind(parse_json(), vec![body()]), &[out([1, 3])])
        .pipe(value_fn(|args| args[0]["name"].clone()), &[])
        .pipe(bind(query_by_name(), vec![PLACEHOLDER]), &[])
        .pipe(
            sync_fn(|args| {
                assert_eq!(args.len(), 2);
                Ok(json!({ "age": args[0]["age"], "email": args[1]["email"] }))
            }),
            &[],
        )
        .await;

    assert_eq!(result, Ok(json!({ "age": 18, "email": "test@gmail.com" })));
}

#[tokio::test]
async fn test_pipe_map_over_array_values() {
    init_tracing();
    let result = pipe(bind(scan_name(), vec![]), &[])
        .pipe(value_fn(|args| args[0]["items"].clone()), &[])
        .pipe_map(value_fn(|args| args[0]["name"].clone()), &[])
        .pipe_map(bind(query_by_name(), vec![PLACEHOLDER]), &[])
        .pipe(value_fn(|args| args[0].clone()), &[])
        .await
        .unwrap();

    let users = result.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "test@gmail.com");
    assert_eq!(users[1]["email"], "dana@gmail.com");
}

#[tokio::test]
async fn test_map_index_holds_scalars_fixed() {
    init_tracing();
    let result = pipe(bind(parse_json(), vec![body()]), &[])
        .pipe(value_fn(|args| args[0]["name"].clone()), &[out([4])])
        .pipe(bind(scan_name(), vec![]), &[])
        .pipe(value_fn(|args| args[0]["items"].clone()), &[])
        .pipe_map(value_fn(|args| args[0]["name"].clone()), &[])
        // ("Andy", ["Andy", "Dana"]): only position 1 is broadcast
        .pipe_map(bind(is_equal(), vec![PLACEHOLDER, PLACEHOLDER]), &[map_index([1])])
        .await;

    assert_eq!(result, Ok(json!([true, false])));
}

#[tokio::test]
async fn test_order_rearranges_collected_arguments() {
    init_tracing();
    let result = pipe(bind(parse_json(), vec![body()]), &[])
        .pipe(value_fn(|args| args[0]["name"].clone()), &[out([3])])
        .pipe(bind(query_by_name(), vec![Arg::value("Andy")]), &[out([2])])
        .pipe(bind(query_by_name(), vec![Arg::value("Dana")]), &[out([1])])
        // collected as (body_name, andy, dana), called as (dana, body_name, andy)
        .pipe(
            value_fn(|args| json!([args[0]["name"], args[1], args[2]["name"]])),
            &[order([2, 0, 1])],
        )
        .await;

    assert_eq!(result, Ok(json!(["Dana", "Andy", "Andy"])));
}

#[tokio::test]
async fn test_failed_lookup_in_map_reaches_handler() {
    init_tracing();
    let result = pipe(value_fn(|_| json!(["Andy", "Zed"])), &[])
        .pipe_map(bind(query_by_name(), vec![PLACEHOLDER]), &[])
        .pipe(sync_fn(|_| Err(json!("must not run"))), &[])
        .catch(value_fn(|args| json!({ "handled": args[0] })), &[])
        .await;

    assert_eq!(result, Ok(json!({ "handled": "user not found" })));
}
