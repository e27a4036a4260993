// Row-wise broadcast of a step over array arguments
use super::step::{PipeStep, StepResult};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::debug;

/// Split `args` into one argument list per row.
///
/// The array at the first designated position fixes the row count. Every
/// designated array contributes its `r`-th element (`Null` once exhausted);
/// all other arguments repeat unchanged. A non-array first position yields a
/// single row holding the raw arguments. No arguments at all yield no rows.
pub fn broadcast_rows(
    args: &[Value],
    map_index: &[usize],
) -> std::result::Result<Vec<Vec<Value>>, String> {
    let Some(&lead) = map_index.first() else {
        return Err("map step needs at least one broadcast position".to_string());
    };
    if args.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(&missing) = map_index.iter().find(|&&index| index >= args.len()) {
        return Err(format!(
            "map index {} out of range for {} argument(s)",
            missing,
            args.len()
        ));
    }

    let rows = match &args[lead] {
        Value::Array(items) => items.len(),
        _ => return Ok(vec![args.to_vec()]),
    };

    let table: Vec<Vec<Value>> = (0..rows)
        .map(|row| {
            args.iter()
                .enumerate()
                .map(|(col, arg)| match arg {
                    Value::Array(items) if map_index.contains(&col) => {
                        items.get(row).cloned().unwrap_or(Value::Null)
                    }
                    _ => arg.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(table)
}

/// Invoke `step` once per row without waiting between rows and collect the
/// results in row order. The first rejected row rejects the whole step.
pub async fn broadcast(step: &dyn PipeStep, rows: Vec<Vec<Value>>) -> StepResult {
    debug!("Broadcasting '{}' over {} row(s)", step.name(), rows.len());
    let results = try_join_all(rows.into_iter().map(|row| step.call(row))).await?;
    Ok(Value::Array(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::step::{step_fn, sync_fn};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_rows_hold_scalars_fixed() {
        let args = vec![json!("Andy"), json!(["Andy", "Dana"])];
        let rows = broadcast_rows(&args, &[1]).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![json!("Andy"), json!("Andy")],
                vec![json!("Andy"), json!("Dana")],
            ]
        );
    }

    #[test]
    fn test_rows_align_multiple_arrays() {
        let args = vec![json!([1, 2, 3]), json!(["x", "y"]), json!([true])];
        let rows = broadcast_rows(&args, &[0, 1]).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![json!(2), json!("y"), json!([true])]);
        assert_eq!(rows[2], vec![json!(3), Value::Null, json!([true])]);
    }

    #[test]
    fn test_non_array_lead_is_single_row() {
        let args = vec![json!("solo"), json!([1, 2])];
        let rows = broadcast_rows(&args, &[0, 1]).unwrap();
        assert_eq!(rows, vec![args]);
    }

    #[test]
    fn test_out_of_range_index() {
        let err = broadcast_rows(&[json!([1])], &[0, 2]).unwrap_err();
        assert!(err.contains("map index 2"));
        assert!(broadcast_rows(&[json!([1])], &[]).is_err());
    }

    #[test]
    fn test_no_arguments_yield_no_rows() {
        assert_eq!(broadcast_rows(&[], &[0]).unwrap(), Vec::<Vec<Value>>::new());
        assert_eq!(broadcast_rows(&[], &[0, 3]).unwrap(), Vec::<Vec<Value>>::new());
    }

    #[tokio::test]
    async fn test_results_keep_row_order() {
        // later rows finish first
        let step = step_fn(|args: Vec<Value>| async move {
            let n = args[0].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(30 - n * 10)).await;
            Ok::<_, Value>(json!(n * 2))
        });
        let rows = broadcast_rows(&[json!([0, 1, 2])], &[0]).unwrap();
        assert_eq!(broadcast(&step, rows).await, Ok(json!([0, 2, 4])));
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let step = sync_fn(|args| {
            if args[0] == json!("Dana") {
                Err(json!("user not found"))
            } else {
                Ok(args[0].clone())
            }
        });
        let rows = broadcast_rows(&[json!(["Andy", "Dana"])], &[0]).unwrap();
        assert_eq!(broadcast(&step, rows).await, Err(json!("user not found")));
    }

    #[tokio::test]
    async fn test_empty_array_yields_empty_result() {
        let step = sync_fn(|args| Ok(args[0].clone()));
        let rows = broadcast_rows(&[json!([])], &[0]).unwrap();
        assert_eq!(broadcast(&step, rows).await, Ok(json!([])));
    }
}
