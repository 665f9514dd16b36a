use anyhow::Result;
use dop_store::{
    catalog, resolve_data_root, AnyRepository, DataRoot, Dataset, Key, StoreError,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::{CommandGroupCli, DopCli};
use crate::outcome::{CommandName, ExecutionOutcome};

pub fn command_name(command: &CommandGroupCli) -> CommandName {
    match command {
        CommandGroupCli::Get(_) => CommandName::Get,
        CommandGroupCli::Keys(_) => CommandName::Keys,
        CommandGroupCli::Locate(_) => CommandName::Locate,
        CommandGroupCli::Check(_) => CommandName::Check,
    }
}

pub fn dispatch_command(cli: &DopCli) -> (CommandName, ExecutionOutcome) {
    let name = command_name(&cli.command);
    (name, core_call(|| run(cli)))
}

fn core_call<F>(action: F) -> ExecutionOutcome
where
    F: FnOnce() -> Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(store) = err.downcast_ref::<StoreError>() {
                return store_error_outcome(store);
            }
            let issues: Vec<String> = err.chain().map(std::string::ToString::to_string).collect();
            ExecutionOutcome::failure(
                err.to_string(),
                json!({
                    "reason": "internal_error",
                    "error": err.to_string(),
                    "issues": issues,
                }),
            )
        }
    }
}

fn run(cli: &DopCli) -> Result<ExecutionOutcome> {
    let dataset_name = match &cli.command {
        CommandGroupCli::Get(args) | CommandGroupCli::Locate(args) => &args.dataset,
        CommandGroupCli::Keys(args) => &args.dataset,
        CommandGroupCli::Check(args) => &args.dataset,
    };
    let dataset = match dataset_name.parse::<Dataset>() {
        Ok(dataset) => dataset,
        Err(message) => {
            return Ok(ExecutionOutcome::user_error(
                message,
                json!({
                    "reason": "unknown_dataset",
                    "dataset": dataset_name,
                    "hint": "Pick one of bkp, btp or hks.",
                }),
            ));
        }
    };

    let root = match &cli.data_dir {
        Some(path) => DataRoot::explicit(path, "--data-dir")?,
        None => resolve_data_root()?,
    };
    debug!(root = %root.path.display(), source = root.source, %dataset, "resolved data root");
    let repo = catalog::open(dataset, &root.path)?;

    match &cli.command {
        CommandGroupCli::Get(args) => {
            let key = match parse_key(dataset, &args.key) {
                Ok(key) => key,
                Err(outcome) => return Ok(outcome),
            };
            get(dataset, &repo, &key)
        }
        CommandGroupCli::Locate(args) => {
            let key = match parse_key(dataset, &args.key) {
                Ok(key) => key,
                Err(outcome) => return Ok(outcome),
            };
            Ok(locate(dataset, &repo, &key))
        }
        CommandGroupCli::Keys(args) => keys(dataset, &repo, args.available),
        CommandGroupCli::Check(_) => check(dataset, &repo),
    }
}

fn parse_key(dataset: Dataset, raw: &str) -> std::result::Result<Key, ExecutionOutcome> {
    dataset.parse_key(raw).ok_or_else(|| {
        ExecutionOutcome::user_error(
            format!("'{raw}' is not a {dataset} key"),
            json!({
                "reason": "invalid_key",
                "dataset": dataset,
                "key": raw,
                "hint": key_hint(dataset),
            }),
        )
    })
}

fn key_hint(dataset: Dataset) -> String {
    let example = match dataset {
        Dataset::Bkp | Dataset::Btp => "13.3754",
        Dataset::Hks => "x4+y4__x3w+z4/dop.1",
    };
    format!("{dataset} keys look like {example}; run `dop keys {dataset}` to list them.")
}

fn get(dataset: Dataset, repo: &AnyRepository, key: &Key) -> Result<ExecutionOutcome> {
    let rendered = repo.lookup_rendered(key)?;
    Ok(ExecutionOutcome::success(
        key.to_string(),
        json!({
            "dataset": dataset,
            "key": key,
            "operator": rendered.text,
            "order": rendered.order,
        }),
    ))
}

fn locate(dataset: Dataset, repo: &AnyRepository, key: &Key) -> ExecutionOutcome {
    let artifact = repo.locate(key);
    ExecutionOutcome::success(
        format!("{key} is {}", artifact.label()),
        json!({
            "dataset": dataset,
            "key": key,
            "data_dir": repo.data_dir(),
            "artifact": artifact,
        }),
    )
}

fn keys(dataset: Dataset, repo: &AnyRepository, available: bool) -> Result<ExecutionOutcome> {
    let keys = if available {
        repo.available_keys()?
    } else {
        repo.keys()?
    };
    let noun = if keys.len() == 1 { "key" } else { "keys" };
    Ok(ExecutionOutcome::success(
        format!("{} {noun}", keys.len()),
        json!({
            "dataset": dataset,
            "available": available,
            "count": keys.len(),
            "keys": keys,
        }),
    ))
}

fn check(dataset: Dataset, repo: &AnyRepository) -> Result<ExecutionOutcome> {
    let report = repo.check()?;
    let mut details = json!({
        "dataset": dataset,
        "checked": report.checked,
        "failures": report.failures,
    });
    if report.is_clean() {
        return Ok(ExecutionOutcome::success(
            format!("{} operators parsed", report.checked),
            details,
        ));
    }
    if let Value::Object(map) = &mut details {
        map.insert("code".into(), json!("DOP200"));
        map.insert("reason".into(), json!("check_failed"));
    }
    Ok(ExecutionOutcome::failure(
        format!(
            "{} of {} operators failed to parse",
            report.failures.len(),
            report.checked
        ),
        details,
    ))
}

fn store_error_outcome(err: &StoreError) -> ExecutionOutcome {
    let code = err.code();
    let rendered = err.to_string();
    let message = rendered
        .strip_prefix(&format!("[{code}] "))
        .unwrap_or(&rendered)
        .to_string();
    let mut details = json!({ "code": code, "error": rendered });
    let extra = match err {
        StoreError::UnknownKey { key } => json!({
            "reason": "unknown_key",
            "key": key,
            "hint": "Run `dop keys <DATASET>` to list the known keys.",
        }),
        StoreError::Unavailable { key, path } => json!({
            "reason": "unavailable",
            "key": key,
            "path": path,
            "hint": "Fetch the dataset files so the placeholder resolves to real data.",
        }),
        StoreError::MalformedExpression {
            offset, excerpt, ..
        } => json!({
            "reason": "malformed_expression",
            "offset": offset,
            "excerpt": excerpt,
        }),
        StoreError::DataRootUnavailable | StoreError::Io { .. } => json!({
            "hint": "Point --data-dir or DOP_DATA_DIR at the directory holding bkp/, btp/ and hks/.",
        }),
        _ => Value::Null,
    };
    if let (Value::Object(map), Value::Object(extra)) = (&mut details, extra) {
        map.extend(extra);
    }
    if err.is_user_error() {
        ExecutionOutcome::user_error(message, details)
    } else {
        ExecutionOutcome::failure(message, details)
    }
}
