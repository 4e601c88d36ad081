//! Output Classifier
//!
//! 把仲裁器选出的最终信号转换为唯一的 [`ClassifiedOutcome`]。
//! stderr 总是先于退出码检查：worker 可能以 0 退出同时在 stderr 写入诊断信息。

use serde_json::{Map, Value};

use super::arbiter::{CompletionEvent, WorkerExit};
use super::hints::{with_hint, EXECUTABLE_HINT};
use crate::application::ports::{ClassifiedOutcome, MoodReading, WorkerFailure};
use crate::domain::mood::Mood;

/// 结果字段名；`mood` 为兼容旧版 worker 的别名
const RESULT_FIELDS: &[&str] = &["result", "mood"];

/// 语义错误标记字段
const ERROR_FIELDS: &[&str] = &["script_error", "error"];

const DETAIL_FIELD: &str = "detail";

/// 返回给调用方的诊断文本上限（字符）
const MAX_DETAIL_CHARS: usize = 2048;

/// 对最终信号分类
pub fn classify(event: CompletionEvent) -> ClassifiedOutcome {
    match event {
        CompletionEvent::SpawnFailed { program, error } => WorkerFailure::Spawn {
            detail: format!(
                "Could not launch '{}': {}. Hint: {}",
                program, error, EXECUTABLE_HINT
            ),
        }
        .into(),
        CompletionEvent::StdinFailed(error) => WorkerFailure::Stdin {
            detail: format!("Could not write image to worker stdin: {}", error),
        }
        .into(),
        CompletionEvent::DeadlineElapsed(timeout) => WorkerFailure::Timeout {
            detail: format!(
                "Worker did not finish within {:?} and was terminated",
                timeout
            ),
        }
        .into(),
        CompletionEvent::Exited(exit) => classify_exit(exit),
    }
}

fn classify_exit(exit: WorkerExit) -> ClassifiedOutcome {
    let stderr = String::from_utf8_lossy(&exit.stderr);
    let stderr = stderr.trim();
    let stdout = String::from_utf8_lossy(&exit.stdout);
    let stdout = stdout.trim();

    // 1. stderr：结构化错误 → 语义错误；非结构化 → 输出异常
    let mut diagnostic = None;
    if !stderr.is_empty() {
        match serde_json::from_str::<Value>(stderr) {
            Ok(Value::Object(object)) => match error_indicator(&object) {
                Some(detail) => return ClassifiedOutcome::LogicalError { detail },
                // 非致命诊断，继续按退出码/stdout 分类
                None => diagnostic = Some(excerpt(stderr, MAX_DETAIL_CHARS)),
            },
            _ => {
                return WorkerFailure::MalformedOutput {
                    detail: with_hint(format!(
                        "Unstructured worker stderr: {}",
                        excerpt(stderr, MAX_DETAIL_CHARS)
                    )),
                }
                .into();
            }
        }
    }

    // 2. 非零退出码（含被信号终止）
    if exit.code != Some(0) {
        let text = diagnostic
            .clone()
            .or_else(|| (!stdout.is_empty()).then(|| excerpt(stdout, MAX_DETAIL_CHARS)))
            .unwrap_or_else(|| "worker produced no output".to_string());
        return WorkerFailure::NonZeroExit {
            code: exit.code,
            detail: with_hint(text),
        }
        .into();
    }

    // 3. 退出码 0：解析 stdout
    classify_stdout(stdout, diagnostic)
}

fn classify_stdout(stdout: &str, diagnostic: Option<String>) -> ClassifiedOutcome {
    let malformed = |detail: String| ClassifiedOutcome::from(WorkerFailure::MalformedOutput { detail });

    if stdout.is_empty() {
        return malformed(format!(
            "Worker exited successfully but wrote nothing to stdout (missing field `{}`)",
            RESULT_FIELDS[0]
        ));
    }

    let value = match serde_json::from_str::<Value>(stdout) {
        Ok(value) => value,
        Err(e) => {
            return malformed(format!(
                "Worker stdout is not valid JSON ({}): {}",
                e,
                excerpt(stdout, MAX_DETAIL_CHARS)
            ));
        }
    };

    let Value::Object(object) = value else {
        return malformed(format!(
            "Worker stdout is not a JSON object (missing field `{}`): {}",
            RESULT_FIELDS[0],
            excerpt(stdout, MAX_DETAIL_CHARS)
        ));
    };

    if let Some(detail) = error_indicator(&object) {
        return ClassifiedOutcome::LogicalError { detail };
    }

    let Some(raw) = RESULT_FIELDS.iter().find_map(|field| object.get(*field)) else {
        return malformed(format!(
            "Worker output is missing field `{}`",
            RESULT_FIELDS[0]
        ));
    };

    let Some(label) = raw.as_str() else {
        return malformed(format!(
            "Field `{}` must be a string, got {}",
            RESULT_FIELDS[0], raw
        ));
    };

    let mood = match label.parse::<Mood>() {
        Ok(mood) => mood,
        Err(e) => return malformed(e.to_string()),
    };

    let detail = object
        .get(DETAIL_FIELD)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
        .or(diagnostic);

    ClassifiedOutcome::Success(MoodReading { mood, detail })
}

/// 提取语义错误文本；`null`、`false` 与空字符串不算错误
fn error_indicator(object: &Map<String, Value>) -> Option<String> {
    ERROR_FIELDS.iter().find_map(|field| match object.get(*field)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    })
}

/// 按字符截断，超出部分以省略号表示
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
