//! Diagnostic classifier.
//!
//! When every strategy fails, [`diagnose`] repeats each retrieval path
//! (mapped by [`StrategyKind::probe_kind`]) and records a typed
//! [`FailureCause`] for each. Paths run in a fixed order and stop at the
//! first one that reaches the post, so a diagnosis holds one to three
//! findings. Suggestions are derived from
//! the typed causes, never from reason text.

use serde_json::Value;
use threadscope_core::{Diagnosis, FailureCause, PostId, ProbeKind};
use threadscope_fetch::{FetchContext, StrategyKind, TransportError};
use tracing::{debug, instrument};

use crate::normalize::{
    detail_object, instruction_list, parse_post_object, parse_raw_protocol, parse_search_results,
};
use crate::strategies::search_query;

/// Advice added when the post detail came back without instructions.
pub const SUGGEST_DELETED: &str = "Post may have been deleted by the author";
/// Advice added when the post detail came back without instructions.
pub const SUGGEST_PRIVATE: &str = "Post may be from a private account";
/// Advice added when any probe was rate limited.
pub const SUGGEST_RATE_LIMIT: &str = "Rate limit reached - try again later";
/// Always added.
pub const SUGGEST_OTHER_ID: &str = "Try a different post id to verify the system works";
/// Always added.
pub const SUGGEST_BROWSER: &str = "Check whether the post is still reachable in a normal browser session";

/// Retrieval paths in diagnostic order.
const PROBED_PATHS: [StrategyKind; 3] = [
    StrategyKind::Detail,
    StrategyKind::Search,
    StrategyKind::RawProtocol,
];

/// Explains why a post could not be retrieved.
///
/// Never fails: every probe error becomes a finding.
#[instrument(skip_all, fields(post_id = %post_id))]
pub async fn diagnose(ctx: &FetchContext, post_id: &PostId) -> Diagnosis {
    let mut diagnosis = Diagnosis::new(post_id.clone());

    for path in PROBED_PATHS {
        let probe = path.probe_kind();
        let cause = run_probe(ctx, probe, post_id).await;
        debug!(probe = %probe, cause = %cause, "Probe finished");

        let reached = cause.is_success();
        diagnosis.record(probe, cause);
        if reached {
            break;
        }
    }

    add_suggestions(&mut diagnosis);
    diagnosis
}

async fn run_probe(ctx: &FetchContext, probe: ProbeKind, post_id: &PostId) -> FailureCause {
    match probe {
        ProbeKind::Detail => match ctx.fetch_post_by_id(post_id).await {
            Ok(object) if object.as_ref().and_then(parse_post_object).is_some() => {
                FailureCause::Succeeded
            }
            Ok(_) => FailureCause::ReturnedNothing,
            Err(e) => transport_cause(&e),
        },
        ProbeKind::Search => {
            let query = search_query(post_id);
            match ctx.search_posts(&query, ctx.settings.search_limit).await {
                Ok(results) if parse_search_results(&results).is_some() => FailureCause::Succeeded,
                Ok(_) => FailureCause::ReturnedNothing,
                Err(e) => transport_cause(&e),
            }
        }
        ProbeKind::RawProtocol => match ctx.fetch_raw_protocol_response(post_id).await {
            Ok(response) if !response.is_success() => FailureCause::HttpStatus(response.status),
            Ok(response) => classify_raw_body(&response.body),
            Err(e) => transport_cause(&e),
        },
    }
}

/// Classifies a raw protocol body from a successful response.
pub fn classify_raw_body(body: &Value) -> FailureCause {
    let Some(detail) = detail_object(body) else {
        return FailureCause::MissingDetail;
    };
    let Some(instructions) = instruction_list(detail) else {
        return FailureCause::MissingInstructions;
    };

    if instructions.is_empty() {
        FailureCause::EmptyInstructions
    } else if parse_raw_protocol(body).is_some() {
        FailureCause::Succeeded
    } else {
        FailureCause::UnrecognizedShape
    }
}

fn transport_cause(error: &TransportError) -> FailureCause {
    match error {
        TransportError::RateLimited {
            retry_after: Some(secs),
        } => FailureCause::RateLimited(format!("retry after {secs}s")),
        TransportError::RateLimited { retry_after: None } => {
            FailureCause::RateLimited("no retry hint".to_string())
        }
        other => FailureCause::Transport(other.to_string()),
    }
}

fn add_suggestions(diagnosis: &mut Diagnosis) {
    if diagnosis.has_cause(FailureCause::suggests_unavailable) {
        diagnosis.suggest(SUGGEST_DELETED);
        diagnosis.suggest(SUGGEST_PRIVATE);
    }
    if diagnosis.has_cause(FailureCause::is_rate_limited) {
        diagnosis.suggest(SUGGEST_RATE_LIMIT);
    }
    diagnosis.suggest(SUGGEST_OTHER_ID);
    diagnosis.suggest(SUGGEST_BROWSER);
}

// ============================================================================
// Tests
// ============================================================================
