// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only tools the runtime may run before composing a prompt.
//!
//! Tools are pure functions over the performance records, except
//! `similar_cases` which queries the retriever and degrades gracefully
//! when the knowledge base is unavailable. Selected tools run
//! concurrently under a semaphore cap and their outputs are merged by
//! tool name, so prompt assembly is deterministic regardless of
//! completion order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use advisory_core::error::AdvisoryError;
use advisory_core::types::PerformanceRecord;
use advisory_knowledge::retriever::Retriever;

use crate::intent::Intent;

pub const OVERALL_SUMMARY: &str = "overall_summary";
pub const TOP_CAMPAIGNS: &str = "top_campaigns";
pub const UNDERPERFORMERS: &str = "underperformers";
pub const SIMILAR_CASES: &str = "similar_cases";

const TOP_CAMPAIGN_LIMIT: usize = 5;
const UNDERPERFORMER_LIMIT: usize = 8;

/// Everything a tool may read. Shared across the tools of one request.
pub struct ToolContext {
    pub records: Arc<Vec<PerformanceRecord>>,
    pub retriever: Option<Arc<Retriever>>,
    /// Knowledge collection queried by `similar_cases`.
    pub collection: String,
    /// The user message, reused as the similarity query.
    pub query: String,
    pub retrieval_k: usize,
    pub target_roas: f64,
}

/// Map an intent to the tools worth running for it.
pub fn select_tools(intent: Intent) -> Vec<&'static str> {
    match intent {
        Intent::QueryData => vec![OVERALL_SUMMARY, TOP_CAMPAIGNS],
        Intent::Analyze => vec![OVERALL_SUMMARY, TOP_CAMPAIGNS, UNDERPERFORMERS],
        Intent::Recommend => vec![OVERALL_SUMMARY, UNDERPERFORMERS, SIMILAR_CASES],
        Intent::GenerateCopy => vec![TOP_CAMPAIGNS, SIMILAR_CASES],
        Intent::Optimize => vec![
            OVERALL_SUMMARY,
            TOP_CAMPAIGNS,
            UNDERPERFORMERS,
            SIMILAR_CASES,
        ],
        Intent::Chat => vec![OVERALL_SUMMARY],
    }
}

/// Run the selected tools concurrently, bounded by `concurrency_limit`,
/// and merge their outputs by tool name.
pub async fn execute_tools(
    names: &[&'static str],
    ctx: Arc<ToolContext>,
    concurrency_limit: usize,
) -> Result<BTreeMap<String, Value>, AdvisoryError> {
    let semaphore = Arc::new(Semaphore::new(concurrency_limit.max(1)));
    let mut set = JoinSet::new();

    for &name in names {
        let ctx = ctx.clone();
        let semaphore = semaphore.clone();
        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| AdvisoryError::Internal("tool semaphore closed".to_string()))?;
            let output = run_tool(name, &ctx).await?;
            Ok::<_, AdvisoryError>((name, output))
        });
    }

    let mut outputs = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        let (name, output) = joined
            .map_err(|e| AdvisoryError::Internal(format!("tool task failed: {e}")))??;
        debug!(tool = name, "tool complete");
        outputs.insert(name.to_string(), output);
    }
    Ok(outputs)
}

async fn run_tool(name: &'static str, ctx: &ToolContext) -> Result<Value, AdvisoryError> {
    match name {
        OVERALL_SUMMARY => Ok(overall_summary(&ctx.records)),
        TOP_CAMPAIGNS => Ok(top_campaigns(&ctx.records, TOP_CAMPAIGN_LIMIT)),
        UNDERPERFORMERS => Ok(underperformers(&ctx.records, ctx.target_roas)),
        SIMILAR_CASES => Ok(similar_cases(ctx).await),
        _ => Err(AdvisoryError::Internal(format!("unknown tool '{name}'"))),
    }
}

/// Account-wide aggregates across all records.
pub fn overall_summary(records: &[PerformanceRecord]) -> Value {
    if records.is_empty() {
        return json!({ "empty": true });
    }
    let campaigns: std::collections::BTreeSet<&str> =
        records.iter().map(|r| r.campaign.as_str()).collect();
    let n = records.len() as f64;
    json!({
        "total_campaigns": campaigns.len(),
        "total_spend": records.iter().map(|r| r.spend).sum::<f64>(),
        "total_purchases": records.iter().map(|r| r.purchases).sum::<u64>(),
        "average_roas": records.iter().map(|r| r.roas).sum::<f64>() / n,
        "average_ctr": records.iter().map(|r| r.ctr).sum::<f64>() / n,
    })
}

/// Best campaigns by mean ROAS.
pub fn top_campaigns(records: &[PerformanceRecord], limit: usize) -> Value {
    let mut rows = campaign_rollup(records);
    rows.sort_by(|a, b| b.roas.partial_cmp(&a.roas).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(limit);
    json!({
        "campaigns": rows
            .iter()
            .map(|row| {
                json!({
                    "campaign": row.campaign,
                    "roas": row.roas,
                    "spend": row.spend,
                    "purchases": row.purchases,
                })
            })
            .collect::<Vec<_>>()
    })
}

/// Campaigns whose mean ROAS is below target, biggest spenders first.
pub fn underperformers(records: &[PerformanceRecord], target_roas: f64) -> Value {
    let mut rows: Vec<CampaignRow> = campaign_rollup(records)
        .into_iter()
        .filter(|row| row.roas < target_roas)
        .collect();
    rows.sort_by(|a, b| b.spend.partial_cmp(&a.spend).unwrap_or(std::cmp::Ordering::Equal));
    rows.truncate(UNDERPERFORMER_LIMIT);
    json!({
        "target_roas": target_roas,
        "campaigns": rows
            .iter()
            .map(|row| {
                json!({
                    "campaign": row.campaign,
                    "roas": row.roas,
                    "spend": row.spend,
                    "gap": target_roas - row.roas,
                })
            })
            .collect::<Vec<_>>()
    })
}

/// Reference cases from the knowledge base. Unavailability is reported
/// in-band so the run proceeds without retrieval context.
async fn similar_cases(ctx: &ToolContext) -> Value {
    let Some(retriever) = &ctx.retriever else {
        return json!({ "available": false, "reason": "knowledge base not configured" });
    };
    match retriever
        .search(&ctx.collection, &ctx.query, ctx.retrieval_k, &[])
        .await
    {
        Ok(hits) => json!({
            "available": true,
            "cases": hits
                .iter()
                .map(|(doc, score)| {
                    json!({
                        "headline": doc.metadata.headline,
                        "roas": doc.metadata.roas,
                        "ctr": doc.metadata.ctr,
                        "score": score,
                    })
                })
                .collect::<Vec<_>>()
        }),
        Err(AdvisoryError::RagUnavailable(reason)) => {
            warn!(reason = reason.as_str(), "retrieval skipped");
            json!({ "available": false, "reason": reason })
        }
        Err(e) => {
            warn!(error = %e, "retrieval failed");
            json!({ "available": false, "reason": e.to_string() })
        }
    }
}

struct CampaignRow {
    campaign: String,
    spend: f64,
    purchases: u64,
    roas: f64,
}

fn campaign_rollup(records: &[PerformanceRecord]) -> Vec<CampaignRow> {
    let mut grouped: BTreeMap<&str, (f64, u64, f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.campaign.as_str()).or_default();
        entry.0 += record.spend;
        entry.1 += record.purchases;
        entry.2 += record.roas;
        entry.3 += 1;
    }
    grouped
        .into_iter()
        .map(|(campaign, (spend, purchases, roas_sum, count))| CampaignRow {
            campaign: campaign.to_string(),
            spend,
            purchases,
            roas: roas_sum / count as f64,
        })
        .collect()
}
