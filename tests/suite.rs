// Integration scenarios for loading, facets, selection, and the CLI.
//
// Shared helpers live in tests/support so scripted sources and fixtures stay
// in one place.
mod support;

use anyhow::Result;
use listing_catalog::{
    Collection, DirectorySource, FetchOrchestrator, ListingClient, LoadStatus, Marketplace,
    QueryAction, QueryState, SortKey, select_visible,
};
use serde_json::{Value, json};
use std::process::Command;
use std::sync::Arc;
use support::{
    ScriptedSource, Step, agent, browse_binary, chatflow, run_command, sample_catalog,
    write_catalog,
};
use tempfile::TempDir;

fn to_value<T: serde::Serialize>(items: &[T]) -> Value {
    serde_json::to_value(items).expect("serialize fixture")
}

#[test]
fn facets_cover_both_collections() {
    let source = ScriptedSource::new();
    source
        .push(
            Collection::Agents,
            Step::ok(to_value(&[agent("a", "support"), agent("b", "sales")])),
        )
        .push(
            Collection::Chatflows,
            Step::ok(to_value(&[chatflow("c", "support")])),
        );
    let market = Marketplace::new(ListingClient::from_source(source));
    market.load().wait();

    assert_eq!(market.load_status(), LoadStatus::Success);
    assert_eq!(market.facets().as_slice(), ["all", "sales", "support"]);
}

#[test]
fn facets_ignore_the_current_filter() {
    let source = ScriptedSource::new();
    source
        .push(
            Collection::Agents,
            Step::ok(to_value(&[agent("a", "support"), agent("b", "sales")])),
        )
        .push(Collection::Chatflows, Step::ok(json!([])));
    let mut market = Marketplace::new(ListingClient::from_source(source));
    market.load().wait();

    market.set_category("sales");
    market.set_search_text("zzz-no-match");
    assert!(market.visible_items().is_empty());
    assert_eq!(market.facets().as_slice(), ["all", "sales", "support"]);
}

#[test]
fn first_failure_wins_across_collections() {
    let source = ScriptedSource::new();
    let (agents_step, release_agents) = Step::fail("network down").gated();
    let (flows_step, release_flows) = Step::fail("timeout").gated();
    source
        .push(Collection::Agents, agents_step)
        .push(Collection::Chatflows, flows_step);
    let orchestrator = FetchOrchestrator::new(ListingClient::from_source(source));
    let handle = orchestrator.load();

    assert_eq!(orchestrator.status(), LoadStatus::Loading);
    release_agents.send(()).unwrap();
    while orchestrator.snapshot().agents.status == LoadStatus::Loading {
        std::thread::yield_now();
    }
    release_flows.send(()).unwrap();
    handle.wait();

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status(), LoadStatus::Error);
    assert_eq!(snapshot.error_message.as_deref(), Some("network down"));
    assert_eq!(snapshot.chatflows.error.as_deref(), Some("timeout"));
    assert!(snapshot.facets.is_placeholder());
}

#[test]
fn one_failure_does_not_block_the_other_collection() {
    let source = ScriptedSource::new();
    let (agents_step, release_agents) = Step::fail("agents offline").gated();
    source
        .push(Collection::Agents, agents_step)
        .push(
            Collection::Chatflows,
            Step::ok(to_value(&[chatflow("faq", "support")])),
        );
    let orchestrator = FetchOrchestrator::new(ListingClient::from_source(source));
    let handle = orchestrator.load();

    while orchestrator.snapshot().chatflows.status == LoadStatus::Loading {
        std::thread::yield_now();
    }
    let mid = orchestrator.snapshot();
    assert_eq!(mid.chatflows.status, LoadStatus::Success);
    assert_eq!(mid.status(), LoadStatus::Loading);

    release_agents.send(()).unwrap();
    handle.wait();
    let done = orchestrator.snapshot();
    assert_eq!(done.status(), LoadStatus::Error);
    assert_eq!(done.chatflows.items.len(), 1);
}

#[test]
fn retry_recovers_and_keeps_data_visible_meanwhile() {
    let source = ScriptedSource::new();
    source
        .push(Collection::Agents, Step::ok(to_value(&[agent("a", "sales")])))
        .push(Collection::Chatflows, Step::fail("timeout"));
    let (retry_flows, release_retry) =
        Step::ok(to_value(&[chatflow("faq", "support")])).gated();
    source
        .push(Collection::Agents, Step::ok(to_value(&[agent("a", "sales")])))
        .push(Collection::Chatflows, retry_flows);

    let market = Marketplace::new(ListingClient::from_source(source));
    market.load().wait();
    assert_eq!(market.load_status(), LoadStatus::Error);
    assert_eq!(market.error_message().as_deref(), Some("timeout"));
    assert!(market.facets().is_placeholder());

    let handle = market.retry();
    assert!(market.is_retrying());
    assert!(market.error_message().is_none());
    assert_eq!(market.visible_items().slugs(), ["a"]);

    release_retry.send(()).unwrap();
    handle.wait();
    assert_eq!(market.load_status(), LoadStatus::Success);
    assert!(!market.is_retrying());
    assert_eq!(market.facets().as_slice(), ["all", "sales", "support"]);
}

#[test]
fn failed_retry_preserves_last_good_collection() {
    let source = ScriptedSource::new();
    source
        .push(Collection::Agents, Step::ok(to_value(&[agent("kept", "sales")])))
        .push(Collection::Chatflows, Step::ok(json!([])))
        .push(Collection::Agents, Step::fail("network down"))
        .push(Collection::Chatflows, Step::ok(json!([])));

    let market = Marketplace::new(ListingClient::from_source(source));
    market.load().wait();
    market.retry().wait();

    let snapshot = market.snapshot();
    assert_eq!(snapshot.status(), LoadStatus::Error);
    assert!(snapshot.is_stale());
    assert_eq!(market.visible_items().slugs(), ["kept"]);
    assert_eq!(market.facets().as_slice(), ["all", "sales"]);
}

#[test]
fn stale_response_cannot_overwrite_newer_load() {
    let source = Arc::new(ScriptedSource::new());
    let (slow_agents, release_slow) =
        Step::ok(to_value(&[agent("old", "legacy")])).gated();
    source
        .push(Collection::Agents, slow_agents)
        .push(Collection::Chatflows, Step::ok(json!([])))
        .push(Collection::Agents, Step::ok(to_value(&[agent("new", "fresh")])))
        .push(Collection::Chatflows, Step::ok(json!([])));

    let orchestrator = FetchOrchestrator::new(ListingClient::new(source.clone()));
    let first = orchestrator.load();
    // Both workers of the first load must have taken their steps before the
    // retry starts, otherwise the retry could pick up the gated one.
    while source.pending(Collection::Agents) > 1 || source.pending(Collection::Chatflows) > 1 {
        std::thread::yield_now();
    }
    let second = orchestrator.retry();
    assert!(second.token() > first.token());
    second.wait();

    release_slow.send(()).unwrap();
    first.wait();

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status(), LoadStatus::Success);
    assert_eq!(snapshot.agents.items.len(), 1);
    assert_eq!(snapshot.agents.items[0].slug, "new");
    assert_eq!(snapshot.facets.as_slice(), ["all", "fresh"]);
}

#[test]
fn malformed_payload_becomes_error_state() {
    let source = ScriptedSource::new();
    source
        .push(Collection::Agents, Step::ok(json!({"agents": []})))
        .push(Collection::Chatflows, Step::ok(json!([])));
    let market = Marketplace::new(ListingClient::from_source(source));
    market.load().wait();

    assert_eq!(market.load_status(), LoadStatus::Error);
    let message = market.error_message().expect("error message");
    assert!(message.contains("expected a JSON array"), "got {message}");
}

#[test]
fn directory_catalog_normalizes_and_sorts() -> Result<()> {
    let dir = TempDir::new()?;
    write_catalog(
        dir.path(),
        &json!([
            {"id": "1", "slug": "helper-bot", "name": "Helper Bot", "description": "support",
             "category": "SUPPORT", "metadata": {"rating": 3}},
            {"id": "2", "slug": "unrated", "name": "Unrated", "category": "Support"},
            {"id": "3", "slug": "sales-ai", "name": "Sales AI", "description": "selling",
             "category": "Sales", "metadata": {"rating": 5}}
        ]),
        &json!([]),
    )?;
    let client = ListingClient::from_source(DirectorySource::new(dir.path()));
    let agents = client.fetch_agents().map_err(anyhow::Error::new)?;

    let by_rating = QueryState::default().reduce(QueryAction::SetSort(SortKey::Rating));
    let slugs: Vec<&str> = select_visible(&agents, &by_rating)
        .into_iter()
        .map(|a| a.slug.as_str())
        .collect();
    assert_eq!(slugs, ["sales-ai", "helper-bot", "unrated"]);

    let support = by_rating.reduce(QueryAction::SetCategory("support".into()));
    assert_eq!(select_visible(&agents, &support).len(), 2);

    let search = QueryState::default().reduce(QueryAction::SetSearchText("sales".into()));
    let hits = select_visible(&agents, &search);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].slug, "sales-ai");
    Ok(())
}

#[test]
fn sample_catalog_loads_cleanly() {
    let market = Marketplace::new(ListingClient::from_source(DirectorySource::new(
        sample_catalog(),
    )));
    market.load().wait();
    assert_eq!(market.load_status(), LoadStatus::Success);
    let facets = market.facets();
    assert_eq!(facets.as_slice()[0], "all");
    assert!(facets.categories().windows(2).all(|w| w[0] < w[1]));
    assert!(facets.contains("support"));
}

#[test]
fn cli_prints_filtered_json() -> Result<()> {
    let mut cmd = Command::new(browse_binary());
    cmd.arg("--root")
        .arg(sample_catalog())
        .arg("--tab")
        .arg("chatflows")
        .arg("--category")
        .arg("Sales")
        .arg("--json");
    let output = run_command(cmd)?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let document: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(document["status"], "success");
    assert_eq!(document["query"]["category"], "sales");
    assert_eq!(document["visible"]["tab"], "chatflows");
    let slugs: Vec<&str> = document["visible"]["items"]
        .as_array()
        .expect("items array")
        .iter()
        .filter_map(|item| item["slug"].as_str())
        .collect();
    assert_eq!(slugs, ["lead-intake"]);
    Ok(())
}

#[test]
fn cli_exits_with_2_when_a_collection_fails() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("agents.json"), "[]")?;
    std::fs::write(dir.path().join("chatflows.json"), "{\"not\": \"an array\"}")?;

    let mut cmd = Command::new(browse_binary());
    cmd.arg("--root").arg(dir.path()).arg("--retries").arg("1");
    let output = run_command(cmd)?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed chatflows response"), "stderr: {stderr}");
    Ok(())
}
