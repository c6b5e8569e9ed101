//! Archivist: turns ingested content into embeddings and digests.
//!
//! Large content is amplified: anything longer than the configured
//! threshold schedules a high-priority `deep_process` on the archivist
//! itself.

use std::collections::HashMap;

use async_trait::async_trait;
use hive_types::Task;
use serde_json::{json, Value};
use tracing::info;

use super::{fold_hash, now, record_mut};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::{HiveError, Result};
use crate::telemetry;

pub const ID: &str = "archivist";
pub const RANK: u32 = 7;

/// Embedding width
pub const EMBEDDING_DIM: usize = 32;

const DIGEST_CHARS: usize = 160;
const KEYWORDS_KEPT: usize = 8;

const STOPWORDS: [&str; 16] = [
    "that", "this", "with", "from", "have", "were", "their", "there", "which", "when", "will",
    "your", "about", "into", "than", "then",
];

pub struct Archivist;

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Hashed bag-of-tokens embedding, L2-normalized
pub fn embed(text: &str) -> Vec<f32> {
    let mut vec = vec![0.0f32; EMBEDDING_DIM];
    for token in tokens(text) {
        let hash = fold_hash(&token);
        let bucket = (hash % EMBEDDING_DIM as u64) as usize;
        let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        vec[bucket] += sign;
    }

    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vec {
            *x /= norm;
        }
    }
    vec
}

/// Most frequent meaningful words, ties broken alphabetically
pub fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokens(text) {
        if token.chars().count() < 4
            || STOPWORDS.contains(&token.as_str())
            || token.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        *counts.entry(token).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}

fn process(
    ctx: &mut ActionContext<'_>,
    source: &str,
    content: &str,
    category: Option<&str>,
) -> Result<()> {
    let chars = content.chars().count();
    let digest: String = content.chars().take(DIGEST_CHARS).collect();
    let found = keywords(content, KEYWORDS_KEPT);

    let knowledge = ctx.knowledge();
    knowledge.embeddings.insert(source.to_string(), embed(content));
    knowledge.projects.insert(
        source.to_string(),
        json!({
            "category": category.unwrap_or("general"),
            "chars": chars,
            "words": tokens(content).count(),
            "keywords": found,
            "digest": digest,
            "processed_at": now(),
        }),
    );

    if chars > ctx.env().content_threshold {
        info!(
            target: telemetry::TASK,
            source,
            chars,
            "Content over threshold, scheduling deep pass"
        );
        let follow_up = Task::new(ctx.agent_id(), "deep_process")
            .with_param("source", source)
            .high_priority();
        ctx.enqueue(follow_up)?;
    }
    Ok(())
}

#[async_trait]
impl Role for Archivist {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["process_content", "deep_process", "ingest_url"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::ProcessContent {
                source,
                content,
                category,
            } => {
                process(ctx, &source, &content, category.as_deref())?;
                Ok(Handled::Done)
            }
            AgentAction::DeepProcess { source } => {
                let stored = ctx.knowledge().projects.get_mut(&source).ok_or_else(|| {
                    HiveError::invalid_input(format!("nothing archived for '{}'", source))
                })?;
                let entry = record_mut(stored, &source)?;
                entry.insert("deep_processed_at".into(), json!(now()));
                let found = entry.get("keywords").cloned().unwrap_or(Value::Null);
                let category = entry.get("category").cloned().unwrap_or(Value::Null);

                ctx.share_lore(
                    "loremaster",
                    format!("archive:{}", source),
                    json!({ "source": source, "category": category, "keywords": found }),
                )
                .await;
                Ok(Handled::Done)
            }
            AgentAction::IngestUrl { url } => {
                let fetcher = ctx
                    .fetcher()
                    .ok_or_else(|| HiveError::execution("no resource fetcher available"))?;
                let page = fetcher
                    .fetch_within(&url, ctx.env().fetch_budget)
                    .await
                    .ok_or_else(|| HiveError::fetch(format!("{} unreachable", url)))?;

                process(ctx, &page.url, &page.content, Some("ingested"))?;
                ctx.knowledge()
                    .mechanics
                    .insert(format!("links:{}", page.url), json!(page.links));
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::roles::testing::Harness;
    use hive_types::TaskPriority;

    #[test]
    fn test_embedding_is_normalized_and_bounded() {
        let v = embed("The drowned city of Ys sank beneath the waves");
        assert_eq!(v.len(), EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        assert!(embed("").iter().all(|x| *x == 0.0));
        assert_eq!(embed("same words"), embed("Same, words!"));
    }

    #[test]
    fn test_keywords() {
        let found = keywords("Telnet options: telnet NAWS, telnet TTYPE and NAWS with more", 3);
        assert_eq!(found, ["telnet", "naws", "more"]);
    }

    #[tokio::test]
    async fn test_small_content_is_not_amplified() {
        let mut h = Harness::new();
        h.run(
            Task::new(ID, "process_content")
                .with_param("source", "http://lore.test/a")
                .with_param("content", "short tale"),
        )
        .await
        .unwrap();

        let doc = h.doc(ID).await;
        assert!(doc.embeddings.contains_key("http://lore.test/a"));
        assert_eq!(doc.projects["http://lore.test/a"]["category"], json!("general"));
        assert!(h.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_large_content_schedules_high_priority_deep_pass() {
        let mut h = Harness::new();
        let content = "ancient harbor ".repeat(200);
        h.run(
            Task::new(ID, "process_content")
                .with_param("source", "big")
                .with_param("content", content)
                .with_param("category", "lore"),
        )
        .await
        .unwrap();

        let follow_ups = h.submitted();
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].target_agent, ID);
        assert_eq!(follow_ups[0].action, "deep_process");
        assert_eq!(follow_ups[0].param_str("source"), Some("big"));
        assert_eq!(follow_ups[0].priority, TaskPriority::High);

        h.run(follow_ups[0].clone()).await.unwrap();
        let lore = h.doc("loremaster").await;
        assert_eq!(lore.lore["archive:big"]["keywords"], json!(["ancient", "harbor"]));
    }

    #[tokio::test]
    async fn test_deep_process_without_content_fails() {
        let h = Harness::new();
        let result = h
            .run(Task::new(ID, "deep_process").with_param("source", "missing"))
            .await;
        assert!(matches!(result, Err(HiveError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_deep_process_rejects_scalar_project_entry() {
        let h = Harness::new();
        let temp = h.data_dir();
        std::fs::create_dir_all(temp.join("knowledge")).unwrap();
        std::fs::write(
            temp.join("knowledge").join("archivist.json"),
            r#"{"mechanics":{},"lore":{},"projects":{"src":"legacy"},"tasks":[],"history":[],"embeddings":{}}"#,
        )
        .unwrap();

        let result = h
            .run(Task::new(ID, "deep_process").with_param("source", "src"))
            .await;
        assert!(matches!(result, Err(HiveError::InvalidInput(_))));

        let doc = h.doc(ID).await;
        assert_eq!(doc.projects["src"], json!("legacy"));
        assert_eq!(doc.history.len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_without_fetcher_fails() {
        let h = Harness::new();
        let result = h
            .run(Task::new(ID, "ingest_url").with_param("url", "http://x.test/"))
            .await;
        assert!(result.is_err());
        assert_eq!(h.doc(ID).await.history.len(), 1);
    }
}
