//! Keyword extraction jobs
//!
//! Posts are queued for keyword extraction after their content is written.
//! The API pushes a [`KeywordJob`] onto a Redis list; the `keyword-worker`
//! binary pops jobs, extracts keywords and writes them back to the post in its
//! own transaction.
//!
//! Extraction is statistical: lowercase alphanumeric words, English and Polish
//! stop words and words shorter than three characters removed, unigrams plus
//! bigrams of adjacent remaining words within a sentence, scored by frequency
//! with bigrams weighted 1.5x. The top five are joined with ", ".

use crate::db::post_repo;
use crate::metrics;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::watch;

/// Number of keywords kept per post
pub const TOP_N: usize = 5;

const MIN_WORD_LEN: usize = 3;
const UNIGRAM_WEIGHT: u32 = 2;
const BIGRAM_WEIGHT: u32 = 3;

const STOP_WORDS: &[&str] = &[
    // English
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into", "its",
    "itself", "just", "more", "most", "not", "now", "off", "once", "only", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "she", "should", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "too", "under", "until", "very", "was", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
    "yourself", "yourselves",
    // Polish
    "aby", "ale", "bardzo", "bez", "bo", "był", "była", "było", "były", "będzie", "być", "dla",
    "gdy", "gdzie", "go", "jak", "jako", "jakie", "jaki", "jego", "jej", "jest", "już", "jeśli",
    "kiedy", "która", "które", "który", "kto", "lub", "może", "mnie", "nad", "nas", "nie", "nich",
    "nim", "oraz", "pod", "ponieważ", "przed", "przez", "przy", "się", "sobie", "są", "tak", "także",
    "tam", "tego", "tej", "ten", "też", "to", "tych", "tylko", "tym", "wiele", "więc", "wszystko",
    "zawsze", "został", "żeby",
];

/// Extract up to [`TOP_N`] keywords from `text`, best first
pub fn extract_keywords(text: &str) -> Vec<String> {
    let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

    // candidate -> (score, first seen)
    let mut scores: HashMap<String, (u32, usize)> = HashMap::new();
    let mut order = 0usize;
    let mut record = |candidate: String, weight: u32| {
        let entry = scores.entry(candidate).or_insert_with(|| {
            order += 1;
            (0, order)
        });
        entry.0 += weight;
    };

    for sentence in text.split(|c: char| matches!(c, '.' | '!' | '?' | ';' | '\n')) {
        let lowered = sentence.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= MIN_WORD_LEN && !stop_words.contains(w))
            .collect();

        for (i, word) in words.iter().enumerate() {
            record((*word).to_string(), UNIGRAM_WEIGHT);
            if i > 0 {
                record(format!("{} {}", words[i - 1], word), BIGRAM_WEIGHT);
            }
        }
    }

    let mut ranked: Vec<(String, (u32, usize))> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(TOP_N).map(|(kw, _)| kw).collect()
}

/// Keywords in the form stored on the post
pub fn format_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

/// Task payload pushed onto the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordJob {
    pub post_id: i32,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Producer side of the keyword queue
#[async_trait]
pub trait KeywordQueue: Send + Sync {
    async fn enqueue(&self, job: &KeywordJob) -> Result<(), QueueError>;
}

/// Keyword queue stored in a Redis list (LPUSH here, BRPOP in the worker)
#[derive(Clone)]
pub struct RedisKeywordQueue {
    redis: ConnectionManager,
    key: String,
}

impl RedisKeywordQueue {
    pub fn new(redis: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            redis,
            key: key.into(),
        }
    }
}

#[async_trait]
impl KeywordQueue for RedisKeywordQueue {
    async fn enqueue(&self, job: &KeywordJob) -> Result<(), QueueError> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.redis.clone();

        let depth: i64 = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        tracing::debug!(post_id = job.post_id, queue_depth = depth, "Keyword job queued");
        Ok(())
    }
}

/// Result of processing one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Keywords written to the post
    Updated,
    /// Content produced no keywords
    Empty,
    /// The post was deleted before the job ran
    PostMissing,
}

impl JobOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Updated => "updated",
            JobOutcome::Empty => "empty",
            JobOutcome::PostMissing => "post_missing",
        }
    }
}

/// Extract keywords for a job and store them, in one transaction
pub async fn process_job(pool: &PgPool, job: &KeywordJob) -> Result<JobOutcome, sqlx::Error> {
    let keywords = extract_keywords(&job.content);
    if keywords.is_empty() {
        return Ok(JobOutcome::Empty);
    }

    let mut tx = pool.begin().await?;
    let updated = post_repo::set_keywords(&mut *tx, job.post_id, &format_keywords(&keywords)).await?;
    tx.commit().await?;

    Ok(if updated {
        JobOutcome::Updated
    } else {
        JobOutcome::PostMissing
    })
}

/// Consumer side of the keyword queue
pub struct KeywordWorker {
    pool: PgPool,
    redis: ConnectionManager,
    queue_key: String,
    poll_timeout: Duration,
}

impl KeywordWorker {
    pub fn new(
        pool: PgPool,
        redis: ConnectionManager,
        queue_key: impl Into<String>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            redis,
            queue_key: queue_key.into(),
            poll_timeout,
        }
    }

    /// Pop and process jobs until `shutdown` flips to true.
    ///
    /// Shutdown is checked between pops, so a job already taken off the list is
    /// always processed.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        tracing::info!(queue = %self.queue_key, "Keyword worker started");

        while !*shutdown.borrow() {
            match self.pop().await {
                Ok(Some(payload)) => self.handle_payload(&payload).await,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to pop keyword job");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        tracing::info!("Keyword worker stopped");
    }

    async fn pop(&self) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.redis.clone();
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.queue_key)
            .arg(self.poll_timeout.as_secs().max(1))
            .query_async(&mut conn)
            .await?;

        Ok(popped.map(|(_, payload)| payload))
    }

    async fn handle_payload(&self, payload: &str) {
        let job: KeywordJob = match serde_json::from_str(payload) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed keyword job");
                metrics::record_keyword_job("malformed");
                return;
            }
        };

        match process_job(&self.pool, &job).await {
            Ok(outcome) => {
                if outcome == JobOutcome::PostMissing {
                    tracing::info!(post_id = job.post_id, "Post no longer exists, keywords skipped");
                } else {
                    tracing::debug!(post_id = job.post_id, outcome = outcome.as_str(), "Keyword job done");
                }
                metrics::record_keyword_job(outcome.as_str());
            }
            Err(e) => {
                tracing::error!(post_id = job.post_id, error = %e, "Keyword job failed");
                metrics::record_keyword_job("error");
            }
        }
    }
}
