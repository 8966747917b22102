//! The orchestrator state machine.
//!
//! States: Init → Planning → Iterating(n) → Finalizing → Archived, with
//! Error reachable from any non-terminal state. Each iteration is fully
//! persisted before the next begins; the state file is archived
//! unconditionally at the end, success or failure, releasing the
//! single-active-task lock.

use crate::collect::{Collector, PageCapture};
use crate::config::ResearchConfig;
use crate::judge::CompletionJudge;
use crate::llm::LLMClient;
use crate::notify::Notifier;
use crate::parse::{self, Decision};
use crate::report;
use crate::research::retry;
use crate::state::{self, TaskLease, TaskLog, TaskStore};
use crate::summarize::Summarizer;
use crate::types::{AppError, QueryResult, ResearchTask, Result, TaskStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs one research task end to end.
///
/// Queries within a batch are processed sequentially to bound load on
/// the generation and search services; only page fetches within one
/// query run concurrently.
pub struct Orchestrator {
    llm: Arc<dyn LLMClient>,
    collector: Collector,
    summarizer: Summarizer,
    judge: CompletionJudge,
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
    config: ResearchConfig,
}

impl Orchestrator {
    /// Build an orchestrator and its components from configuration.
    pub fn new(
        config: ResearchConfig,
        llm: Arc<dyn LLMClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            collector: Collector::new(&config)?,
            summarizer: Summarizer::new(llm.clone(), config.summary_words),
            judge: CompletionJudge::new(llm.clone()),
            store: TaskStore::new(config.data_dir.clone())?,
            llm,
            notifier,
            config,
        })
    }

    /// The store this orchestrator persists into.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run a research task for `query` to completion.
    ///
    /// Rejects an empty query and rejects starting while another task
    /// holds the active slot. The state file is archived before this
    /// returns, on every path.
    pub async fn run(
        &self,
        user_id: &str,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<ResearchTask> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query is empty".to_string()));
        }

        let lease = self.store.acquire()?;
        let outcome = self.run_locked(user_id, query, &lease, cancel).await;

        // Archived unconditionally, success or failure.
        match lease.archive() {
            Ok(path) => tracing::info!(archived = %path.display(), "task state archived"),
            Err(e) => tracing::error!(error = %e, "failed to archive task state"),
        }

        outcome
    }

    async fn run_locked(
        &self,
        user_id: &str,
        query: &str,
        lease: &TaskLease,
        cancel: CancellationToken,
    ) -> Result<ResearchTask> {
        let base_name = state::slugify(query);
        let mut log = TaskLog::create(self.store.unique_path(&base_name, "log"))?;
        log.info(&format!("research task started: {query}"));
        self.notifier.notify("Starting research task...").await;

        let mut task = match self.plan(user_id, query, base_name, lease, &mut log).await {
            Ok(task) => task,
            Err(e) => {
                self.fail(None, lease, &mut log, &e).await;
                return Err(e);
            }
        };

        if let Err(e) = self.iterate(&mut task, lease, &mut log, &cancel).await {
            self.fail(Some(&mut task), lease, &mut log, &e).await;
            return Err(e);
        }

        if let Err(e) = self.finalize(&mut task, lease, &mut log).await {
            self.fail(Some(&mut task), lease, &mut log, &e).await;
            return Err(e);
        }

        Ok(task)
    }

    /// Planning: generate the plan and the first query batch, persist.
    async fn plan(
        &self,
        user_id: &str,
        query: &str,
        base_name: String,
        lease: &TaskLease,
        log: &mut TaskLog,
    ) -> Result<ResearchTask> {
        let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let plan_prompt = format!(
            "Current date: {date}\n\
             Analyze and expand the user's input into a clear research plan with steps:\n\
             \"{query}\"\n\
             Generate the plan as a numbered list (e.g., \"1. Do X\", \"2. Do Y\"); \
             the last step must be \"summarize\".\n\
             If the query implies a need for current data, prioritize recent sources."
        );
        let plan = self.llm.generate(&plan_prompt).await?.trim().to_string();
        log.info(&format!("plan generated:\n{plan}"));

        let mut task = ResearchTask::new(user_id, query, plan, base_name);

        let batch_prompt = format!(
            "Current date: {date}\n\
             Research task: \"{query}\"\n\
             Plan:\n{plan}\n\
             Generate up to {max} concise web search queries covering the first steps \
             of the plan.\n\
             Return only a JSON array of query strings, no explanations.",
            plan = task.plan,
            max = self.config.max_queries_per_batch,
        );
        task.next_queries = self.generate_batch(&batch_prompt, log).await?;
        lease.save(&task)?;

        Ok(task)
    }

    /// Iterating(n) for n = 1..=max_iterations.
    async fn iterate(
        &self,
        task: &mut ResearchTask,
        lease: &TaskLease,
        log: &mut TaskLog,
        cancel: &CancellationToken,
    ) -> Result<()> {
        for n in 1..=self.config.max_iterations {
            if cancel.is_cancelled() {
                log.info(&format!("iteration {n}: cancelled, stopping"));
                self.notifier.notify("Research cancelled.").await;
                break;
            }

            let queries = task.next_queries.clone();
            if queries.is_empty() {
                log.info(&format!("iteration {n}: no queries generated"));
                break;
            }

            log.info(&format!("iteration {n}: searching {} queries", queries.len()));
            self.notifier
                .notify(&format!("Iteration {n}: searching {} queries...", queries.len()))
                .await;

            let mut results = Vec::new();
            for query in &queries {
                log.info(&format!("searching: \"{query}\""));
                let captures = self.collect_query(query, log).await?;
                if captures.is_empty() {
                    log.warn(&format!("no results for query: {query}"));
                    continue;
                }
                for capture in captures {
                    let summary = self
                        .summarizer
                        .summarize_page(query, &capture.content)
                        .await?;
                    task.used_urls.push(capture.url.clone());
                    results.push(QueryResult {
                        query: query.clone(),
                        url: capture.url,
                        title: capture.title,
                        summary,
                    });
                }
            }

            if results.is_empty() {
                log.error("no valid results in batch");
                return Err(AppError::NoResults(n));
            }

            let summary = self.summarizer.summarize_batch(&results).await?;
            task.append_iteration(results, summary);
            lease.save(task)?;

            let (decision, raw) = self.judge.judge(task).await?;
            task.completion_status_text = Some(raw);
            match decision {
                Decision::Complete => {
                    log.info(&format!("iteration {n}: judged complete"));
                    break;
                }
                Decision::Continue if n == self.config.max_iterations => {
                    log.info("max iterations reached");
                    self.notifier.notify("Max iterations reached.").await;
                    break;
                }
                Decision::Continue => {
                    let iterations_json =
                        serde_json::to_string_pretty(&task.iterations).unwrap_or_default();
                    let next_prompt = format!(
                        "Current date: {date}\n\
                         Research task: \"{query}\"\n\
                         Plan:\n{plan}\n\
                         Rounds and results so far:\n{iterations_json}\n\
                         Generate up to {max} concise web search queries focusing on \
                         missing data.\n\
                         Return only a JSON array of query strings, no explanations. \
                         Return [] if nothing is missing.",
                        date = task.created_date,
                        query = task.initial_query,
                        plan = task.plan,
                        max = self.config.max_queries_per_batch,
                    );
                    task.next_queries = self.generate_batch(&next_prompt, log).await?;
                    lease.save(task)?;
                }
            }
        }

        Ok(())
    }

    /// Finalizing: whole-task summary, conclusion, report artifact.
    async fn finalize(
        &self,
        task: &mut ResearchTask,
        lease: &TaskLease,
        log: &mut TaskLog,
    ) -> Result<()> {
        self.notifier.notify("Making conclusion...").await;

        let final_summary = self
            .summarizer
            .summarize_task(&task.initial_query, &task.plan, &task.iterations)
            .await?;
        let conclusion = self
            .summarizer
            .conclude(
                &task.created_date,
                &task.initial_query,
                &task.plan,
                &task.iterations,
                &final_summary,
            )
            .await?;

        task.final_summary = Some(final_summary);
        task.conclusion = Some(conclusion);
        task.status = TaskStatus::Complete;
        lease.save(task)?;

        let report_path = report::write(&self.store, task)?;
        log.info(&format!("report written: {}", report_path.display()));
        self.notifier.notify("Research complete.").await;
        self.notifier
            .deliver_file(&report_path, "Research report")
            .await;

        Ok(())
    }

    /// Error state: record the failure, notify with the diagnostic log
    /// attached. Archival happens in the caller, unconditionally.
    async fn fail(
        &self,
        task: Option<&mut ResearchTask>,
        lease: &TaskLease,
        log: &mut TaskLog,
        error: &AppError,
    ) {
        log.error(&format!("fatal error: {error}"));
        if let Some(task) = task {
            task.status = TaskStatus::Error;
            if let Err(e) = lease.save(task) {
                log.error(&format!("failed to persist error state: {e}"));
            }
        }
        self.notifier
            .notify(&format!("Error during research: {error}"))
            .await;
        self.notifier.deliver_file(log.path(), "Research log").await;
    }

    /// Generate a query batch via the tiered parser, logging the
    /// winning strategy.
    async fn generate_batch(&self, prompt: &str, log: &mut TaskLog) -> Result<Vec<String>> {
        let raw = self.llm.generate(prompt).await?;
        let outcome = parse::parse_query_list(&raw, self.config.max_queries_per_batch);
        let strategy = outcome.strategy();
        let queries = outcome.into_queries();
        log.info(&format!(
            "query batch parsed via {strategy}: {} queries",
            queries.len()
        ));
        Ok(queries)
    }

    /// Collect pages for one query, optionally retrying an empty result
    /// through the query-refinement strategy.
    async fn collect_query(&self, query: &str, log: &mut TaskLog) -> Result<Vec<PageCapture>> {
        if !self.config.refine_empty_queries {
            return self.collector.collect(query).await;
        }

        let collector = &self.collector;
        let llm = &self.llm;
        let captures = retry::attempt(
            query.to_string(),
            self.config.refine_attempts,
            |q| async move {
                let captures = collector.collect(&q).await?;
                Ok(if captures.is_empty() {
                    None
                } else {
                    Some(captures)
                })
            },
            |q| async move {
                let refine_prompt = format!(
                    "The web search query \"{q}\" yielded no results.\n\
                     Generate a refined query addressing the same information need \
                     (max 10 words) in quotes."
                );
                let raw = llm.generate(&refine_prompt).await?;
                let refined = parse::parse_quoted_query(&raw);
                tracing::info!(original = %q, refined = %refined, "query refined");
                Ok(refined)
            },
        )
        .await?;

        if captures.is_none() {
            log.warn(&format!("query exhausted refinement attempts: {query}"));
        }
        Ok(captures.unwrap_or_default())
    }
}
