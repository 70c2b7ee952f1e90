//! Sequential async suite runner
//!
//! Hooks and cases share one context behind an `Arc`. Cases run one at a time
//! in declaration order. `after_always` hooks run last whatever happened before.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::helpers::{E2EError, E2EResult};

type Step<C> = Box<dyn Fn(Arc<C>) -> BoxFuture<'static, E2EResult<()>> + Send + Sync>;

fn boxed<C, F, Fut>(f: F) -> Step<C>
where
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2EResult<()>> + Send + 'static,
{
    Box::new(move |ctx| f(ctx).boxed())
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub name: String,
    pub result: E2EResult<()>,
    pub elapsed: Duration,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct SuiteReport {
    pub suite: String,
    pub cases: Vec<CaseOutcome>,
    /// Failures from `before` and `after_always` hooks
    pub hook_failures: Vec<E2EError>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.hook_failures.is_empty() && self.cases.iter().all(CaseOutcome::passed)
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.cases.iter().filter(|c| !c.passed())
    }

    pub fn summary(&self) -> String {
        let passed = self.cases.iter().filter(|c| c.passed()).count();
        format!(
            "{}: {} passed, {} failed, {} hook failure(s)",
            self.suite,
            passed,
            self.cases.len() - passed,
            self.hook_failures.len()
        )
    }

    pub fn into_result(self) -> E2EResult<()> {
        if self.passed() {
            return Ok(());
        }

        let mut lines = vec![self.summary()];
        lines.extend(self.hook_failures.iter().map(|e| format!("hook: {}", e)));
        lines.extend(self.failed_cases().map(|c| match &c.result {
            Err(e) => format!("{}: {}", c.name, e),
            Ok(()) => c.name.clone(),
        }));
        Err(E2EError::SuiteFailed(lines.join("\n")))
    }
}

pub struct Suite<C> {
    name: String,
    ctx: Arc<C>,
    before: Vec<Step<C>>,
    cases: Vec<(String, Step<C>)>,
    after: Vec<Step<C>>,
}

impl<C: Send + Sync + 'static> Suite<C> {
    pub fn new(name: impl Into<String>, ctx: C) -> Self {
        Self {
            name: name.into(),
            ctx: Arc::new(ctx),
            before: Vec::new(),
            cases: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn before<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2EResult<()>> + Send + 'static,
    {
        self.before.push(boxed(hook));
        self
    }

    pub fn after_always<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2EResult<()>> + Send + 'static,
    {
        self.after.push(boxed(hook));
        self
    }

    pub fn case<F, Fut>(mut self, name: impl Into<String>, case: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2EResult<()>> + Send + 'static,
    {
        self.cases.push((name.into(), boxed(case)));
        self
    }

    /// Keep only the cases whose name satisfies `keep`. Hooks are unaffected.
    pub fn retain_cases(mut self, keep: impl Fn(&str) -> bool) -> Self {
        self.cases.retain(|(name, _)| keep(name));
        self
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn context(&self) -> &Arc<C> {
        &self.ctx
    }

    pub async fn run(self) -> SuiteReport {
        tracing::info!("Running suite {} ({} cases)", self.name, self.cases.len());

        let mut hook_failures = Vec::new();
        for hook in &self.before {
            if let Err(e) = hook(self.ctx.clone()).await {
                tracing::error!("before hook failed: {}", e);
                hook_failures.push(e);
                break;
            }
        }
        let setup_ok = hook_failures.is_empty();

        let mut cases = Vec::with_capacity(self.cases.len());
        for (name, case) in &self.cases {
            if !setup_ok {
                tracing::warn!("SKIP {} (setup failed)", name);
                cases.push(CaseOutcome {
                    name: name.clone(),
                    result: Err(E2EError::Setup("before hook failed".to_string())),
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            let started = Instant::now();
            let result = case(self.ctx.clone()).await;
            let elapsed = started.elapsed();
            match &result {
                Ok(()) => tracing::info!("PASS {} ({:?})", name, elapsed),
                Err(e) => tracing::error!("FAIL {} ({:?}): {}", name, elapsed, e),
            }
            cases.push(CaseOutcome {
                name: name.clone(),
                result,
                elapsed,
            });
        }

        for hook in &self.after {
            if let Err(e) = hook(self.ctx.clone()).await {
                tracing::error!("after hook failed: {}", e);
                hook_failures.push(e);
            }
        }

        let report = SuiteReport {
            suite: self.name,
            cases,
            hook_failures,
        };
        tracing::info!("{}", report.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Journal(Mutex<Vec<String>>);

    impl Journal {
        fn push(&self, entry: &str) {
            self.0.lock().unwrap().push(entry.to_string());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn step(entry: &'static str) -> impl Fn(Arc<Journal>) -> BoxFuture<'static, E2EResult<()>> {
        move |j| {
            async move {
                j.push(entry);
                Ok::<(), E2EError>(())
            }
            .boxed()
        }
    }

    fn failing(entry: &'static str) -> impl Fn(Arc<Journal>) -> BoxFuture<'static, E2EResult<()>> {
        move |j| {
            async move {
                j.push(entry);
                Err(E2EError::Exec(entry.to_string()))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_runs_hooks_and_cases_in_order() {
        let suite = Suite::new("ordered", Journal::default())
            .before(step("before-1"))
            .before(step("before-2"))
            .case("one", step("case-1"))
            .case("two", step("case-2"))
            .after_always(step("after"));
        let journal = suite.context().clone();

        let report = suite.run().await;

        assert!(report.passed());
        assert_eq!(
            journal.entries(),
            vec!["before-1", "before-2", "case-1", "case-2", "after"]
        );
    }

    #[tokio::test]
    async fn test_failing_case_does_not_stop_later_cases() {
        let suite = Suite::new("partial", Journal::default())
            .case("bad", failing("case-1"))
            .case("good", step("case-2"))
            .after_always(step("after"));
        let journal = suite.context().clone();

        let report = suite.run().await;

        assert!(!report.passed());
        assert_eq!(journal.entries(), vec!["case-1", "case-2", "after"]);
        let failed: Vec<_> = report.failed_cases().map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec!["bad"]);
    }

    #[tokio::test]
    async fn test_before_failure_skips_cases_but_runs_after() {
        let suite = Suite::new("broken-setup", Journal::default())
            .before(failing("before-1"))
            .before(step("before-2"))
            .case("one", step("case-1"))
            .after_always(step("after"));
        let journal = suite.context().clone();

        let report = suite.run().await;

        assert_eq!(journal.entries(), vec!["before-1", "after"]);
        assert_eq!(report.hook_failures.len(), 1);
        assert!(matches!(report.cases[0].result, Err(E2EError::Setup(_))));
    }

    #[tokio::test]
    async fn test_after_failure_fails_report() {
        let report = Suite::new("teardown", Journal::default())
            .case("one", step("case-1"))
            .after_always(failing("after"))
            .run()
            .await;

        assert!(report.cases.iter().all(CaseOutcome::passed));
        assert!(!report.passed());
        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("hook"));
    }

    #[tokio::test]
    async fn test_retain_cases() {
        let suite = Suite::new("filtered", Journal::default())
            .case("keep me", step("kept"))
            .case("drop me", step("dropped"))
            .retain_cases(|name| name.starts_with("keep"));
        assert_eq!(suite.case_names(), vec!["keep me"]);

        let journal = suite.context().clone();
        suite.run().await;
        assert_eq!(journal.entries(), vec!["kept"]);
    }

    #[test]
    fn test_summary() {
        let report = SuiteReport {
            suite: "s".to_string(),
            cases: vec![
                CaseOutcome {
                    name: "a".to_string(),
                    result: Ok(()),
                    elapsed: Duration::ZERO,
                },
                CaseOutcome {
                    name: "b".to_string(),
                    result: Err(E2EError::Exec("x".to_string())),
                    elapsed: Duration::ZERO,
                },
            ],
            hook_failures: vec![],
        };
        assert_eq!(report.summary(), "s: 1 passed, 1 failed, 0 hook failure(s)");
        let err = report.into_result().unwrap_err().to_string();
        assert!(err.contains("b: Exec failed: x"), "got {err}");
    }
}
