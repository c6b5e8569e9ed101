//! 健康监控
//!
//! 周期性检查每个 agent：被超时或 panic 停用的 agent 会被重新激活，
//! 并为每个 agent 输出一行心跳日志。

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::agent::AgentRegistry;
use crate::runtime::ShutdownSignal;
use crate::telemetry;

pub struct HealthMonitor {
    registry: Arc<AgentRegistry>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    /// One inspection pass; returns how many agents were reactivated
    pub fn check(&self) -> usize {
        let mut reactivated = 0;
        for agent in self.registry.iter() {
            if !agent.is_active() {
                warn!(
                    target: telemetry::MONITOR,
                    agent = agent.id(),
                    "Agent inactive, reactivating"
                );
                agent.set_active(true);
                reactivated += 1;
            }

            // history_len 为 None 表示 agent 正在执行
            info!(
                target: telemetry::MONITOR,
                agent = agent.id(),
                rank = agent.rank(),
                active = agent.is_active(),
                history = ?agent.history_len(),
                "Heartbeat"
            );
        }
        reactivated
    }

    pub async fn run(self, mut shutdown: ShutdownSignal, interval: Duration) {
        info!(
            target: telemetry::MONITOR,
            interval_secs = interval.as_secs(),
            agents = self.registry.len(),
            "Health monitor started"
        );
        while !shutdown.sleep(interval).await {
            self.check();
        }
        info!(target: telemetry::MONITOR, "Health monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ShutdownController;
    use crate::storage::KnowledgeStore;
    use tempfile::TempDir;

    fn registry(temp: &TempDir) -> Arc<AgentRegistry> {
        let store = Arc::new(KnowledgeStore::new(temp.path().join("knowledge")));
        Arc::new(AgentRegistry::standard(store).unwrap())
    }

    #[test]
    fn test_check_reactivates_inactive_agents() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        registry.get("combat").unwrap().set_active(false);
        registry.get("builder").unwrap().set_active(false);

        let monitor = HealthMonitor::new(registry.clone());
        assert_eq!(monitor.check(), 2);
        assert!(registry.iter().all(|agent| agent.is_active()));
        assert_eq!(monitor.check(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reactivates_on_interval() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        let controller = ShutdownController::new();
        let handle = tokio::spawn(
            HealthMonitor::new(registry.clone()).run(controller.signal(), Duration::from_secs(30)),
        );

        registry.get("reviewer").unwrap().set_active(false);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(registry.get("reviewer").unwrap().is_active());

        controller.trigger();
        handle.await.unwrap();
    }
}
