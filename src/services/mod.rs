mod health;

pub use health::ServiceHealth;

use crate::config::Config;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// How long `stop_all` waits for each task of a service
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Core service trait that all services must implement
#[async_trait]
pub trait Service: Send + Sync {
    /// Unique service identifier
    fn name(&self) -> &'static str;

    /// Service priority (lower = starts earlier, stops later)
    fn priority(&self) -> i32 {
        100
    }

    /// Services this service depends on
    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Check if service is enabled in configuration
    fn is_enabled(&self, _config: &Config) -> bool {
        true
    }

    async fn initialize(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Spawn the service's tasks; they must exit once `shutdown` is notified
    async fn start(&mut self, shutdown: Arc<Notify>) -> Result<Vec<JoinHandle<()>>, String>;

    async fn stop(&mut self) -> Result<(), String> {
        Ok(())
    }

    async fn health(&self) -> ServiceHealth {
        ServiceHealth::Healthy
    }
}

pub struct ServiceManager {
    services: HashMap<&'static str, Box<dyn Service>>,
    handles: HashMap<&'static str, Vec<JoinHandle<()>>>,
    started: Vec<&'static str>,
    shutdown: Arc<Notify>,
    config: Config,
}

impl ServiceManager {
    pub fn new(config: Config) -> Self {
        Self {
            services: HashMap::new(),
            handles: HashMap::new(),
            started: Vec::new(),
            shutdown: Arc::new(Notify::new()),
            config,
        }
    }

    pub fn register(&mut self, service: Box<dyn Service>) {
        let name = service.name();
        self.services.insert(name, service);
    }

    /// Start all enabled services in dependency and priority order
    pub async fn start_all(&mut self) -> Result<(), String> {
        logger::info(LogTag::System, "Starting all services...");

        let mut enabled_services: Vec<&'static str> = self
            .services
            .iter()
            .filter(|(_, service)| service.is_enabled(&self.config))
            .map(|(name, _)| *name)
            .collect();
        enabled_services.sort();

        let ordered = self.resolve_startup_order(&enabled_services)?;
        logger::debug(
            LogTag::System,
            &format!("Service startup order: {:?}", ordered),
        );

        for service_name in ordered {
            if let Some(service) = self.services.get_mut(service_name) {
                service
                    .initialize()
                    .await
                    .map_err(|e| format!("{} failed to initialize: {}", service_name, e))?;

                let handles = service
                    .start(self.shutdown.clone())
                    .await
                    .map_err(|e| format!("{} failed to start: {}", service_name, e))?;
                self.handles.insert(service_name, handles);
                self.started.push(service_name);

                logger::info(LogTag::System, &format!("Service started: {}", service_name));
            }
        }

        Ok(())
    }

    /// Signal shutdown and stop services in reverse startup order
    pub async fn stop_all(&mut self) {
        logger::info(LogTag::System, "Stopping all services...");
        self.shutdown.notify_waiters();

        while let Some(service_name) = self.started.pop() {
            if let Some(service) = self.services.get_mut(service_name) {
                if let Err(e) = service.stop().await {
                    logger::warning(
                        LogTag::System,
                        &format!("Service stop error for {}: {}", service_name, e),
                    );
                }
            }

            for handle in self.handles.remove(service_name).unwrap_or_default() {
                if tokio::time::timeout(STOP_JOIN_TIMEOUT, handle).await.is_err() {
                    logger::warning(
                        LogTag::System,
                        &format!("{} did not stop within {:?}", service_name, STOP_JOIN_TIMEOUT),
                    );
                }
            }

            logger::info(LogTag::System, &format!("Service stopped: {}", service_name));
        }
    }

    /// Dependencies first, then by priority among independent services
    fn resolve_startup_order(&self, services: &[&'static str]) -> Result<Vec<&'static str>, String> {
        fn visit(
            name: &'static str,
            services: &HashMap<&'static str, Box<dyn Service>>,
            ordered: &mut Vec<&'static str>,
            visited: &mut HashSet<&'static str>,
            visiting: &mut HashSet<&'static str>,
        ) -> Result<(), String> {
            if visited.contains(name) {
                return Ok(());
            }
            if !visiting.insert(name) {
                return Err(format!("Circular dependency detected for service: {}", name));
            }

            let service = services
                .get(name)
                .ok_or_else(|| format!("Unknown service dependency: {}", name))?;
            let mut deps = service.dependencies();
            deps.sort_by_key(|d| services.get(d).map(|s| s.priority()).unwrap_or(100));
            for dep in deps {
                visit(dep, services, ordered, visited, visiting)?;
            }

            visiting.remove(name);
            visited.insert(name);
            ordered.push(name);
            Ok(())
        }

        let mut roots = services.to_vec();
        roots.sort_by_key(|name| self.services.get(name).map(|s| s.priority()).unwrap_or(100));

        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();
        for name in roots {
            visit(name, &self.services, &mut ordered, &mut visited, &mut visiting)?;
        }
        Ok(ordered)
    }

    pub async fn get_health(&self) -> HashMap<&'static str, ServiceHealth> {
        let mut health = HashMap::new();
        for (name, service) in &self.services {
            health.insert(*name, service.health().await);
        }
        health
    }
}
