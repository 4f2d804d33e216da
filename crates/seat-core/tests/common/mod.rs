#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use seat_core::{
    spawn_session_with_log, AssetSnapshot, EngineScript, InMemoryAssetSource, InMemoryWorkflowEngine, LaunchParams,
    SectionConfig, SectionMap, SessionConfig, SessionHandle, SharedEventLog,
};

pub const VENUE: &str = "arena";

pub fn sections(n: usize) -> SectionMap {
    (0..n).map(|i| (format!("{}", 101 + i), SectionConfig::default())).collect()
}

pub fn params(n: usize) -> LaunchParams { LaunchParams { sections: sections(n), ..LaunchParams::default() } }

pub fn assets(has_model: bool, depths: u32, images: u32) -> AssetSnapshot {
    AssetSnapshot { has_model, depth_map_count: depths, image_count: images, ..AssetSnapshot::empty(VENUE.into()) }
}

pub struct Harness {
    pub handle: SessionHandle,
    pub engine: InMemoryWorkflowEngine,
    pub assets: InMemoryAssetSource,
    pub log: SharedEventLog,
}

pub struct HarnessBuilder {
    initial: Option<AssetSnapshot>,
    script: EngineScript,
    config: SessionConfig,
    fetch_failures: u32,
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        initial: None,
        script: EngineScript::default(),
        config: SessionConfig { poll_interval: Duration::from_secs(2), ..SessionConfig::default() },
        fetch_failures: 0,
    }
}

impl HarnessBuilder {
    pub fn with_assets(mut self, snapshot: AssetSnapshot) -> Self {
        self.initial = Some(snapshot);
        self
    }

    pub fn with_script(mut self, script: EngineScript) -> Self {
        self.script = script;
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn failing_first_fetches(mut self, n: u32) -> Self {
        self.fetch_failures = n;
        self
    }

    pub async fn mount(self) -> Harness {
        let assets = InMemoryAssetSource::new();
        if let Some(snapshot) = self.initial {
            assets.put(snapshot).await;
        }
        if self.fetch_failures > 0 {
            assets.fail_next(self.fetch_failures).await;
        }
        let engine = InMemoryWorkflowEngine::with_script(assets.clone(), self.script);
        let log = SharedEventLog::default();
        let handle = spawn_session_with_log(
            VENUE.into(),
            Arc::new(engine.clone()),
            Arc::new(assets.clone()),
            self.config,
            log.clone(),
        );
        Harness { handle, engine, assets, log }
    }
}
