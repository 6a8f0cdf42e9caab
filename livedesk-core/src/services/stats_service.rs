// src/services/stats_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures_util::future::try_join;
use tracing::debug;

use livedesk_common::models::{LifecycleStage, SessionWindow, Snapshot, VisitorFilter};
use livedesk_common::traits::LivechatRepository;

use crate::Error;
use crate::codec::{DateSelector, LifecycleSelector};
use crate::config::StatsConfig;
use crate::render::StatsReport;
use crate::stats::{self, dates};

pub struct StatsService {
    repo: Arc<dyn LivechatRepository>,
    config: StatsConfig,
}

impl StatsService {
    pub fn new(repo: Arc<dyn LivechatRepository>, config: StatsConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Snapshot for one window without any comparison.
    pub async fn snapshot(
        &self,
        stage: Option<LifecycleStage>,
        window: SessionWindow,
    ) -> Result<Snapshot, Error> {
        // the store narrows by stage and session start; the stages do the rest
        let filter = VisitorFilter {
            lifecycle_stage: stage,
            session_window: Some(window),
            ..Default::default()
        };
        let records = self.repo.list(&filter).await?;
        debug!("Computing stats over {} candidate records", records.len());
        Ok(stats::compute(&records, stage, &window, &self.config))
    }

    /// Snapshot for `current`, diffed against `previous` when given.
    pub async fn snapshot_with_previous(
        &self,
        stage: Option<LifecycleStage>,
        current: SessionWindow,
        previous: Option<SessionWindow>,
    ) -> Result<Snapshot, Error> {
        match previous {
            Some(previous) => {
                let (now, before) = try_join(
                    self.snapshot(stage, current),
                    self.snapshot(stage, previous),
                )
                .await?;
                Ok(stats::diff(now, &before))
            }
            None => self.snapshot(stage, current).await,
        }
    }

    /// `compute_stats(stage, from, to)`: bounded windows are compared with the
    /// preceding window of identical length.
    pub async fn compute_stats(
        &self,
        stage: Option<LifecycleStage>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Snapshot, Error> {
        let window = SessionWindow { from, to };
        self.snapshot_with_previous(stage, window, window.previous())
            .await
    }

    /// Report for a lifecycle and date selection, resolved in `tz`.
    pub async fn report(
        &self,
        lifecycle: LifecycleSelector,
        date: DateSelector,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Result<StatsReport, Error> {
        let windows = dates::resolve(date, now, tz)?;
        let snapshot = self
            .snapshot_with_previous(lifecycle.stage(), windows.current, windows.previous)
            .await?;

        Ok(StatsReport {
            lifecycle,
            date,
            snapshot,
            funnel_order: stats::funnel_keys(&self.config),
            average_order: stats::average_keys(),
            list_order: stats::list_keys(&self.config),
            top_n: self.config.top_n,
            page: 0,
        })
    }
}
