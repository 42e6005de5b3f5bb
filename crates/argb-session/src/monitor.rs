//! メモリ使用量モニタ
//!
//! ライトのプログラムを送り続けながらファームウェアの `StackMeasurement` を集め、
//! 計測地点ごとの最小値・最大値をまとめるデリゲート。
//!
//! - 準備完了でプログラム（SetLight 群 + commit）を送る
//! - デバイスが `too_short` を報告したらプログラムを再送する
//! - 目標数の計測値が集まったら停止する

use std::collections::BTreeMap;

use argb_proto::{Ahds, LogCode, Response, Rgb, SetLightCommand, StackReport};
use serde::Serialize;

use crate::delegate::{Delegate, DelegateResult};
use crate::session::{Outbox, SessionReport};

/// 1 フィールドの値域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: u16,
    pub max: u16,
}

/// 計測地点ごとの集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackSummary {
    pub id: u32,
    pub samples: usize,
    pub fields: Vec<FieldRange>,
}

/// `StackMeasurement` を集めるデリゲート
pub struct StackMonitor {
    program: Vec<SetLightCommand>,
    commit_delta: u32,
    /// この数の計測値が集まったら停止する
    target: usize,
    /// この id の Log を受け取ったらプログラムを再送する
    resend_on: u32,
    measurements: Vec<StackReport>,
    resends: usize,
    summary: Vec<StackSummary>,
}

impl StackMonitor {
    pub fn new(program: Vec<SetLightCommand>, commit_delta: u32, target: usize) -> Self {
        StackMonitor {
            program,
            commit_delta,
            target,
            resend_on: LogCode::TooShort as u32,
            measurements: Vec::new(),
            resends: 0,
            summary: Vec::new(),
        }
    }

    /// 3 本のライトで 19 LED を使う標準プログラム
    pub fn default_program() -> Vec<SetLightCommand> {
        let ahds = Ahds::new(5, 5, 5, 5);
        vec![
            SetLightCommand::new(0, 0, 6, Rgb::new(255, 255, 255), Rgb::new(0, 0, 255), ahds),
            SetLightCommand::new(1, 6, 12, Rgb::new(255, 0, 0), Rgb::new(0, 0, 255), ahds)
                .with_alt_colors(Rgb::new(0, 255, 0), Rgb::new(0, 255, 255)),
            SetLightCommand::new(2, 12, 19, Rgb::new(255, 0, 0), Rgb::new(0, 255, 255), ahds)
                .with_alt_colors(Rgb::new(255, 255, 0), Rgb::new(0, 0, 255)),
        ]
    }

    pub fn with_resend_on(mut self, log_id: u32) -> Self {
        self.resend_on = log_id;
        self
    }

    pub fn measurements(&self) -> &[StackReport] {
        &self.measurements
    }

    pub fn resends(&self) -> usize {
        self.resends
    }

    /// `completed` 後に確定する集計（id 昇順）
    pub fn summary(&self) -> &[StackSummary] {
        &self.summary
    }

    fn send_program(&self, outbox: &mut Outbox<'_>) -> DelegateResult {
        for light in &self.program {
            tracing::debug!(id = light.id, start = light.start, end = light.end, "set_light");
            outbox.set_light(*light)?;
        }
        outbox.commit(self.commit_delta)?;
        Ok(())
    }

    fn summarize(&self) -> Vec<StackSummary> {
        let mut by_id: BTreeMap<u32, (usize, Vec<FieldRange>)> = BTreeMap::new();
        for report in &self.measurements {
            let entry = by_id.entry(report.id).or_insert_with(|| {
                let fields = report
                    .fields()
                    .iter()
                    .map(|&(field, value)| FieldRange {
                        field,
                        min: value,
                        max: value,
                    })
                    .collect();
                (0, fields)
            });
            entry.0 += 1;
            for (range, (_, value)) in entry.1.iter_mut().zip(report.fields()) {
                range.min = range.min.min(value);
                range.max = range.max.max(value);
            }
        }
        by_id
            .into_iter()
            .map(|(id, (samples, fields))| StackSummary {
                id,
                samples,
                fields,
            })
            .collect()
    }
}

impl Default for StackMonitor {
    fn default() -> Self {
        Self::new(Self::default_program(), 3000, 100)
    }
}

impl Delegate for StackMonitor {
    fn ready(&mut self, outbox: &mut Outbox<'_>) -> DelegateResult {
        tracing::info!(lights = self.program.len(), "sending light program");
        self.send_program(outbox)
    }

    fn process(&mut self, outbox: &mut Outbox<'_>, response: &Response) -> DelegateResult<bool> {
        if let Some(measurement) = response.stack_measurement() {
            self.measurements.push(StackReport::from(measurement));
        } else if response.log_id() == Some(self.resend_on) {
            tracing::info!(resends = self.resends + 1, "device reported error, resending program");
            self.resends += 1;
            self.send_program(outbox)?;
        } else {
            tracing::info!(response = ?response, "response");
        }
        Ok(self.measurements.len() >= self.target)
    }

    fn completed(&mut self, report: &SessionReport) {
        self.summary = self.summarize();
        tracing::info!(
            reason = %report.reason,
            measurements = self.measurements.len(),
            "monitor completed"
        );
        for summary in &self.summary {
            for range in &summary.fields {
                tracing::info!(
                    id = summary.id,
                    field = range.field,
                    min = range.min,
                    max = range.max,
                    "stack usage"
                );
            }
        }
    }
}
