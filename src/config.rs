use crate::error::{TraceError, TraceResult};
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use strum_macros::Display;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub matching: MatchParams,
    #[command(flatten)]
    pub feedback: FeedbackParams,
    #[command(flatten)]
    pub session: SessionParams,
}

/// Which evaluator runs the strokes. Chosen once per session.
#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionForm {
    Auto,
    Foreground,
    Background,
}

/// Authoritative scorer of the background evaluator.
#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatcherKind {
    Alignment,
    Coverage,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Side of the square the reference geometry is authored in.
    #[arg(long, default_value_t = 300.0)]
    pub logical_size: f32,

    // === Thresholds (logical units) ===
    #[arg(long, default_value_t = 15.0)]
    pub on_path_threshold: f32,
    #[arg(long, default_value_t = 0.70)]
    pub coverage_threshold: f32,

    // === Noise rejection ===
    #[arg(long, default_value_t = 10)]
    pub min_stroke_points: usize,
    #[arg(long, default_value_t = 40.0)]
    pub min_stroke_length: f32,

    // === Alignment scorer ===
    #[arg(long, default_value_t = 16)]
    pub alignment_samples: usize,
    #[arg(long, default_value_t = 10.0)]
    pub alignment_divisor: f32,
    #[arg(long, default_value_t = 70.0)]
    pub completion_score: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            logical_size: 300.0,
            on_path_threshold: 15.0,
            coverage_threshold: 0.70,
            min_stroke_points: 10,
            min_stroke_length: 40.0,
            alignment_samples: 16,
            alignment_divisor: 10.0,
            completion_score: 70.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackParams {
    #[arg(long, default_value_t = 150)]
    pub deviation_cooldown_ms: u64,
    #[arg(long, default_value_t = 100)]
    pub speech_delay_ms: u64,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_speech: bool,
    #[arg(long, default_value_t = 0.3)]
    pub tone_gain: f32,
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            deviation_cooldown_ms: 150,
            speech_delay_ms: 100,
            enable_speech: true,
            tone_gain: 0.3,
        }
    }
}

impl FeedbackParams {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.deviation_cooldown_ms)
    }

    pub fn speech_delay(&self) -> Duration {
        Duration::from_millis(self.speech_delay_ms)
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    /// Rendered side length of the tracing surface, in surface pixels.
    #[arg(long, default_value_t = 300.0)]
    pub surface_size: f32,
    #[arg(long, default_value_t = 2000)]
    pub transition_ms: u64,

    // === Final score weights ===
    #[arg(long, default_value_t = 0.4)]
    pub template_weight: f32,
    #[arg(long, default_value_t = 0.6)]
    pub guided_weight: f32,

    #[arg(long, value_enum, default_value_t = ExecutionForm::Auto)]
    pub execution: ExecutionForm,
    #[arg(long, value_enum, default_value_t = MatcherKind::Alignment)]
    pub background_matcher: MatcherKind,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            surface_size: 300.0,
            transition_ms: 2000,
            template_weight: 0.4,
            guided_weight: 0.6,
            execution: ExecutionForm::Auto,
            background_matcher: MatcherKind::Alignment,
        }
    }
}

impl SessionParams {
    pub fn transition_window(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TraceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TraceResult<()> {
        let m = &self.matching;
        if m.logical_size <= 0.0 || self.session.surface_size <= 0.0 {
            return Err(TraceError::Config(
                "logical_size and surface_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&m.coverage_threshold) {
            return Err(TraceError::Config(format!(
                "coverage_threshold {} outside [0, 1]",
                m.coverage_threshold
            )));
        }
        if m.alignment_samples < 2 {
            return Err(TraceError::Config(
                "alignment_samples must be at least 2".to_string(),
            ));
        }
        if m.alignment_divisor <= 0.0 {
            return Err(TraceError::Config(
                "alignment_divisor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Overlays flags the user typed on top of values loaded from a file.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident, $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(matching, logical_size);
        update_if_present!(matching, on_path_threshold);
        update_if_present!(matching, coverage_threshold);
        update_if_present!(matching, min_stroke_points);
        update_if_present!(matching, min_stroke_length);
        update_if_present!(matching, alignment_samples);
        update_if_present!(matching, alignment_divisor);
        update_if_present!(matching, completion_score);

        update_if_present!(feedback, deviation_cooldown_ms);
        update_if_present!(feedback, speech_delay_ms);
        update_if_present!(feedback, enable_speech);
        update_if_present!(feedback, tone_gain);

        update_if_present!(session, surface_size);
        update_if_present!(session, transition_ms);
        update_if_present!(session, template_weight);
        update_if_present!(session, guided_weight);
        update_if_present!(session, execution);
        update_if_present!(session, background_matcher);
    }
}
