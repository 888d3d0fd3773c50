use anyhow::{Result, ensure};
use clap::{Parser, ValueEnum};

use crate::battery::BatteryConfig;

/// Which containers to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// SequenceBuffer only
    Buffer,
    /// std::vec::Vec only
    Std,
    /// Both, side by side
    Both,
}

impl Target {
    pub fn includes_buffer(self) -> bool {
        matches!(self, Target::Buffer | Target::Both)
    }

    pub fn includes_std(self) -> bool {
        matches!(self, Target::Std | Target::Both)
    }
}

#[derive(Parser, Debug)]
#[command(name = "seqbench")]
#[command(version, about = "Benchmark SequenceBuffer against std::vec::Vec", long_about = None)]
pub struct Cli {
    /// Element count for the bulk categories
    #[arg(short = 'n', long, env = "SEQBENCH_ELEMENTS", default_value_t = 5_000_000)]
    pub elements: usize,

    /// Element count for the front insert/erase stress categories
    #[arg(short = 'm', long, env = "SEQBENCH_STRESS_ELEMENTS", default_value_t = 50_000)]
    pub stress_elements: usize,

    /// Seed for the random read/write indices
    #[arg(long, env = "SEQBENCH_SEED", default_value_t = 123_456_789)]
    pub seed: u64,

    /// Containers to benchmark
    #[arg(long, value_enum, default_value_t = Target::Both)]
    pub target: Target,

    /// Runs per category; the fastest is reported
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Set verbose level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validated battery settings.
    pub fn battery_config(&self) -> Result<BatteryConfig> {
        ensure!(self.elements > 0, "--elements must be greater than zero");
        ensure!(self.stress_elements > 0, "--stress-elements must be greater than zero");
        ensure!(self.repeat > 0, "--repeat must be greater than zero");
        Ok(BatteryConfig {
            elements: self.elements,
            stress_elements: self.stress_elements,
            seed: self.seed,
            repeat: self.repeat,
        })
    }
}
