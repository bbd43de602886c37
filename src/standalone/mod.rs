use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::context::{Config, Context, DEFAULT_PARTITIONS};
use crate::utils::encode_args;
use crate::workload;

pub mod engine;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job locally and print its results
    Submit {
        /// Path or glob spec for the input files
        #[arg(short, long)]
        input: String,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Write results to this file instead of standard output
        #[arg(short, long)]
        output: Option<String>,

        /// Number of shuffle partitions
        #[arg(short, long, default_value_t = DEFAULT_PARTITIONS)]
        partitions: u32,

        /// Name the job is logged under (defaults to the workload name)
        #[arg(long)]
        app_name: Option<String>,

        /// Where the job runs
        #[arg(short, long, default_value = "local")]
        master: String,

        /// Auxiliary arguments to pass to the application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
    /// List the available workloads
    Workloads,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub workload: String,
    pub output: Option<String>,
    pub partitions: u32,
    pub app_name: Option<String>,
    pub master: String,
    pub args: Vec<String>,
}

impl Job {
    pub fn config(&self) -> Config {
        Config::default()
            .with_app_name(self.app_name.clone().unwrap_or_else(|| self.workload.clone()))
            .with_partitions(self.partitions)
            .with_master(self.master.clone())
    }
}

/// Runs `job` against a fresh context, printing into `out`.
pub fn run_job(job: &Job, out: &mut dyn Write) -> Result<()> {
    let app = workload::named(&job.workload)?;
    let ctx = Context::new(job.config())?;
    let serialized_args = encode_args(&job.args)?;

    info!(workload = app.name, input = %job.input, "job started");
    (app.run_fn)(&ctx, &job.input, serialized_args, out)?;
    out.flush()?;
    info!(workload = app.name, "job finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipelineError;

    fn job(workload: &str, input: &str) -> Job {
        Job {
            input: input.to_string(),
            workload: workload.to_string(),
            output: None,
            partitions: DEFAULT_PARTITIONS,
            app_name: None,
            master: "local".to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn submit_parses_workload_args() {
        let args = Args::parse_from([
            "sparklite",
            "submit",
            "-i",
            "u.data",
            "-w",
            "ratings",
            "-p",
            "4",
            "--",
            "--sort-movies",
        ]);
        match args.command {
            Commands::Submit {
                input,
                workload,
                partitions,
                args,
                ..
            } => {
                assert_eq!(input, "u.data");
                assert_eq!(workload, "ratings");
                assert_eq!(partitions, 4);
                assert_eq!(args, vec!["--sort-movies"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn master_flag_reaches_the_context() -> Result<()> {
        let args = Args::parse_from(["sparklite", "submit", "-i", "u.data", "-w", "ratings", "-m", "yarn"]);
        let Commands::Submit { master, .. } = args.command else {
            panic!("expected submit");
        };
        assert_eq!(master, "yarn");

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("u.data");
        std::fs::write(&input, "1 100 5 0\n")?;
        let mut remote = job("ratings", input.to_str().unwrap());
        remote.master = master;
        let err = run_job(&remote, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn app_name_defaults_to_workload() {
        assert_eq!(job("wc", "Book.txt").config().app_name, "wc");
    }

    #[test]
    fn unknown_workload_fails_before_reading() {
        let err = run_job(&job("nope", "/does/not/matter"), &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownWorkload(_))
        ));
    }

    #[test]
    fn empty_input_prints_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("u.data");
        std::fs::write(&input, "")?;

        let mut out = Vec::<u8>::new();
        run_job(&job("ratings", input.to_str().unwrap()), &mut out)?;
        assert!(out.is_empty());
        Ok(())
    }
}
