use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context as _, Result};
use clap::Parser;
use sparklite::standalone::{run_job, Args, Commands, Job};
use sparklite::workload;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    // stdout carries job results, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn list_workloads() -> Result<()> {
    let mut stdout = io::stdout().lock();
    for app in workload::all() {
        writeln!(stdout, "{:<12} {}", app.name, app.about)?;
    }
    Ok(())
}

fn submit(job: Job) -> Result<()> {
    match &job.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {path}"))?;
            run_job(&job, &mut BufWriter::new(file))
        }
        None => run_job(&job, &mut io::stdout().lock()),
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    match args.command {
        Commands::Submit {
            input,
            workload,
            output,
            partitions,
            app_name,
            master,
            args,
        } => submit(Job {
            input,
            workload,
            output,
            partitions,
            app_name,
            master,
            args,
        }),
        Commands::Workloads => list_workloads(),
    }
}
