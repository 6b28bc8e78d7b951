use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use colored::Colorize;

use crate::{
    cli::jobs::Jobs,
    listing::{list_targets, Listing},
    makefile::{ResolveOptions, Resolver},
};

pub mod jobs;

const DEFAULT_MAKEFILE: &str = "Makefile";

/// List the targets declared in makefiles.
///
/// Targets of included files are listed together with the targets of the
/// file that includes them. Special targets such as `.PHONY` are hidden.
///
/// Example: lsmake Makefile1 Makefile2
#[derive(Parser, Debug)]
#[clap(name = "lsmake", styles = cli_styles::CLAP_STYLES, verbatim_doc_comment)]
pub struct Cli {
    /// Makefiles to list, `Makefile` if none is given
    makefiles: Vec<PathBuf>,

    /// Only show target names
    #[clap(short, long)]
    names_only: bool,

    /// Also show special targets (`.PHONY`, `.SUFFIXES`, ...)
    #[clap(short, long)]
    all: bool,

    /// Do not follow `include` directives
    #[clap(long)]
    no_includes: bool,

    /// How many makefiles to read at once: `auto` or a number
    #[clap(short, long, default_value_t = Jobs::Auto)]
    jobs: Jobs,

    /// Output format
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(ValueEnum)]
pub enum OutputFormat {
    Json,
}

impl Cli {
    fn roots(&self) -> Vec<PathBuf> {
        if self.makefiles.is_empty() {
            vec![PathBuf::from(DEFAULT_MAKEFILE)]
        } else {
            self.makefiles.clone()
        }
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(ResolveOptions {
            follow_includes: !self.no_includes,
            keep_special: self.all,
        })
    }
}

pub fn main(args: &Cli) -> anyhow::Result<ExitCode> {
    let roots = args.roots();
    let jobs = args.jobs.for_roots(roots.len());

    // resolution itself runs on the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .max_blocking_threads(jobs)
        .build()?;
    let listing = runtime.block_on(list_targets(roots, args.resolver(), jobs));

    match args.format {
        Some(OutputFormat::Json) => print_json(&listing)?,
        None if args.names_only => print_names(&listing),
        None => print_listing(&listing),
    }

    for failure in &listing.failures {
        eprintln!("{} {failure}", "Error:".red().bold());
    }

    Ok(if listing.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_listing(listing: &Listing) {
    if listing.targets.is_empty() {
        return;
    }

    println!("{}", "Targets in Makefiles:".bold());
    for (makefile, targets) in &listing.targets {
        println!("{}", format!("{}:", makefile.display()).green().bold());
        for target in targets {
            println!("{}", target.cyan());
        }
        println!();
    }
}

fn print_names(listing: &Listing) {
    for target in listing.targets.values().flatten() {
        println!("{target}");
    }
}

fn print_json(listing: &Listing) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct MakefileEntry<'a> {
        file: String,
        targets: &'a [String],
    }

    let entries = listing
        .targets
        .iter()
        .map(|(makefile, targets)| MakefileEntry {
            file: makefile.display().to_string(),
            targets,
        })
        .collect::<Vec<_>>();

    let json = serde_json::to_string(&entries)?;
    println!("{}", json);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["lsmake"]).unwrap();
        assert_eq!(cli.roots(), [PathBuf::from("Makefile")]);
        assert_eq!(cli.resolver(), Resolver::default());
        assert_eq!(cli.jobs, Jobs::Auto);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "lsmake", "-a", "--no-includes", "-j", "2", "-f", "json", "a.mk", "b.mk",
        ])
        .unwrap();
        assert_eq!(cli.roots(), [PathBuf::from("a.mk"), PathBuf::from("b.mk")]);
        assert_eq!(
            cli.resolver().options(),
            ResolveOptions {
                follow_includes: false,
                keep_special: true,
            }
        );
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.jobs.for_roots(cli.roots().len()), 2);
    }

    #[test]
    fn invalid_jobs() {
        let err = Cli::try_parse_from(["lsmake", "-j", "0"]).unwrap_err();
        assert!(err.to_string().contains("how many makefiles"));
        assert!(Cli::try_parse_from(["lsmake", "--jobs", "cpu"]).is_err());
    }

    #[test]
    fn main_reports_failures_through_the_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Makefile");
        std::fs::write(&good, "all:\n").unwrap();

        let cli = Cli::try_parse_from([
            "lsmake".into(),
            good.clone().into_os_string(),
        ])
        .unwrap();
        assert_eq!(main(&cli).unwrap(), ExitCode::SUCCESS);

        let cli = Cli::try_parse_from([
            "lsmake".into(),
            good.into_os_string(),
            dir.path().join("missing.mk").into_os_string(),
        ])
        .unwrap();
        assert_eq!(main(&cli).unwrap(), ExitCode::FAILURE);
    }
}
