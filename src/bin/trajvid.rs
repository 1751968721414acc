use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use trajvid::{
    BatchExporter, BatchSummary, ExportOptions, FfmpegLogLevel, OperationType, ProgressCallback,
    ProgressInfo, TrajvidError,
};

const CLI_AFTER_HELP: &str = "Examples:\n  trajvid ./datasets ./videos\n\nEvery .hdf5 file in DATASET_DIR is converted to one MP4 per trajectory,\nnamed {file-stem}_{trajectory-id}.mp4, in OUTPUT_DIR.";

#[derive(Debug, Parser)]
#[command(
    name = "trajvid",
    version,
    about = "Export trajectory image streams from HDF5 datasets as MP4 videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory containing the HDF5 dataset files.
    dataset_dir: PathBuf,

    /// Directory where the exported videos will be written.
    output_dir: PathBuf,
}

/// Prints one line per dataset file and drives an indicatif bar over the
/// trajectories of the current file.
#[derive(Default)]
struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    fn trajectory_bar(total: Option<u64>) -> ProgressBar {
        let bar = match total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) =
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} trajectories")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let Ok(mut bar) = self.bar.lock() else {
            return;
        };

        match info.operation {
            OperationType::FileExport => {
                if let Some(previous) = bar.take() {
                    previous.finish_and_clear();
                }
                if let Some(file) = &info.file {
                    println!(
                        "{} {}",
                        "Processing file:".cyan().bold(),
                        file.display()
                    );
                }
            }
            OperationType::TrajectoryExport => {
                let bar = bar.get_or_insert_with(|| Self::trajectory_bar(info.total));
                bar.set_position(info.current);
            }
            _ => {}
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(bar) = bar.take() {
                bar.finish_and_clear();
            }
        }
    }
}

fn run(cli: Cli) -> Result<BatchSummary, TrajvidError> {
    // The MPEG-4 encoder warns about every B-frame decision; keep stderr
    // usable for the batch status lines.
    trajvid::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let options = ExportOptions::new().with_progress(Arc::new(TerminalProgress::default()));
    BatchExporter::new(cli.dataset_dir, cli.output_dir)
        .with_options(options)
        .run()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(summary) => {
            for (path, error) in &summary.failures {
                eprintln!("{} {}: {error}", "failed:".red().bold(), path.display());
            }
            let mut status = format!(
                "{} video(s) written from {} file(s)",
                summary.videos_written, summary.files_processed,
            );
            if summary.files_failed > 0 {
                status.push_str(&format!(", {} file(s) skipped", summary.files_failed));
            }
            if summary.trajectories_failed > 0 {
                status.push_str(&format!(
                    ", {} trajectory(ies) abandoned",
                    summary.trajectories_failed
                ));
            }
            println!("{} {}", "done:".green().bold(), status.green());
        }
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
