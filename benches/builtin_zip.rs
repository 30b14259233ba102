// benches/builtin_zip.rs
//
// Times the builtin backend against a synthetic tree, and the external tool
// too when one is discovered. Set BATCHZIP_BENCH_DATASET to use a real folder.
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use batchzip::backend::{discovery, BuiltinZip, Compressor, ExternalTool};
use tempfile::tempdir;

const DIRS: usize = 20;
const FILES_PER_DIR: usize = 50;
const FILE_SIZE: usize = 16 * 1024;
const RUNS: u32 = 3;

fn make_dataset(root: &Path) -> std::io::Result<PathBuf> {
    let dataset = root.join("dataset");
    for d in 0..DIRS {
        let dir = dataset.join(format!("dir_{d:02}"));
        fs::create_dir_all(&dir)?;
        for f in 0..FILES_PER_DIR {
            let mut file = File::create(dir.join(format!("file_{f:03}.txt")))?;
            // Compressible, but not trivially so.
            let line = format!("row {d} {f} lorem ipsum dolor sit amet {}\n", d * f);
            let mut written = 0;
            while written < FILE_SIZE {
                file.write_all(line.as_bytes())?;
                written += line.len();
            }
        }
    }
    Ok(dataset)
}

fn time_backend(name: &str, backend: &dyn Compressor, source: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut total = Duration::ZERO;
    let mut size = 0;
    for run in 0..RUNS {
        let dest = out_dir.join(format!("{name}_{run}.zip"));
        let start = Instant::now();
        backend.build(source, &dest)?;
        total += start.elapsed();
        size = fs::metadata(&dest)?.len();
    }
    println!(
        "{:<10} avg {:>8.1?} | archive {:.2} MiB",
        name,
        total / RUNS,
        size as f64 / 1_048_576.0
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let dataset = match std::env::var_os("BATCHZIP_BENCH_DATASET") {
        Some(path) => PathBuf::from(path),
        None => make_dataset(work.path())?,
    };
    println!("--- builtin vs external ZIP ({}) ---", dataset.display());

    time_backend("builtin", &BuiltinZip, &dataset, work.path())?;
    match discovery::discover() {
        Some(tool) => time_backend("external", &ExternalTool::new(tool), &dataset, work.path())?,
        None => println!("external  skipped (no 7-Zip found)"),
    }
    Ok(())
}
