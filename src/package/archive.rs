//! Zip writing shared by the in-process strategies

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{AssemblyPlan, ContainerEntry};

/// How the archive is laid out
#[derive(Debug, Clone, Copy)]
pub(super) struct ArchiveLayout {
    pub compression: CompressionMethod,
    /// Emit an explicit entry for every directory before its first file
    pub directory_entries: bool,
}

/// Write the plan to `output` as a zip archive, manifest first
pub(super) fn write_archive(
    plan: &AssemblyPlan,
    output: &Path,
    layout: ArchiveLayout,
) -> Result<(), String> {
    let file = File::create(output).map_err(|e| format!("cannot create {}: {e}", output.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut directories = BTreeSet::new();

    for entry in plan.entries() {
        if layout.directory_entries {
            add_parent_directories(&mut zip, &mut directories, &entry.relative_path)?;
        }
        add_file(&mut zip, entry, layout.compression)?;
    }

    let writer = zip.finish().map_err(|e| format!("cannot finalize archive: {e}"))?;
    writer.into_inner().map_err(|e| format!("cannot flush archive: {}", e.error()))?;
    Ok(())
}

fn add_file(
    zip: &mut ZipWriter<BufWriter<File>>,
    entry: &ContainerEntry,
    compression: CompressionMethod,
) -> Result<(), String> {
    let source = File::open(&entry.source)
        .map_err(|e| format!("cannot read {}: {e}", entry.source.display()))?;
    let size = source.metadata().map(|m| m.len()).unwrap_or(0);

    let options = SimpleFileOptions::default()
        .compression_method(compression)
        .large_file(size >= u64::from(u32::MAX));

    zip.start_file(entry.relative_path.as_str(), options)
        .map_err(|e| format!("cannot add {}: {e}", entry.relative_path))?;
    std::io::copy(&mut BufReader::new(source), zip)
        .map_err(|e| format!("cannot write {}: {e}", entry.relative_path))?;
    Ok(())
}

fn add_parent_directories(
    zip: &mut ZipWriter<BufWriter<File>>,
    written: &mut BTreeSet<String>,
    relative_path: &str,
) -> Result<(), String> {
    let mut prefix = String::new();
    let components: Vec<&str> = relative_path.split('/').collect();
    let Some((_, parents)) = components.split_last() else {
        return Ok(());
    };

    for component in parents {
        prefix.push_str(component);
        prefix.push('/');
        if written.insert(prefix.clone()) {
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.add_directory(prefix.as_str(), options)
                .map_err(|e| format!("cannot add directory {prefix}: {e}"))?;
        }
    }
    Ok(())
}
