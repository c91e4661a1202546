//! Indexed report files for scan output.

use std::path::{Path, PathBuf};

/// Next available `<prefix><N>.log` path in `dir`.
///
/// Existing reports are scanned for the highest index; the returned path
/// uses that index plus one, so successive scans never overwrite earlier
/// results.
pub(crate) fn next_report_path(dir: &Path, prefix: &str) -> PathBuf {
    let pattern = format!("{}/{}*.log", dir.display(), prefix);
    let index_re = regex::Regex::new(&format!(r"^{}(\d+)\.log$", regex::escape(prefix))).unwrap();

    let mut max_index = 0u32;
    if let Ok(paths) = glob::glob(&pattern) {
        for path in paths.flatten() {
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if let Some(caps) = index_re.captures(name) {
                if let Ok(index) = caps[1].parse::<u32>() {
                    max_index = max_index.max(index);
                }
            }
        }
    }

    dir.join(format!("{}{}.log", prefix, max_index + 1))
}
