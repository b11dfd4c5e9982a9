use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::AppResult;

pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("worklog_{}.md", at.format("%Y%m%d_%H%M%S"))
}

pub fn log_file_name(at: DateTime<Local>) -> String {
    format!("worklog_{}.log", at.format("%Y%m%d"))
}

/// Writes `contents` to `dir/file_name`, creating `dir` if needed.
pub fn save_report(dir: &Path, file_name: &str, contents: &str) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn names_files_by_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 15, 2, 30, 5).unwrap();
        assert_eq!(report_file_name(at), "worklog_20261015_023005.md");
        assert_eq!(log_file_name(at), "worklog_20261015.log");
    }

    #[test]
    fn saves_into_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("reports");

        let path = save_report(&target, "report.md", "# Summary\n").expect("save");

        assert_eq!(path, target.join("report.md"));
        assert_eq!(fs::read_to_string(path).expect("read"), "# Summary\n");
    }
}
