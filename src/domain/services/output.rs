#[cfg(test)]
#[path = "output_test.rs"]
mod tests;

use std::fs;
use std::io;
use std::io::Write;
use std::path;

use anyhow::Result;
use chrono::Utc;

/// Cosmetic cleanup of a script: trailing whitespace is stripped from every
/// line, runs of blank lines collapse to a single blank line, and the whole
/// text is trimmed.
pub fn format_script(text: &str) -> String {
    let mut lines: Vec<&str> = vec![];
    let mut previous_blank = false;

    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }

        lines.push(line);
        previous_blank = blank;
    }

    return lines.join("\n").trim().to_string();
}

pub fn download_file_name(epoch_millis: i64, attempt: usize) -> String {
    if attempt == 0 {
        return format!("map_script_{epoch_millis}.lua");
    }

    return format!("map_script_{epoch_millis}_{attempt}.lua");
}

/// Writes the script into `dir` under a timestamped name and returns the path.
pub fn write_download(dir: &path::Path, text: &str) -> Result<path::PathBuf> {
    return write_download_at(dir, text, Utc::now().timestamp_millis());
}

/// Existing files are never overwritten; a numeric suffix is appended until a
/// free name is found.
pub fn write_download_at(
    dir: &path::Path,
    text: &str,
    epoch_millis: i64,
) -> Result<path::PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut attempt = 0;
    loop {
        let file_path = dir.join(download_file_name(epoch_millis, attempt));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
        {
            Ok(mut file) => {
                file.write_all(text.as_bytes())?;
                return Ok(file_path);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
