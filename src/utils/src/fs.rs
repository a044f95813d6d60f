use std::io::Write;
use std::path::Path;

pub fn open_with_create_append<P: AsRef<Path>>(path: P) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("fail to open or create {:?}: {}", path.as_ref(), e),
            )
        })
}

/// Write `content` plus a newline and flush, so the line is on disk before anything else
/// touches the file.
pub fn append_line<W: Write>(mut f: W, content: &str) -> std::io::Result<()> {
    writeln!(f, "{}", content)?;
    f.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_previous_content() {
        let path = std::env::temp_dir().join(format!("utils_fs_append_{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        append_line(&open_with_create_append(&path).unwrap(), "first").unwrap();
        append_line(&open_with_create_append(&path).unwrap(), "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        std::fs::remove_file(&path).unwrap();
    }
}
