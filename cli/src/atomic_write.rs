use std::fs;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

/// Stream a document into a temp file next to `path`, then rename it over `path`.
///
/// `render` writes the whole document; if it fails, `path` is left untouched and the temp file is
/// removed. Missing parent directories are created.
pub fn write_atomic<T>(
    path: &Path,
    render: impl FnOnce(&mut dyn Write) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let Some(dir) = path.parent() else {
        anyhow::bail!("output path has no parent directory: {}", path.display());
    };
    fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))?;

    let tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    let mut out = BufWriter::new(tmp);
    let rendered = render(&mut out)?;

    let tmp = out
        .into_inner()
        .map_err(|err| anyhow::Error::new(err.into_error()).context("flush output"))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|err| anyhow::Error::new(err.error))
        .with_context(|| format!("rename output into {}", path.display()))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).expect("read dir").count()
    }

    #[test]
    fn creates_missing_directories_and_returns_render_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output").join("graph.graphml");

        let written = write_atomic(&path, |out| {
            out.write_all(b"<graphml/>\n")?;
            Ok(3)
        })
        .expect("write");

        assert_eq!(written, 3);
        assert_eq!(fs::read_to_string(&path).expect("read"), "<graphml/>\n");
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.graphml");
        fs::write(&path, "previous export, longer than the new one\n").expect("seed");

        write_atomic(&path, |out| Ok(out.write_all(b"new\n")?)).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "new\n");
        assert_eq!(entries(dir.path()), 1);
    }

    #[test]
    fn failed_render_keeps_previous_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.graphml");
        fs::write(&path, "previous\n").expect("seed");

        let err = write_atomic(&path, |out| -> anyhow::Result<()> {
            out.write_all(b"<graphml>")?;
            anyhow::bail!("node fetch failed")
        })
        .expect_err("render error");

        assert_eq!(err.to_string(), "node fetch failed");
        assert_eq!(fs::read_to_string(&path).expect("read"), "previous\n");
        assert_eq!(entries(dir.path()), 1);
    }
}
