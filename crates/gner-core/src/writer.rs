//! Serializing decoded predictions to disk.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::labels::LabelMap;

/// Write a decoded prediction, one node per line in node order.
///
/// Each line is `<class id>\t<label>`; the label column keeps the file
/// readable without the vocabulary at hand. The parent directory must
/// already exist.
pub fn write_result(path: &Path, argmax: &[u32], labels: &LabelMap) -> Result<()> {
    let mut out = String::with_capacity(argmax.len() * 8);
    for &class_id in argmax {
        match labels.get(class_id) {
            Some(label) => out.push_str(&format!("{}\t{}\n", class_id, label)),
            None => out.push_str(&format!("{}\n", class_id)),
        }
    }

    std::fs::write(path, out)?;
    debug!("Wrote {} predictions to {}", argmax.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn writes_one_line_per_node() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample_0.txt");
        let labels = LabelMap::from_labels(vec!["O".into(), "B-name".into(), "I-name".into()]);

        write_result(&path, &[0, 1, 2, 0], &labels).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "0\tO\n1\tB-name\n2\tI-name\n0\tO\n");
    }

    #[test]
    fn missing_parent_directory_is_an_error() {
        let labels = LabelMap::from_labels(vec!["O".into()]);
        let err = write_result(Path::new("/nonexistent/dir/out.txt"), &[0], &labels).unwrap_err();
        assert!(matches!(err, crate::error::NerError::Io(_)));
    }
}
