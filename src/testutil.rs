//! Fixture builders shared by the unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

/// Writes a ZIP archive at `dir/file_name` with the given members. Bodies
/// are raw bytes so tests can produce members that are not valid UTF-8;
/// plain `&str` works for the usual JSON case.
pub(crate) fn write_archive<B: AsRef<[u8]>>(
    dir: &Path,
    file_name: &str,
    members: &[(&str, B)],
) -> PathBuf {
    let path = dir.join(file_name);
    let file = File::create(&path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, body) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start member");
        writer.write_all(body.as_ref()).expect("write member");
    }
    writer.finish().expect("finish archive");
    path
}

/// A taxonomy with attack and modality keyword tables plus a letter-grade
/// score map, mirroring the shape shipped in `taxonomy.yaml`.
pub(crate) fn grading_taxonomy() -> crate::taxonomy::Taxonomy {
    taxonomy_from_str(
        r"
attack_keywords:
  injection: prompt_injection
  jailbreak: jailbreak
modality_keywords:
  audio: audio
  image: image
score_map:
  C: 1.0
  I: 0.0
  P: 0.5
",
    )
}

/// Loads a taxonomy from inline YAML through the regular file loader.
pub(crate) fn taxonomy_from_str(yaml: &str) -> crate::taxonomy::Taxonomy {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("taxonomy.yaml");
    std::fs::write(&path, yaml).expect("write taxonomy");
    crate::taxonomy::Taxonomy::load(&path).expect("load taxonomy")
}
