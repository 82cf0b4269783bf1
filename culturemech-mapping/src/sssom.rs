//! SSSOM mapping-set storage (spec §4.6): a `#`-commented YAML metadata
//! header followed by a fixed-column TSV body, written the way the OBO
//! community's `sssom-py` reference tooling does it — hand-rolled here
//! rather than pulled in as a dependency, since this crate only needs to
//! read and write its own mapping sets, not the full SSSOM toolkit.

use std::fs;
use std::path::Path;

use context_error::{BoxedError, Context, CreateError};

use crate::error::MappingError;

pub const CURIE_MAP_HEADER: &str = "curie_map";
pub const MAPPING_SET_ID_HEADER: &str = "mapping_set_id";

const COLUMNS: &[&str] = &[
    "subject_id",
    "subject_label",
    "predicate_id",
    "object_id",
    "object_label",
    "mapping_justification",
    "confidence",
    "mapping_tool",
    "mapping_method",
    "mapping_date",
    "comment",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SssomMapping {
    pub subject_id: String,
    pub subject_label: String,
    pub predicate_id: String,
    pub object_id: String,
    pub object_label: String,
    pub mapping_justification: String,
    pub confidence: f64,
    pub mapping_tool: String,
    pub mapping_method: Option<String>,
    pub comment: Option<String>,
    pub mapping_date: Option<chrono::NaiveDate>,
}

impl SssomMapping {
    fn to_tsv_row(&self) -> String {
        let fields = [
            escape(&self.subject_id),
            escape(&self.subject_label),
            escape(&self.predicate_id),
            escape(&self.object_id),
            escape(&self.object_label),
            escape(&self.mapping_justification),
            self.confidence.to_string(),
            escape(&self.mapping_tool),
            escape(self.mapping_method.as_deref().unwrap_or("")),
            self.mapping_date.map(|d| d.to_string()).unwrap_or_default(),
            escape(self.comment.as_deref().unwrap_or("")),
        ];
        fields.join("\t")
    }

    fn from_tsv_row(header: &[String], row: &str) -> Option<Self> {
        let cells: Vec<&str> = row.split('\t').collect();
        let get = |name: &str| -> Option<String> {
            let idx = header.iter().position(|h| h == name)?;
            cells.get(idx).map(|s| unescape(s))
        };

        Some(Self {
            subject_id: get("subject_id")?,
            subject_label: get("subject_label").unwrap_or_default(),
            predicate_id: get("predicate_id")?,
            object_id: get("object_id").unwrap_or_default(),
            object_label: get("object_label").unwrap_or_default(),
            mapping_justification: get("mapping_justification").unwrap_or_default(),
            confidence: get("confidence").and_then(|s| s.parse().ok()).unwrap_or(0.0),
            mapping_tool: get("mapping_tool").unwrap_or_default(),
            // Legacy mapping sets predate this column; its absence is not an
            // error (spec §4.6).
            mapping_method: get("mapping_method").filter(|s| !s.is_empty()),
            comment: get("comment").filter(|s| !s.is_empty()),
            mapping_date: get("mapping_date")
                .filter(|s| !s.is_empty())
                .and_then(|s| s.parse().ok()),
        })
    }
}

fn escape(value: &str) -> String {
    value.replace('\t', " ").replace('\n', " ")
}

fn unescape(value: &str) -> String {
    value.to_string()
}

#[derive(Clone, Debug)]
pub struct MappingSet {
    pub mapping_set_id: String,
    pub curie_map: Vec<(String, String)>,
    pub mappings: Vec<SssomMapping>,
}

impl MappingSet {
    pub fn new(mapping_set_id: impl Into<String>, curie_map: Vec<(String, String)>) -> Self {
        Self {
            mapping_set_id: mapping_set_id.into(),
            curie_map,
            mappings: Vec::new(),
        }
    }

    /// Sort order for on-disk mapping sets (spec §4.6): unmapped rows sort
    /// last, mapped rows by descending confidence, ties broken by subject id.
    pub fn sort(&mut self) {
        self.mappings.sort_by(|a, b| {
            let a_unmapped = a.predicate_id == crate::cascade::PREDICATE_UNMAPPED;
            let b_unmapped = b.predicate_id == crate::cascade::PREDICATE_UNMAPPED;
            a_unmapped
                .cmp(&b_unmapped)
                .then_with(|| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.subject_id.cmp(&b.subject_id))
        });
    }

    pub fn extract_unmapped(&self) -> Vec<&SssomMapping> {
        self.mappings
            .iter()
            .filter(|m| m.predicate_id == crate::cascade::PREDICATE_UNMAPPED)
            .collect()
    }

    pub fn analyze(&self) -> crate::cascade::MappingStats {
        crate::cascade::MappingStats::from_mappings(&self.mappings)
    }

    fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {MAPPING_SET_ID_HEADER}: {}\n", self.mapping_set_id));
        out.push_str(&format!("# {CURIE_MAP_HEADER}:\n"));
        for (prefix, uri) in &self.curie_map {
            out.push_str(&format!("#   {prefix}: {uri}\n"));
        }
        out.push_str(&COLUMNS.join("\t"));
        out.push('\n');
        for mapping in &self.mappings {
            out.push_str(&mapping.to_tsv_row());
            out.push('\n');
        }
        out
    }

    /// Write atomically via a temp file + rename (spec §4.6, §5).
    pub fn save(&self, path: &Path) -> Result<(), BoxedError<'static, MappingError>> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            BoxedError::new(
                MappingError::SssomWrite,
                "could not create temp file",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        fs::write(tmp.path(), self.render()).map_err(|e| {
            BoxedError::new(
                MappingError::SssomWrite,
                "could not write mapping set",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        tmp.persist(path).map_err(|e| {
            BoxedError::new(
                MappingError::SssomWrite,
                "could not publish mapping set",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, BoxedError<'static, MappingError>> {
        let text = fs::read_to_string(path).map_err(|e| {
            BoxedError::new(
                MappingError::SssomParse,
                "could not read mapping set",
                e.to_string(),
                Context::default().source(path.to_string_lossy()).to_owned(),
            )
        })?;

        let mut mapping_set_id = String::new();
        let mut curie_map = Vec::new();
        let mut in_curie_map = false;
        let mut body_start = 0;

        for (idx, line) in text.lines().enumerate() {
            if let Some(rest) = line.strip_prefix('#') {
                let rest = rest.trim_start();
                if let Some(value) = rest.strip_prefix(&format!("{MAPPING_SET_ID_HEADER}:")) {
                    mapping_set_id = value.trim().to_string();
                    in_curie_map = false;
                } else if rest.trim_end() == format!("{CURIE_MAP_HEADER}:") {
                    in_curie_map = true;
                } else if in_curie_map {
                    if let Some((prefix, uri)) = rest.split_once(':') {
                        curie_map.push((prefix.trim().to_string(), uri.trim().to_string()));
                    }
                }
                continue;
            }
            body_start = idx;
            break;
        }

        if mapping_set_id.is_empty() {
            return Err(BoxedError::new(
                MappingError::MissingHeader,
                "mapping set has no mapping_set_id header",
                path.to_string_lossy().to_string(),
                Context::none(),
            ));
        }

        let lines: Vec<&str> = text.lines().collect();
        let header: Vec<String> = lines
            .get(body_start)
            .map(|l| l.split('\t').map(|s| s.to_string()).collect())
            .unwrap_or_default();

        let mappings = lines[body_start.saturating_add(1)..]
            .iter()
            .filter(|l| !l.is_empty())
            .filter_map(|l| SssomMapping::from_tsv_row(&header, l))
            .collect();

        Ok(Self { mapping_set_id, curie_map, mappings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_mapping() -> SssomMapping {
        SssomMapping {
            subject_id: "recipe:1#ing:0".to_string(),
            subject_label: "yeast extract".to_string(),
            predicate_id: "skos:exactMatch".to_string(),
            object_id: "FOODON:03315426".to_string(),
            object_label: "yeast extract".to_string(),
            mapping_justification: "semapv:ManualMappingCuration".to_string(),
            confidence: 1.0,
            mapping_tool: "culturemech-mapping".to_string(),
            mapping_method: Some("curated_dictionary".to_string()),
            comment: None,
            mapping_date: None,
        }
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mappings.sssom.tsv");
        let mut set = MappingSet::new(
            "culturemech:ingredients",
            vec![("CHEBI".to_string(), "http://purl.obolibrary.org/obo/CHEBI_".to_string())],
        );
        set.mappings.push(sample_mapping());
        set.save(&path).unwrap();

        let loaded = MappingSet::load(&path).unwrap();
        assert_eq!(loaded.mapping_set_id, "culturemech:ingredients");
        assert_eq!(loaded.mappings.len(), 1);
        assert_eq!(loaded.mappings[0].object_id, "FOODON:03315426");
    }

    #[test]
    fn load_tolerates_legacy_file_without_mapping_method_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.sssom.tsv");
        let legacy = "# mapping_set_id: culturemech:legacy\n# curie_map:\nsubject_id\tpredicate_id\tobject_id\tconfidence\ningredient:1\tskos:exactMatch\tCHEBI:17234\t0.95\n";
        fs::write(&path, legacy).unwrap();

        let loaded = MappingSet::load(&path).unwrap();
        assert_eq!(loaded.mappings.len(), 1);
        assert!(loaded.mappings[0].mapping_method.is_none());
        assert_eq!(loaded.mappings[0].object_id, "CHEBI:17234");
    }

    #[test]
    fn sort_places_unmapped_last() {
        let mut set = MappingSet::new("culturemech:test", vec![]);
        set.mappings.push(SssomMapping {
            predicate_id: crate::cascade::PREDICATE_UNMAPPED.to_string(),
            subject_id: "a".to_string(),
            ..SssomMapping::default()
        });
        set.mappings.push(sample_mapping());
        set.sort();
        assert_eq!(set.mappings[0].object_id, "FOODON:03315426");
        assert_eq!(set.mappings[1].predicate_id, crate::cascade::PREDICATE_UNMAPPED);
    }
}
