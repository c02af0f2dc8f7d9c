use crate::document::Document;
use crate::DocId;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A document collection with dense ids `0..size()`, iterated in id order.
pub trait Corpus: Send + Sync {
    fn size(&self) -> usize;

    fn get_document(&self, document_id: DocId) -> Option<&Document>;

    fn iter(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
        Box::new((0..self.size() as DocId).filter_map(move |id| self.get_document(id)))
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCorpus {
    documents: Vec<Document>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document. Its id must equal the current size.
    pub fn add_document(&mut self, document: Document) -> &mut Self {
        assert_eq!(
            document.document_id as usize,
            self.documents.len(),
            "document ids must be contiguous"
        );
        self.documents.push(document);
        self
    }

    /// Appends a document built from `fields` under the next free id.
    pub fn push(&mut self, fields: Map<String, Value>) -> DocId {
        let document_id = self.documents.len() as DocId;
        self.documents.push(Document { document_id, fields: fields.into_iter().collect() });
        document_id
    }

    /// Loads a file or, recursively, every supported file under a directory.
    ///
    /// Supported formats: `.txt` (one document per line, tab-separated `body`
    /// and optional `meta`), `.tsv` (header row names the fields), `.json`
    /// (an object or an array of objects) and `.jsonl`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut corpus = Self::new();
        let mut files: Vec<PathBuf> = Vec::new();
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && is_supported(p) {
                    files.push(p.to_path_buf());
                }
            }
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            bail!("corpus path {} does not exist", path.display());
        }
        for file in files {
            corpus.load_file(&file).with_context(|| format!("loading {}", file.display()))?;
        }
        tracing::info!(path = %path.display(), documents = corpus.size(), "loaded corpus");
        Ok(corpus)
    }

    fn load_file(&mut self, file: &Path) -> Result<()> {
        match extension(file) {
            Some("txt") => self.load_text(file),
            Some("tsv") => self.load_tsv(file),
            Some("json") => self.load_json(file),
            Some("jsonl") => self.load_jsonl(file),
            _ => bail!("unsupported corpus file extension"),
        }
    }

    fn load_text(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut columns = line.split('\t');
            let mut fields = Map::new();
            if let Some(body) = columns.next() {
                fields.insert("body".into(), Value::String(body.to_string()));
            }
            if let Some(meta) = columns.next() {
                fields.insert("meta".into(), Value::String(meta.to_string()));
            }
            self.push(fields);
        }
        Ok(())
    }

    fn load_tsv(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(header) => header?,
            None => return Ok(()),
        };
        let names: Vec<String> = header.split('\t').map(|s| s.trim().to_string()).collect();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = names
                .iter()
                .zip(line.split('\t'))
                .map(|(name, value)| (name.clone(), Value::String(value.to_string())))
                .collect();
            self.push(fields);
        }
        Ok(())
    }

    fn load_json(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        let json: Value = serde_json::from_reader(reader)?;
        match json {
            Value::Array(values) => {
                for value in values {
                    self.push_value(value);
                }
            }
            value @ Value::Object(_) => self.push_value(value),
            _ => bail!("expected a JSON object or array of objects"),
        }
        Ok(())
    }

    fn load_jsonl(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line).with_context(|| format!("line {}", number + 1))?;
            self.push_value(value);
        }
        Ok(())
    }

    fn push_value(&mut self, value: Value) {
        match value {
            Value::Object(fields) => {
                self.push(fields);
            }
            other => tracing::warn!(kind = json_kind(&other), "skipping non-object corpus entry"),
        }
    }
}

impl Corpus for InMemoryCorpus {
    fn size(&self) -> usize {
        self.documents.len()
    }

    fn get_document(&self, document_id: DocId) -> Option<&Document> {
        self.documents.get(document_id as usize)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
        Box::new(self.documents.iter())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn is_supported(path: &Path) -> bool {
    matches!(extension(path), Some("txt" | "tsv" | "json" | "jsonl"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
