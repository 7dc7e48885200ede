//! Output records and where they go.

use std::io::Write;

use strata_index::{Stage, StatData};
use strata_store::{unique_abbrev, EntryMode, ObjectStore};
use strata_types::ObjectId;

use crate::error::Result;
use crate::quote::format_path;
use crate::request::{LsRequest, Terminator};
use crate::tag::Tag;

/// Mode, fingerprint and stage of an index-derived record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageInfo {
    pub mode: EntryMode,
    pub id: ObjectId,
    pub stage: Stage,
}

/// One reported path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub tag: Tag,
    /// Path relative to the work tree root.
    pub path: String,
    /// Present when the stage columns are printed.
    pub stage_info: Option<StageInfo>,
    /// Present when cached stat data is printed.
    pub stat: Option<StatData>,
    /// Render the tag through the valid-bit table.
    pub valid_bit: bool,
}

impl Record {
    /// A record carrying only a tag and a path.
    pub fn new(tag: Tag, path: impl Into<String>) -> Self {
        Self {
            tag,
            path: path.into(),
            stage_info: None,
            stat: None,
            valid_bit: false,
        }
    }
}

/// Receives records in emission order.
pub trait RecordSink {
    fn emit(&mut self, record: Record) -> Result<()>;
}

impl RecordSink for Vec<Record> {
    fn emit(&mut self, record: Record) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

/// How records are rendered.
#[derive(Clone, Debug, Default)]
pub struct OutputFormat {
    pub show_tags: bool,
    pub terminator: Terminator,
    pub abbrev: Option<usize>,
    /// The caller's sub-directory, empty or ending in `/`. Paths are printed
    /// relative to it.
    pub cwd_prefix: String,
    pub quote_path: bool,
}

impl OutputFormat {
    /// Format options for `request`, issued from `cwd_prefix`.
    pub fn for_request(request: &LsRequest, cwd_prefix: &str, quote_path: bool) -> Self {
        Self {
            show_tags: request.shows_tags(),
            terminator: request.terminator,
            abbrev: request.abbrev,
            cwd_prefix: if request.full_name {
                String::new()
            } else {
                cwd_prefix.to_string()
            },
            quote_path: quote_path && request.terminator == Terminator::Newline,
        }
    }
}

/// Renders records as text.
pub struct RecordWriter<'a, W: Write> {
    out: W,
    format: OutputFormat,
    store: &'a dyn ObjectStore,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    /// `store` is consulted only to abbreviate fingerprints.
    pub fn new(out: W, format: OutputFormat, store: &'a dyn ObjectStore) -> Self {
        Self { out, format, store }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn fingerprint(&self, id: &ObjectId) -> Result<String> {
        match self.format.abbrev {
            Some(len) => Ok(unique_abbrev(self.store, id, len)?),
            None => Ok(id.to_hex()),
        }
    }
}

impl<W: Write> RecordSink for RecordWriter<'_, W> {
    fn emit(&mut self, record: Record) -> Result<()> {
        let mut line = String::new();
        if self.format.show_tags {
            line.push_str(if record.valid_bit {
                record.tag.valid_bit_label()
            } else {
                record.tag.label()
            });
        }
        if let Some(info) = &record.stage_info {
            line.push_str(&format!("{} {} {}\t", info.mode, self.fingerprint(&info.id)?, info.stage));
        }
        line.push_str(&format_path(&record.path, &self.format.cwd_prefix, self.format.quote_path));

        self.out.write_all(line.as_bytes())?;
        self.out.write_all(&[self.format.terminator.as_byte()])?;
        if let Some(stat) = &record.stat {
            write!(
                self.out,
                "  ctime: {}\n  mtime: {}\n  dev: {}\tino: {}\n  uid: {}\tgid: {}\n  size: {}\n",
                stat.ctime, stat.mtime, stat.dev, stat.ino, stat.uid, stat.gid, stat.size
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_index::FileTime;
    use strata_store::{Blob, InMemoryObjectStore};

    fn render(format: OutputFormat, store: &dyn ObjectStore, records: Vec<Record>) -> String {
        let mut writer = RecordWriter::new(Vec::new(), format, store);
        for r in records {
            writer.emit(r).unwrap();
        }
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn staged(store: &InMemoryObjectStore, path: &str, stage: Stage) -> Record {
        let id = store
            .write(&Blob::new(path.as_bytes().to_vec()).to_stored_object())
            .unwrap();
        Record {
            stage_info: Some(StageInfo {
                mode: EntryMode::Regular,
                id,
                stage,
            }),
            ..Record::new(Tag::Unmerged, path)
        }
    }

    #[test]
    fn plain_and_tagged_lines() {
        let store = InMemoryObjectStore::new();
        let records = vec![Record::new(Tag::Cached, "a"), Record::new(Tag::Other, "b")];
        assert_eq!(render(OutputFormat::default(), &store, records.clone()), "a\nb\n");

        let tagged = OutputFormat {
            show_tags: true,
            ..Default::default()
        };
        assert_eq!(render(tagged, &store, records), "H a\n? b\n");
    }

    #[test]
    fn valid_bit_uses_lowercase_table() {
        let store = InMemoryObjectStore::new();
        let format = OutputFormat {
            show_tags: true,
            ..Default::default()
        };
        let record = Record {
            valid_bit: true,
            ..Record::new(Tag::Cached, "assumed")
        };
        assert_eq!(render(format, &store, vec![record]), "h assumed\n");
    }

    #[test]
    fn stage_columns() {
        let store = InMemoryObjectStore::new();
        let record = staged(&store, "c", Stage::Ours);
        let id = record.stage_info.unwrap().id;
        let out = render(OutputFormat::default(), &store, vec![record]);
        assert_eq!(out, format!("100644 {} 2\tc\n", id.to_hex()));
    }

    #[test]
    fn abbreviated_fingerprints() {
        let store = InMemoryObjectStore::new();
        let record = staged(&store, "c", Stage::Base);
        let id = record.stage_info.unwrap().id;
        let format = OutputFormat {
            abbrev: Some(7),
            ..Default::default()
        };
        let out = render(format, &store, vec![record]);
        assert_eq!(out, format!("100644 {} 1\tc\n", &id.to_hex()[..7]));
    }

    #[test]
    fn nul_terminator_disables_quoting() {
        let store = InMemoryObjectStore::new();
        let request = LsRequest {
            terminator: Terminator::Nul,
            ..Default::default()
        };
        let format = OutputFormat::for_request(&request, "", true);
        let out = render(format, &store, vec![Record::new(Tag::Cached, "tab\tname")]);
        assert_eq!(out, "tab\tname\0");
    }

    #[test]
    fn full_name_ignores_the_caller_directory() {
        let request = LsRequest {
            full_name: true,
            ..Default::default()
        };
        assert_eq!(OutputFormat::for_request(&request, "sub/", true).cwd_prefix, "");
        let request = LsRequest::default();
        assert_eq!(OutputFormat::for_request(&request, "sub/", true).cwd_prefix, "sub/");
    }

    #[test]
    fn debug_lines_follow_the_record() {
        let store = InMemoryObjectStore::new();
        let stat = StatData {
            ctime: FileTime::new(10, 1),
            mtime: FileTime::new(20, 2),
            dev: 3,
            ino: 4,
            uid: 5,
            gid: 6,
            size: 7,
        };
        let record = Record {
            stat: Some(stat),
            ..Record::new(Tag::Cached, "f")
        };
        let out = render(OutputFormat::default(), &store, vec![record]);
        assert_eq!(
            out,
            "f\n  ctime: 10:1\n  mtime: 20:2\n  dev: 3\tino: 4\n  uid: 5\tgid: 6\n  size: 7\n"
        );
    }
}
